//! Phosphor colours
//!
//! Everything is drawn in one hue that cools from a bright blue-white when
//! fresh to a dim green as it ages. Trail entries are addressed by `j`, which
//! runs from 0 (oldest) to `n` (newest, full brightness).

/// Straight RGBA in 0..1
pub type Rgba = [f32; 4];

/// Fresh phosphor (blue channel saturates)
pub const FRESH: [f32; 3] = [201.0 / 255.0, 238.0 / 255.0, 1.0];
/// Decayed phosphor
pub const DECAYED: [f32; 3] = [135.0 / 255.0, 166.0 / 255.0, 120.0 / 255.0];

/// Background stars are a steady, half-lit fresh colour
pub const STAR: Rgba = [FRESH[0], FRESH[1], FRESH[2], 0.6];
/// Live entities
pub const LIVE: Rgba = [FRESH[0], FRESH[1], FRESH[2], 1.0];
/// Clear colour
pub const BACKGROUND: Rgba = [0.0, 0.0, 0.0, 1.0];

/// Round down to hundredths
#[inline]
fn hundredths(v: f32) -> f32 {
    (v * 100.0).floor() / 100.0
}

/// Blend between the decayed and fresh colours; weight 1 is fully fresh
pub fn mix(weight: f32, alpha: f32) -> Rgba {
    let w = weight.clamp(0.0, 1.0);
    let c = |i: usize| FRESH[i] * w + DECAYED[i] * (1.0 - w);
    [c(0), c(1), c(2), alpha]
}

/// Colour of a craft afterimage
///
/// Hull outlines fade quadratically but never fully vanish, so a faint
/// ghost of the whole flight path stays on screen.
pub fn craft_trail(j: usize, n: usize) -> Rgba {
    let t = j as f32 / n.max(1) as f32;
    let alpha = if j < n { (0.2 * t * t).max(0.025) } else { 1.0 };
    mix(hundredths((0.2 * (j as f32 - n as f32)).exp()), alpha)
}

/// Colour of a dot afterimage (projectiles, debris, sun flare, pointer)
///
/// Dots fade much faster than hulls.
pub fn dot_trail(j: usize, n: usize) -> Rgba {
    let t = j as f32 / n.max(1) as f32;
    let alpha = if j < n { hundredths(0.8 * t.powi(6)) } else { 1.0 };
    mix(hundredths((0.5 * (j as f32 - n as f32)).exp()), alpha)
}
