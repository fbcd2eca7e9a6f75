//! Spacewar! - a two-body orbital duel
//!
//! Core modules:
//! - `sim`: Deterministic simulation (integration, weapons, collisions, rounds)
//! - `renderer`: Phosphor-trail drawing onto an immediate-mode canvas, plus a WebGPU backend
//! - `tuning`: Scale factors and presets resolved into fixed constants at startup

pub mod renderer;
pub mod sim;
pub mod tuning;

pub use tuning::{Constants, OpeningSalvo, StartLayout, Tuning};

use glam::Vec2;

/// World configuration constants
pub mod consts {
    use glam::Vec2;

    /// Side length of the square toroidal world
    pub const WORLD_SIZE: f32 = 1000.0;
    /// The central body sits in the middle of the world
    pub const CENTER: Vec2 = Vec2::new(500.0, 500.0);
    /// Default simulation rate (ticks per second)
    pub const DEFAULT_FPS: u32 = 20;
    /// Maximum catch-up ticks per animation frame
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Gravity denominators never use a distance below this
    pub const MIN_GRAVITY_DISTANCE: f32 = 1.0;
}

use consts::WORLD_SIZE;

/// Wrap a single coordinate into [0, WORLD_SIZE)
///
/// Handles arbitrarily large overshoots in either direction. Non-finite input
/// is a logic bug upstream; it is logged and pinned to the origin so the tick
/// can finish.
#[inline]
pub fn wrap_coord(v: f32) -> f32 {
    if !v.is_finite() {
        log::error!("non-finite coordinate {} pinned to 0", v);
        return 0.0;
    }
    let w = v.rem_euclid(WORLD_SIZE);
    // rem_euclid can round up to exactly WORLD_SIZE for tiny negatives
    if w >= WORLD_SIZE { 0.0 } else { w }
}

/// Wrap a position onto the torus
#[inline]
pub fn wrap_position(p: Vec2) -> Vec2 {
    Vec2::new(wrap_coord(p.x), wrap_coord(p.y))
}

/// Shortest displacement from `from` to `to` on the torus
#[inline]
pub fn torus_delta(from: Vec2, to: Vec2) -> Vec2 {
    let half = WORLD_SIZE / 2.0;
    let mut d = to - from;
    if d.x > half {
        d.x -= WORLD_SIZE;
    } else if d.x < -half {
        d.x += WORLD_SIZE;
    }
    if d.y > half {
        d.y -= WORLD_SIZE;
    } else if d.y < -half {
        d.y += WORLD_SIZE;
    }
    d
}

/// Normalized angle to [-π, π)
///
/// Works in one step for any finite input, however large.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        log::error!("non-finite angle {} reset to 0", angle);
        return 0.0;
    }
    let a = (angle + PI).rem_euclid(TAU) - PI;
    // Rounding can land exactly on the open end
    if a >= PI { -PI } else { a }
}

/// Unit vector for a heading (radians, clockwise in screen space since y points down)
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
