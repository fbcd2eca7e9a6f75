//! Game tuning and derived constants
//!
//! Scale factors and preset toggles are read once at startup and resolved into
//! an immutable [`Constants`] table. Nothing here is reconfigurable at runtime.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_FPS;

/// Where the two craft start each round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StartLayout {
    /// Wedge bottom-left, needle top-right
    #[default]
    Classic,
    /// Both craft start a short hop from the sun
    SunDive,
    /// Uniformly random positions
    Random,
}

impl StartLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartLayout::Classic => "classic",
            StartLayout::SunDive => "sun-dive",
            StartLayout::Random => "random",
        }
    }

    /// Parse a layout name as typed on the command line
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(StartLayout::Classic),
            "sun-dive" | "sundive" | "sun" => Some(StartLayout::SunDive),
            "random" => Some(StartLayout::Random),
            _ => None,
        }
    }
}

/// Projectiles seeded into the world at the start of each round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OpeningSalvo {
    #[default]
    None,
    /// Nine fixed projectiles that show off straight-line motion and wrapping
    PhysicsDemo,
    /// Forty projectiles at random positions and headings
    Scattered,
}

/// Startup tuning knobs
///
/// Scale factors work best between 0 and 4. Missing JSON fields fall back to
/// the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Simulation ticks per second
    pub fps: u32,

    // === Scale factors ===
    /// Thruster acceleration
    pub scale_acc: f32,
    /// Rotation speed
    pub scale_rot: f32,
    /// Strength of gravity (0 disables it)
    pub scale_grav: f32,
    /// Projectile speed (too high and hits can tunnel)
    pub scale_pew_speed: f32,
    /// Projectile lifetime
    pub scale_pew_life: f32,
    /// Reload delay between shots
    pub scale_pew_delay: f32,
    /// Trail length
    pub scale_trail: f32,
    /// Pause between destruction and reset
    pub scale_pause: f32,
    /// Craft dimensions
    pub scale_ship: f32,

    // === Presets ===
    /// Faster and less historically accurate
    pub faster: bool,
    /// Bigger craft, sun flare and projectile contact range
    pub bigger: bool,
    pub start_layout: StartLayout,
    pub opening_salvo: OpeningSalvo,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,

            scale_acc: 1.0,
            scale_rot: 1.0,
            scale_grav: 1.0,
            scale_pew_speed: 1.0,
            scale_pew_life: 1.0,
            scale_pew_delay: 1.0,
            scale_trail: 1.0,
            scale_pause: 1.0,
            scale_ship: 1.0,

            faster: false,
            bigger: false,
            start_layout: StartLayout::Classic,
            opening_salvo: OpeningSalvo::None,
        }
    }
}

impl Tuning {
    /// Parse tuning from a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load tuning from a JSON file, falling back to defaults on any failure
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Bad tuning file {}: {}; using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Can't read tuning file {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Apply presets to the raw scale factors
    fn effective(&self) -> Tuning {
        let mut t = self.clone();
        if t.faster {
            t.scale_acc = 5.0;
            t.scale_rot = 2.0;
            t.scale_grav = 2.0;
            t.scale_pew_speed = 2.0;
            t.scale_pause = 0.5;
        }
        if t.bigger {
            t.scale_acc = t.scale_acc.min(3.0);
            t.scale_pew_speed = t.scale_pew_speed.min(2.0);
            t.scale_ship *= 2.0;
        }
        t
    }

    /// Resolve presets and scale factors into the fixed constant table
    pub fn derive(&self) -> Constants {
        let t = self.effective();
        let fps = t.fps.max(1);
        let fps_f = fps as f32;
        let ship = t.scale_ship;
        let bigger = if t.bigger { 2.0 } else { 1.0 };

        let projectile_lifetime_ms = 4000.0 * t.scale_pew_life;
        let reload_delay_ms = 750.0 * t.scale_pew_delay;

        Constants {
            fps,
            tick_ms: 1000.0 / fps_f,

            acceleration: 6.0 / fps_f / fps_f * t.scale_acc,
            rotation_speed: 1.5 / fps_f * t.scale_rot,
            gravity: 700_000.0 / fps_f / fps_f * t.scale_grav,

            projectile_speed: 60.0 / fps_f * t.scale_pew_speed,
            projectile_lifetime_ms,
            reload_delay_ms,
            projectile_lifetime_ticks: ms_to_ticks(projectile_lifetime_ms, fps),
            reload_delay_ticks: ms_to_ticks(reload_delay_ms, fps),
            muzzle_offset: 10.0,
            projectile_collision_range: 15.0 * bigger,

            trail_frames: ((fps_f * 20.0 * t.scale_trail).floor() as usize).max(1),
            pause_frames: ((3.0 * fps_f * t.scale_pause).floor() as u32).max(1),

            craft_half_width: 8.4 * ship,
            craft_half_length: 20.4 * ship,
            hitbox_pad_length: 0.0 * ship,
            hitbox_pad_width: 5.0 * ship,
            hitbox_tolerance: 400.0 * ship,

            fizzle_count: 10,
            fizzle_radius: 40.0,
            blast_count: (100.0 * ship).round().max(1.0) as u32,
            blast_radius: 160.0 * ship,

            sun_flare_min: 15.0 * bigger,
            sun_flare_max: 60.0 * bigger,
            star_count: 40,

            line_thickness: ship * ship,
            dot_thickness: ship * ship + 2.0,

            start_layout: t.start_layout,
            opening_salvo: t.opening_salvo,
        }
    }
}

/// Convert a millisecond delay into whole ticks (never zero)
pub fn ms_to_ticks(ms: f32, fps: u32) -> u64 {
    ((ms * fps as f32 / 1000.0).ceil() as u64).max(1)
}

/// Constants derived from [`Tuning`] at startup
///
/// Distances are in world units (1/1000 of the square play field), speeds in
/// world units per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Constants {
    pub fps: u32,
    /// Duration of one tick in milliseconds
    pub tick_ms: f32,

    /// Thrust added to velocity per tick while thrusting
    pub acceleration: f32,
    /// Heading change per tick while a turn control is held (radians)
    pub rotation_speed: f32,
    /// Gravitational parameter G of the central body
    pub gravity: f32,

    pub projectile_speed: f32,
    pub projectile_lifetime_ms: f32,
    pub reload_delay_ms: f32,
    pub projectile_lifetime_ticks: u64,
    pub reload_delay_ticks: u64,
    /// Distance in front of the nose where projectiles spawn
    pub muzzle_offset: f32,
    /// Two projectiles closer than this destroy each other
    pub projectile_collision_range: f32,

    /// Ring buffer capacity for every trail
    pub trail_frames: usize,
    /// Ticks between a decided round and the reset
    pub pause_frames: u32,

    pub craft_half_width: f32,
    pub craft_half_length: f32,
    /// Hitbox inflation along the hull axis
    pub hitbox_pad_length: f32,
    /// Hitbox inflation across the hull
    pub hitbox_pad_width: f32,
    /// Allowed area discrepancy in the point-in-hull test
    pub hitbox_tolerance: f32,

    /// Burst left by an expired projectile
    pub fizzle_count: u32,
    pub fizzle_radius: f32,
    /// Staged burst left by a destroyed craft
    pub blast_count: u32,
    pub blast_radius: f32,

    pub sun_flare_min: f32,
    pub sun_flare_max: f32,
    pub star_count: usize,

    pub line_thickness: f32,
    pub dot_thickness: f32,

    pub start_layout: StartLayout,
    pub opening_salvo: OpeningSalvo,
}

impl Default for Constants {
    fn default() -> Self {
        Tuning::default().derive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let c = Constants::default();
        assert_eq!(c.fps, 20);
        assert!((c.acceleration - 0.015).abs() < 1e-6);
        assert!((c.rotation_speed - 0.075).abs() < 1e-6);
        assert!((c.gravity - 1750.0).abs() < 1e-3);
        assert!((c.projectile_speed - 3.0).abs() < 1e-6);
        assert_eq!(c.projectile_lifetime_ticks, 80);
        assert_eq!(c.reload_delay_ticks, 15);
        assert_eq!(c.trail_frames, 400);
        assert_eq!(c.pause_frames, 60);
        assert_eq!(c.blast_count, 100);
        assert!((c.craft_half_length - 20.4).abs() < 1e-6);
    }

    #[test]
    fn test_faster_preset_overrides_scales() {
        let tuning = Tuning {
            faster: true,
            scale_acc: 0.5,
            ..Default::default()
        };
        let c = tuning.derive();
        assert!((c.acceleration - 6.0 / 400.0 * 5.0).abs() < 1e-6);
        assert!((c.projectile_speed - 6.0).abs() < 1e-6);
        assert_eq!(c.pause_frames, 30);
    }

    #[test]
    fn test_bigger_preset_caps_and_scales() {
        let tuning = Tuning {
            faster: true,
            bigger: true,
            ..Default::default()
        };
        let c = tuning.derive();
        // faster sets acc to 5, bigger caps it at 3
        assert!((c.acceleration - 6.0 / 400.0 * 3.0).abs() < 1e-6);
        assert!((c.craft_half_width - 16.8).abs() < 1e-5);
        assert!((c.projectile_collision_range - 30.0).abs() < 1e-6);
        assert!((c.sun_flare_max - 120.0).abs() < 1e-6);
        assert_eq!(c.blast_count, 200);
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "scale_grav": 0.0, "start_layout": "SunDive" }"#)
            .expect("valid tuning json");
        assert_eq!(tuning.scale_grav, 0.0);
        assert_eq!(tuning.start_layout, StartLayout::SunDive);
        assert_eq!(tuning.fps, 20);
        assert_eq!(tuning.derive().gravity, 0.0);
    }

    #[test]
    fn test_json_rejects_garbage() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_ms_to_ticks_never_zero() {
        assert_eq!(ms_to_ticks(0.0, 20), 1);
        assert_eq!(ms_to_ticks(49.0, 20), 1);
        assert_eq!(ms_to_ticks(51.0, 20), 2);
    }

    #[test]
    fn test_start_layout_names() {
        assert_eq!(StartLayout::parse("Sun-Dive"), Some(StartLayout::SunDive));
        assert_eq!(StartLayout::parse(StartLayout::Random.as_str()), Some(StartLayout::Random));
        assert_eq!(StartLayout::parse("nope"), None);
    }
}
