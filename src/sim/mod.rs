//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (wedge before needle, projectiles by slot)
//! - No rendering or platform dependencies

pub mod collision;
pub mod events;
pub mod explosion;
pub mod input;
pub mod physics;
pub mod ring;
pub mod state;
pub mod tick;
pub mod weapon;

pub use collision::{HitboxTolerance, detect, hits_center, point_in_hull};
pub use events::{DeferredEvent, EventQueue};
pub use input::{Control, ControlState, Maneuver};
pub use ring::{RingBuffer, Slot};
pub use state::{
    ContinuingExplosion, Craft, CraftFrame, FlareFrame, ParticleFrame, Projectile,
    ProjectileArena, ProjectileId, RoundOutcome, RoundPhase, RoundState, Side, SimulationState,
    Trails, PROJECTILE_SLOTS,
};
pub use tick::{reset_round, tick};
pub use weapon::try_fire;
