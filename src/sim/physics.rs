//! Motion integration
//!
//! Craft feel thrust and the sun's gravity; projectiles coast in straight
//! lines. Everything wraps onto the torus after moving.

use glam::Vec2;

use super::explosion;
use super::state::{Craft, CraftFrame, Side, SimulationState};
use crate::consts::{CENTER, MIN_GRAVITY_DISTANCE};
use crate::{heading, wrap_position};

/// Velocity change from the central body's gravity for one tick
///
/// Inverse-square pull toward the center with gravitational parameter `g`.
/// The distance is clamped to [`MIN_GRAVITY_DISTANCE`] so a craft sitting on
/// the center gets a bounded kick instead of a division blow-up.
pub fn gravity_delta(pos: Vec2, g: f32) -> Vec2 {
    let offset = pos - CENTER;
    let dist = offset.length().max(MIN_GRAVITY_DISTANCE);
    -g * offset / (dist * dist * dist)
}

/// Advance one craft by a tick: thrust, gravity, then move and wrap
pub fn integrate_craft(craft: &mut Craft, acceleration: f32, g: f32) {
    if craft.is_thrusting() {
        craft.vel += acceleration * heading(craft.angle);
    }
    craft.vel += gravity_delta(craft.pos, g);
    craft.pos = wrap_position(craft.pos + craft.vel);
}

/// Move both craft and record their trail frames
///
/// A craft that has lost this round stays frozen and writes an empty marker,
/// so both trails advance together.
pub fn advance_crafts(state: &mut SimulationState) {
    let acceleration = state.constants.acceleration;
    let g = state.constants.gravity;
    for side in Side::BOTH {
        let i = side.index();
        if state.round.outcome.has_lost(side) {
            state.trails.crafts[i].push_empty();
            continue;
        }
        integrate_craft(&mut state.crafts[i], acceleration, g);
        let frame = CraftFrame::from(&state.crafts[i]);
        state.trails.crafts[i].push(frame);
    }
}

/// Open this tick's particle frame, sweep dead projectiles and move live ones
///
/// Expired projectiles leave a small fizzle burst as they are removed.
pub fn advance_projectiles(state: &mut SimulationState) {
    state.trails.particles.push(Vec::new());

    let fizzle_count = state.constants.fizzle_count;
    let fizzle_radius = state.constants.fizzle_radius;
    let fizzles = state.projectiles.sweep_inactive();

    let SimulationState {
        projectiles,
        trails,
        rng,
        ..
    } = state;
    let Some(frame) = trails.particles.latest_mut() else {
        return;
    };

    for pos in fizzles {
        explosion::burst(frame, pos, fizzle_count, fizzle_radius, 0.0, rng);
    }

    for p in projectiles.iter_mut().filter(|p| p.active) {
        p.pos = wrap_position(p.pos + p.vel);
        frame.push(p.pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::WORLD_SIZE;
    use proptest::prelude::*;

    fn craft_at(pos: Vec2, vel: Vec2) -> Craft {
        let mut craft = Craft::template(Side::Wedge, &crate::Constants::default());
        craft.pos = pos;
        craft.vel = vel;
        craft
    }

    proptest! {
        #[test]
        fn prop_integration_keeps_craft_on_torus(
            x in 0.0f32..1000.0,
            y in 0.0f32..1000.0,
            vx in -5000.0f32..5000.0,
            vy in -5000.0f32..5000.0,
        ) {
            let mut craft = craft_at(Vec2::new(x, y), Vec2::new(vx, vy));
            integrate_craft(&mut craft, 0.015, 1750.0);
            prop_assert!((0.0..WORLD_SIZE).contains(&craft.pos.x));
            prop_assert!((0.0..WORLD_SIZE).contains(&craft.pos.y));
        }

        #[test]
        fn prop_gravity_points_at_center_with_inverse_square(
            angle in 0.0f32..std::f32::consts::TAU,
            dist in 2.0f32..700.0,
        ) {
            let g = 1750.0;
            let pos = CENTER + heading(angle) * dist;
            let dv = gravity_delta(pos, g);
            prop_assert!(dv.dot(pos - CENTER) < 0.0);
            let expected = g / (dist * dist);
            prop_assert!((dv.length() - expected).abs() <= expected * 1e-3);
        }
    }

    #[test]
    fn test_gravity_at_center_is_finite() {
        let dv = gravity_delta(CENTER, 1750.0);
        assert!(dv.is_finite());
        assert_eq!(dv, Vec2::ZERO);

        let near = gravity_delta(CENTER + Vec2::new(1e-4, 0.0), 1750.0);
        assert!(near.is_finite());
        assert!(near.length() <= 1750.0);
    }

    #[test]
    fn test_thrust_follows_heading() {
        // Far corner so gravity is tiny compared to thrust
        let mut craft = craft_at(Vec2::new(100.0, 100.0), Vec2::ZERO);
        craft.angle = 0.0;
        craft.exhaust = 10.0;
        integrate_craft(&mut craft, 1.0, 0.0);
        assert!((craft.vel - Vec2::new(1.0, 0.0)).length() < 1e-6);
        assert!((craft.pos - Vec2::new(101.0, 100.0)).length() < 1e-4);
    }

    #[test]
    fn test_projectiles_coast_without_gravity() {
        let mut state = SimulationState::with_seed(3);
        let id = state
            .projectiles
            .spawn(Vec2::new(400.0, 500.0), Vec2::new(0.0, 3.0));
        advance_projectiles(&mut state);
        let p = state.projectiles.get(id).map(|p| (p.pos, p.vel));
        assert_eq!(p, Some((Vec2::new(400.0, 503.0), Vec2::new(0.0, 3.0))));
        assert_eq!(state.trails.particles.latest().map(|f| f.len()), Some(1));
    }

    #[test]
    fn test_expired_projectile_fizzles_on_sweep() {
        let mut state = SimulationState::with_seed(3);
        let id = state.projectiles.spawn(Vec2::new(100.0, 100.0), Vec2::ZERO);
        assert!(state.projectiles.expire(id));
        advance_projectiles(&mut state);
        assert!(state.projectiles.get(id).is_none());
        let frame = state.trails.particles.latest().map(|f| f.len());
        assert_eq!(frame, Some(state.constants.fizzle_count as usize));
    }

    #[test]
    fn test_lost_craft_records_empty_trail() {
        let mut state = SimulationState::with_seed(3);
        state.round.outcome = crate::sim::state::RoundOutcome::WedgeWins;
        let before = state.craft(Side::Needle).clone();
        advance_crafts(&mut state);
        assert_eq!(state.craft(Side::Needle), &before);
        assert!(state.trails.craft(Side::Needle).latest().is_none());
        assert!(state.trails.craft(Side::Wedge).latest().is_some());
        assert!(state.trails.check_consistency());
    }
}
