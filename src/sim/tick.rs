//! Fixed timestep simulation tick
//!
//! One call advances the duel by exactly one frame. The steps always run in
//! the same order:
//! 1. due weapon timers
//! 2. controls (turn, thrust, fire)
//! 3. craft motion, then projectile motion
//! 4. staged explosions
//! 5. pause countdown
//! 6. collisions and round outcome
//! 7. sun flare and pointer trails
//! 8. reset, if the pause just ran out

use glam::Vec2;
use rand::Rng;

use super::collision;
use super::explosion;
use super::input::{ControlState, Maneuver};
use super::physics;
use super::state::{FlareFrame, RoundOutcome, RoundState, Side, SimulationState};
use super::weapon;
use crate::consts::WORLD_SIZE;
use crate::normalize_angle;

/// Advance the simulation by one tick
///
/// Returns the collision outcome of this tick alone (who was destroyed just
/// now); the running result is in `state.round.outcome`.
pub fn tick(state: &mut SimulationState) -> RoundOutcome {
    state.time_ticks += 1;

    weapon::process_due_events(state);

    // Keys may change between ticks but never during one
    let controls = state.controls.clone();
    apply_controls(state, &controls);

    physics::advance_crafts(state);
    physics::advance_projectiles(state);

    let mut last_pause_frame = false;
    if state.round.pause_countdown > 1 {
        state.round.pause_countdown -= 1;
    } else if state.round.pause_countdown == 1 {
        last_pause_frame = true;
    }

    let outcome = collision::detect(state);
    record_outcome(&mut state.round, outcome, state.constants.pause_frames);
    explosion::continue_explosions(state);

    push_flare(state);
    push_pointer(state, &controls);
    state.trails.check_consistency();

    if last_pause_frame {
        reset_round(state);
    }
    outcome
}

/// Apply held controls for this tick
///
/// Turning and thrust act every tick a key is held; firing is gated by the
/// weapon cooldown. Exhaust is cleared first so it only shows while thrusting.
fn apply_controls(state: &mut SimulationState, controls: &ControlState) {
    let rotation = state.constants.rotation_speed;
    for side in Side::BOTH {
        state.craft_mut(side).exhaust = 0.0;
        if state.round.outcome.has_lost(side) {
            continue;
        }

        if controls.is_held(side, Maneuver::Fire) {
            weapon::try_fire(state, side);
        }
        let roll = state.rng.random::<f32>();
        let craft = state.craft_mut(side);
        if controls.is_held(side, Maneuver::TurnLeft) {
            craft.angle = normalize_angle(craft.angle - rotation);
        }
        if controls.is_held(side, Maneuver::Thrust) {
            // Flame length flickers in [0.5h, 2h)
            craft.exhaust = craft.half_length * (0.5 + 1.5 * roll);
        }
        if controls.is_held(side, Maneuver::TurnRight) {
            craft.angle = normalize_angle(craft.angle + rotation);
        }
    }
}

/// Fold this tick's collisions into the round
fn record_outcome(round: &mut RoundState, tick_outcome: RoundOutcome, pause_frames: u32) {
    if !tick_outcome.is_decided() {
        return;
    }
    let first = !round.outcome.is_decided();
    round.outcome = round.outcome.accumulate(tick_outcome);

    if first {
        match round.outcome {
            RoundOutcome::WedgeWins => log::info!("Wedge wins!"),
            RoundOutcome::NeedleWins => log::info!("Needle wins!"),
            _ => log::info!("It's a tie!"),
        }
        round.pause_countdown = pause_frames;
    } else {
        let late = match tick_outcome {
            RoundOutcome::WedgeWins => "needle",
            _ => "wedge",
        };
        log::info!("Oops, {} exploded. Looks like it's a tie instead!", late);
    }
}

fn push_flare(state: &mut SimulationState) {
    let min = state.constants.sun_flare_min;
    let max = state.constants.sun_flare_max;
    let angle = state.rng.random::<f32>() * std::f32::consts::TAU;
    let length = min + (max - min) * state.rng.random::<f32>();
    state.trails.flare.push(FlareFrame { angle, length });
}

fn push_pointer(state: &mut SimulationState, controls: &ControlState) {
    let inside = |p: &Vec2| p.x > 0.0 && p.x < WORLD_SIZE && p.y > 0.0 && p.y < WORLD_SIZE;
    match controls.pointer.filter(inside) {
        Some(p) if controls.light_pen => state.trails.pointer.push(p),
        _ => state.trails.pointer.push_empty(),
    }
}

/// Start a new round
///
/// Craft return to their start-of-round copies, projectiles are cleared and
/// the round bookkeeping starts over. Trails are left alone so the wreckage
/// fades out naturally. Weapon timers from the old round become no-ops.
pub fn reset_round(state: &mut SimulationState) {
    state.restore_crafts();
    state.projectiles.clear();
    state.round = RoundState {
        number: state.round.number.wrapping_add(1),
        ..RoundState::default()
    };
    state.seed_opening_salvo();
    log::debug!("round {} begins", state.round.number);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::CENTER;
    use crate::sim::input::Control;
    use crate::sim::state::RoundPhase;

    fn press(state: &mut SimulationState, side: Side, maneuver: Maneuver) {
        state.controls.press(Control::new(side, maneuver));
    }

    fn release(state: &mut SimulationState, side: Side, maneuver: Maneuver) {
        state.controls.release(Control::new(side, maneuver));
    }

    fn assert_matches_template(state: &SimulationState, side: Side) {
        let craft = state.craft(side);
        let template = state.template(side);
        assert_eq!(craft.pos, template.pos);
        assert_eq!(craft.vel, template.vel);
        assert_eq!(craft.angle, template.angle);
        assert_eq!(craft.cooling_down, template.cooling_down);
    }

    #[test]
    fn test_sun_dive_round_trip() {
        let mut state = SimulationState::with_seed(12345);
        let pause = state.constants.pause_frames;
        state.craft_mut(Side::Wedge).pos = CENTER;

        let outcome = tick(&mut state);
        assert_eq!(outcome, RoundOutcome::NeedleWins);
        assert_eq!(state.round.outcome, RoundOutcome::NeedleWins);
        assert_eq!(state.round.phase(), RoundPhase::PendingReset { remaining: pause });

        for _ in 1..pause {
            tick(&mut state);
        }
        assert_eq!(state.round.outcome, RoundOutcome::NeedleWins);
        assert_eq!(state.round.pause_countdown, 1);

        tick(&mut state);
        assert_eq!(state.round.outcome, RoundOutcome::Undecided);
        assert_eq!(state.round.phase(), RoundPhase::Playing);
        assert_eq!(state.round.explosions, [None, None]);
        assert_eq!(state.round.number, 1);
        assert_matches_template(&state, Side::Wedge);
        assert_matches_template(&state, Side::Needle);
    }

    #[test]
    fn test_destroyed_craft_leaves_empty_trail() {
        let mut state = SimulationState::with_seed(1);
        state.craft_mut(Side::Wedge).pos = CENTER;
        tick(&mut state);
        let frozen = state.craft(Side::Wedge).clone();
        tick(&mut state);
        assert_eq!(state.craft(Side::Wedge), &frozen);
        assert!(state.trails.craft(Side::Wedge).latest().is_none());
        assert!(state.trails.craft(Side::Needle).latest().is_some());
    }

    #[test]
    fn test_same_tick_destruction_is_a_draw() {
        let mut state = SimulationState::with_seed(2);
        state.craft_mut(Side::Wedge).pos = CENTER;
        let needle = state.craft(Side::Needle).pos;
        state.projectiles.spawn(needle, Vec2::ZERO);

        assert_eq!(tick(&mut state), RoundOutcome::Draw);
        assert_eq!(state.round.outcome, RoundOutcome::Draw);
        assert!(state.round.explosions.iter().all(|e| e.is_some()));
    }

    #[test]
    fn test_late_destruction_downgrades_to_draw() {
        let mut state = SimulationState::with_seed(3);
        state.craft_mut(Side::Wedge).pos = CENTER;
        tick(&mut state);
        assert_eq!(state.round.outcome, RoundOutcome::NeedleWins);
        let countdown = state.round.pause_countdown;

        let needle = state.craft(Side::Needle).pos + state.craft(Side::Needle).vel;
        state.projectiles.spawn(needle, Vec2::ZERO);
        assert_eq!(tick(&mut state), RoundOutcome::WedgeWins);
        assert_eq!(state.round.outcome, RoundOutcome::Draw);
        // The pause keeps counting from the first decision
        assert_eq!(state.round.pause_countdown, countdown - 1);
    }

    #[test]
    fn test_reset_twice_is_idempotent() {
        let mut state = SimulationState::with_seed(4);
        press(&mut state, Side::Wedge, Maneuver::Thrust);
        press(&mut state, Side::Needle, Maneuver::Fire);
        for _ in 0..5 {
            tick(&mut state);
        }
        assert_eq!(state.projectiles.len(), 1);

        reset_round(&mut state);
        reset_round(&mut state);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.round.outcome, RoundOutcome::Undecided);
        assert_eq!(state.round.pause_countdown, 0);
        assert_matches_template(&state, Side::Wedge);
        assert_matches_template(&state, Side::Needle);
    }

    #[test]
    fn test_reset_reseeds_salvo_without_duplicates() {
        let constants = crate::Tuning {
            opening_salvo: crate::OpeningSalvo::Scattered,
            ..Default::default()
        }
        .derive();
        let mut state = SimulationState::new(constants, 8);
        assert_eq!(state.projectiles.len(), 40);
        reset_round(&mut state);
        reset_round(&mut state);
        assert_eq!(state.projectiles.len(), 40);
    }

    #[test]
    fn test_reload_gates_second_shot() {
        let mut state = SimulationState::with_seed(5);
        let reload = state.constants.reload_delay_ticks;
        press(&mut state, Side::Wedge, Maneuver::Fire);

        tick(&mut state);
        assert_eq!(state.projectiles.len(), 1);
        for _ in 1..reload {
            tick(&mut state);
        }
        assert_eq!(state.projectiles.len(), 1);
        assert!(state.craft(Side::Wedge).cooling_down);

        tick(&mut state);
        assert_eq!(state.projectiles.len(), 2);
    }

    #[test]
    fn test_projectile_expires_on_schedule() {
        let mut state = SimulationState::with_seed(6);
        let lifetime = state.constants.projectile_lifetime_ticks;
        press(&mut state, Side::Wedge, Maneuver::Fire);
        tick(&mut state);
        release(&mut state, Side::Wedge, Maneuver::Fire);
        let Some(id) = state.projectiles.active().next().map(|p| p.id) else {
            panic!("expected a projectile");
        };

        for _ in 1..lifetime {
            tick(&mut state);
        }
        assert!(state.projectiles.get(id).is_some_and(|p| p.active));

        // Expires at the start of the tick and is swept the same tick
        tick(&mut state);
        assert!(state.projectiles.get(id).is_none());
    }

    #[test]
    fn test_stale_expiry_after_reset_is_harmless() {
        let mut state = SimulationState::with_seed(7);
        press(&mut state, Side::Wedge, Maneuver::Fire);
        tick(&mut state);
        release(&mut state, Side::Wedge, Maneuver::Fire);
        reset_round(&mut state);

        let lifetime = state.constants.projectile_lifetime_ticks;
        for _ in 0..lifetime + 2 {
            tick(&mut state);
        }
        assert!(state.events.is_empty());
        assert!(!state.craft(Side::Wedge).cooling_down);
    }

    #[test]
    fn test_thrust_and_turn() {
        let mut state = SimulationState::with_seed(8);
        let start = state.craft(Side::Needle).angle;
        press(&mut state, Side::Needle, Maneuver::Thrust);
        press(&mut state, Side::Needle, Maneuver::TurnRight);
        tick(&mut state);

        let craft = state.craft(Side::Needle);
        let h = craft.half_length;
        assert!(craft.exhaust >= 0.5 * h && craft.exhaust < 2.0 * h);
        assert!((craft.angle - (start + state.constants.rotation_speed)).abs() < 1e-6);

        release(&mut state, Side::Needle, Maneuver::Thrust);
        tick(&mut state);
        assert_eq!(state.craft(Side::Needle).exhaust, 0.0);
    }

    #[test]
    fn test_flare_and_pointer_trails() {
        let mut state = SimulationState::with_seed(9);
        state.controls.pointer_moved(Vec2::new(250.0, 250.0));
        tick(&mut state);
        // Light pen off records nothing
        assert!(state.trails.pointer.latest().is_none());

        state.controls.toggle_light_pen();
        tick(&mut state);
        assert_eq!(state.trails.pointer.latest(), Some(&Vec2::new(250.0, 250.0)));

        state.controls.pointer_moved(Vec2::new(1000.0, 10.0));
        tick(&mut state);
        assert!(state.trails.pointer.latest().is_none());

        let Some(flare) = state.trails.flare.latest() else {
            panic!("expected a flare frame");
        };
        assert!(flare.length >= state.constants.sun_flare_min);
        assert!(flare.length <= state.constants.sun_flare_max);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed| {
            let mut state = SimulationState::with_seed(seed);
            press(&mut state, Side::Wedge, Maneuver::Thrust);
            press(&mut state, Side::Needle, Maneuver::Fire);
            for _ in 0..50 {
                tick(&mut state);
            }
            (state.craft(Side::Wedge).clone(), state.trails.particles.latest().cloned())
        };
        assert_eq!(run(77), run(77));
    }

    #[test]
    fn test_explosion_rings_per_tick() {
        let mut state = SimulationState::with_seed(31);
        state.craft_mut(Side::Wedge).pos = CENTER;
        let counts: Vec<_> = (0..5)
            .map(|_| {
                tick(&mut state);
                state.trails.particles.latest().map_or(0, |f| f.len())
            })
            .collect();
        // Core and first ring land together on the collision tick
        assert_eq!(counts, vec![200, 50, 25, 0, 0]);
    }

    #[test]
    fn test_extreme_rotation_tuning_still_ticks() {
        let Ok(tuning) = crate::Tuning::from_json(r#"{"scale_rot":1e12}"#) else {
            panic!("tuning should parse");
        };
        let mut state = SimulationState::new(tuning.derive(), 4);
        press(&mut state, Side::Wedge, Maneuver::TurnLeft);
        press(&mut state, Side::Needle, Maneuver::TurnRight);
        for _ in 0..3 {
            tick(&mut state);
        }
        for side in Side::BOTH {
            let angle = state.craft(side).angle;
            assert!((-std::f32::consts::PI..std::f32::consts::PI).contains(&angle));
        }
    }
}
