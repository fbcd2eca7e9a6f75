//! Torpedo launcher
//!
//! Each craft has a single cooldown gate. Firing arms two deferred timers:
//! one retires the projectile, the other reopens the gate.

use super::events::DeferredEvent;
use super::state::{Side, SimulationState};
use crate::{heading, wrap_position};

/// Launch a projectile from `side` if its weapon is ready
///
/// Returns true when a projectile was spawned. A craft that has lost this
/// round, or one still reloading, cannot fire.
pub fn try_fire(state: &mut SimulationState, side: Side) -> bool {
    if state.round.outcome.has_lost(side) {
        return false;
    }
    let craft = &state.crafts[side.index()];
    if craft.cooling_down {
        return false;
    }

    let dir = heading(craft.angle);
    let pos = wrap_position(craft.nose() + state.constants.muzzle_offset * dir);
    let vel = state.constants.projectile_speed * dir + craft.vel;

    let id = state.projectiles.spawn(pos, vel);
    state.crafts[side.index()].cooling_down = true;

    let now = state.time_ticks;
    state.events.schedule(
        now + state.constants.projectile_lifetime_ticks,
        DeferredEvent::Expire(id),
    );
    state.events.schedule(
        now + state.constants.reload_delay_ticks,
        DeferredEvent::Rearm {
            side,
            round: state.round.number,
        },
    );
    log::debug!("pew! {} fired projectile {}:{}", side.name(), id.index, id.generation);
    true
}

/// Apply every deferred event that has come due
///
/// Events naming a projectile that no longer exists, or a round that has
/// already been reset, do nothing.
pub fn process_due_events(state: &mut SimulationState) {
    while let Some(event) = state.events.pop_due(state.time_ticks) {
        match event {
            DeferredEvent::Expire(id) => {
                if !state.projectiles.expire(id) {
                    log::debug!("expiry for stale projectile {}:{} ignored", id.index, id.generation);
                }
            }
            DeferredEvent::Rearm { side, round } => {
                if round == state.round.number {
                    state.crafts[side.index()].cooling_down = false;
                } else {
                    log::debug!("rearm for {} from round {} ignored", side.name(), round);
                }
            }
        }
    }
}
