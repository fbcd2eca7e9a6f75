//! Collision detection
//!
//! Run once per tick after everything has moved. Order matters:
//! 1. craft against the sun
//! 2. craft against projectiles (circle pre-filter, then triangle hitbox)
//! 3. projectile against projectile

use glam::Vec2;

use super::explosion;
use super::state::{Craft, RoundOutcome, Side, SimulationState};
use crate::{heading, torus_delta};

/// Hitbox inflation and area tolerance
#[derive(Debug, Clone, Copy)]
pub struct HitboxTolerance {
    pub pad_length: f32,
    pub pad_width: f32,
    /// Allowed excess of the summed sub-triangle areas (twice-area units)
    pub area: f32,
}

impl HitboxTolerance {
    pub fn from_constants(c: &crate::Constants) -> Self {
        Self {
            pad_length: c.hitbox_pad_length,
            pad_width: c.hitbox_pad_width,
            area: c.hitbox_tolerance,
        }
    }
}

/// Corners of a craft's inflated hitbox relative to its center: nose, then
/// the two stern corners
pub fn hull_vertices(craft: &Craft, tol: HitboxTolerance) -> [Vec2; 3] {
    let h = craft.half_length + tol.pad_length;
    let w = craft.half_width + tol.pad_width;
    let dir = heading(craft.angle);
    let perp = dir.perp();
    [dir * h, -dir * h + perp * w, -dir * h - perp * w]
}

/// Is a point (relative to the craft's center) inside the triangle hitbox?
///
/// Compares the summed areas of the three sub-triangles the point forms with
/// the hull edges against the hull's own area. Inside points match exactly;
/// the tolerance makes the box a little forgiving near the edges.
pub fn point_in_hull(craft: &Craft, rel: Vec2, tol: HitboxTolerance) -> bool {
    let [a, b, c] = hull_vertices(craft, tol);
    let h = craft.half_length + tol.pad_length;
    let w = craft.half_width + tol.pad_width;
    let twice_area = 4.0 * h * w;

    let (pa, pb, pc) = (a - rel, b - rel, c - rel);
    let summed = pa.perp_dot(pb).abs() + pb.perp_dot(pc).abs() + pc.perp_dot(pa).abs();
    summed - twice_area < tol.area
}

/// Has the craft flown into the sun?
pub fn hits_center(craft: &Craft) -> bool {
    SimulationState::distance_to_center(craft.pos) < craft.half_length
}

/// Check one craft against the sun and every live projectile
///
/// Projectiles that hit are removed. Returns true if the craft was destroyed.
fn check_craft(state: &mut SimulationState, side: Side, tol: HitboxTolerance) -> bool {
    let craft = state.craft(side).clone();
    let mut destroyed = hits_center(&craft);

    let reach = 2.0 * craft.half_length;
    let hits: Vec<_> = state
        .projectiles
        .active()
        .filter_map(|p| {
            let rel = torus_delta(craft.pos, p.pos);
            (rel.length() < reach && point_in_hull(&craft, rel, tol)).then_some(p.id)
        })
        .collect();
    for id in hits {
        state.projectiles.remove(id);
        destroyed = true;
    }

    if destroyed {
        let boom = explosion::ignite(state, craft.pos);
        state.round.explosions[side.index()] = Some(boom);
    }
    destroyed
}

/// Deactivate every pair of live projectiles closer than `range`
///
/// No particles are generated; the pair simply disappears on the next sweep.
pub fn resolve_projectile_contacts(state: &mut SimulationState, range: f32) {
    let live: Vec<_> = state.projectiles.active().map(|p| (p.id, p.pos)).collect();
    let mut doomed = Vec::new();
    for (i, &(a, pa)) in live.iter().enumerate() {
        for &(b, pb) in &live[i + 1..] {
            if torus_delta(pa, pb).length() < range {
                doomed.push(a);
                doomed.push(b);
            }
        }
    }
    for id in doomed {
        if let Some(p) = state.projectiles.get_mut(id) {
            p.active = false;
        }
    }
}

/// Run every collision check for this tick
///
/// Returns which craft were destroyed this tick. Craft that already lost the
/// round are skipped.
pub fn detect(state: &mut SimulationState) -> RoundOutcome {
    let tol = HitboxTolerance::from_constants(&state.constants);
    let mut destroyed = [false; 2];
    for side in Side::BOTH {
        if state.round.outcome.has_lost(side) {
            continue;
        }
        destroyed[side.index()] = check_craft(state, side, tol);
    }

    let range = state.constants.projectile_collision_range;
    resolve_projectile_contacts(state, range);

    RoundOutcome::from_destroyed(destroyed[0], destroyed[1])
}
