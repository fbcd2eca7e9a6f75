//! Particle bursts
//!
//! Bursts are not entities: their particles are written straight into the
//! current particle frame and fade with the trail.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{ContinuingExplosion, ParticleFrame, SimulationState};
use crate::{heading, wrap_position};

/// Scatter `count` particles around `center` into `frame`
///
/// Each particle gets a uniform angle and a distance built from the sum of
/// four uniforms, which bunches up around the middle of `[inner, outer]`.
/// The tails are not clamped.
pub fn burst(
    frame: &mut ParticleFrame,
    center: Vec2,
    count: u32,
    outer: f32,
    inner: f32,
    rng: &mut Pcg32,
) {
    let mid = (inner + outer) / 2.0;
    let half_span = (outer - inner) / 2.0;
    frame.reserve(count as usize);
    for _ in 0..count {
        let theta = rng.random::<f32>() * std::f32::consts::TAU;
        // In [-1, 1), peaked at 0
        let spread = (rng.random::<f32>()
            + rng.random::<f32>()
            + rng.random::<f32>()
            + rng.random::<f32>())
            / 2.0
            - 1.0;
        let d = mid + half_span * spread;
        frame.push(wrap_position(center + heading(theta) * d));
    }
}

/// Blow up a craft at `center`
///
/// Writes the inner core into this tick's frame and returns the descriptor
/// for the expanding rings. The first ring lands later in the same tick.
pub fn ignite(state: &mut SimulationState, center: Vec2) -> ContinuingExplosion {
    let count = state.constants.blast_count;
    let radius = state.constants.blast_radius;
    let SimulationState { trails, rng, .. } = state;
    if let Some(frame) = trails.particles.latest_mut() {
        burst(frame, center, count, radius / 2.0, 0.0, rng);
    }
    ContinuingExplosion {
        center,
        remaining: count,
        outer_radius: radius,
        inner_radius: radius / 2.0,
        growth: radius / 2.0,
    }
}

/// Run one more stage of every staged explosion
///
/// Runs after collisions, so a fresh explosion gets its first ring on the
/// tick it ignites. Each stage halves the particle count and pushes the ring
/// outward. An
/// explosion stops once its count falls below an eighth of the full blast.
pub fn continue_explosions(state: &mut SimulationState) {
    let full = state.constants.blast_count;
    let SimulationState {
        trails, rng, round, ..
    } = state;
    let Some(frame) = trails.particles.latest_mut() else {
        return;
    };
    for slot in &mut round.explosions {
        let Some(boom) = slot.as_mut() else {
            continue;
        };
        burst(frame, boom.center, boom.remaining, boom.outer_radius, boom.inner_radius, rng);
        boom.remaining /= 2;
        boom.outer_radius += boom.growth;
        boom.inner_radius += boom.growth;
        if boom.remaining * 8 < full {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::WORLD_SIZE;
    use rand::SeedableRng;

    #[test]
    fn test_burst_count_and_wrap() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut frame = Vec::new();
        burst(&mut frame, Vec2::new(5.0, 995.0), 200, 160.0, 80.0, &mut rng);
        assert_eq!(frame.len(), 200);
        for p in &frame {
            assert!((0.0..WORLD_SIZE).contains(&p.x));
            assert!((0.0..WORLD_SIZE).contains(&p.y));
        }
    }

    #[test]
    fn test_burst_stays_near_nominal_band() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut frame = Vec::new();
        let center = Vec2::new(500.0, 500.0);
        burst(&mut frame, center, 500, 100.0, 50.0, &mut rng);
        // Spread is bounded by [-1, 1), so distances stay inside [inner, outer]
        for p in &frame {
            let d = p.distance(center);
            assert!(d >= 50.0 - 1e-3 && d <= 100.0 + 1e-3, "distance {d}");
        }
    }

    #[test]
    fn test_staged_explosion_shrinks_and_ends() {
        let mut state = SimulationState::with_seed(9);
        state.trails.particles.push(Vec::new());
        let boom = ignite(&mut state, Vec2::new(300.0, 300.0));
        let full = state.constants.blast_count;
        assert_eq!(state.trails.particles.latest().map(|f| f.len()), Some(full as usize));
        assert_eq!(boom.remaining, full);
        assert_eq!(boom.outer_radius, state.constants.blast_radius);
        state.round.explosions[0] = Some(boom);

        // First ring shares the ignition frame
        continue_explosions(&mut state);
        let mut stages = vec![state.trails.particles.latest().map_or(0, |f| f.len())];
        while state.round.explosions[0].is_some() {
            state.trails.particles.push(Vec::new());
            continue_explosions(&mut state);
            stages.push(state.trails.particles.latest().map_or(0, |f| f.len()));
            assert!(stages.len() < 10);
        }
        assert_eq!(stages, vec![200, 50, 25]);
    }
}
