//! Simulation state and core types
//!
//! Everything the tick mutates lives in [`SimulationState`]; there are no
//! ambient globals.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::EventQueue;
use super::input::ControlState;
use super::ring::RingBuffer;
use crate::consts::{CENTER, WORLD_SIZE};
use crate::tuning::{Constants, OpeningSalvo, StartLayout};
use crate::{heading, torus_delta};

/// The two duelling craft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Wedge,
    Needle,
}

impl Side {
    /// Both sides, in update order
    pub const BOTH: [Side; 2] = [Side::Wedge, Side::Needle];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Wedge => 0,
            Side::Needle => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Wedge => "Wedge",
            Side::Needle => "Needle",
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Wedge => Side::Needle,
            Side::Needle => Side::Wedge,
        }
    }
}

/// A player craft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Craft {
    /// Half of the port-to-starboard width
    pub half_width: f32,
    /// Half of the bow-to-stern length
    pub half_length: f32,
    pub pos: Vec2,
    /// Heading in radians, clockwise on screen (y points down)
    pub angle: f32,
    /// World units per tick
    pub vel: Vec2,
    /// Weapon is reloading
    pub cooling_down: bool,
    /// Current exhaust flame length; zero when not thrusting
    pub exhaust: f32,
}

impl Craft {
    /// Start-of-round craft for a side
    pub fn template(side: Side, constants: &Constants) -> Self {
        let (pos, angle) = match (constants.start_layout, side) {
            (StartLayout::SunDive, Side::Wedge) => (Vec2::new(450.0, 550.0), -std::f32::consts::FRAC_PI_2),
            (StartLayout::SunDive, Side::Needle) => (Vec2::new(550.0, 450.0), std::f32::consts::FRAC_PI_2),
            (_, Side::Wedge) => (Vec2::new(200.0, 800.0), -std::f32::consts::FRAC_PI_2),
            (_, Side::Needle) => (Vec2::new(800.0, 200.0), std::f32::consts::FRAC_PI_2),
        };
        Self {
            half_width: constants.craft_half_width,
            half_length: constants.craft_half_length,
            pos,
            angle,
            vel: Vec2::ZERO,
            cooling_down: false,
            exhaust: 0.0,
        }
    }

    #[inline]
    pub fn is_thrusting(&self) -> bool {
        self.exhaust > 0.0
    }

    /// Tip of the hull
    pub fn nose(&self) -> Vec2 {
        self.pos + heading(self.angle) * self.half_length
    }
}

/// Stable handle to a projectile slot
///
/// The generation changes every time a slot is reused, so handles held by
/// pending timers go stale instead of hitting a newer projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectileId {
    pub index: u16,
    pub generation: u32,
}

/// A torpedo
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Inactive projectiles are skipped by movement, collision and rendering
    pub active: bool,
    /// Leave a small burst when swept (set on expiry only)
    pub fizzle: bool,
}

/// Number of projectile slots; identifiers wrap after this many shots
pub const PROJECTILE_SLOTS: usize = 100;

/// Fixed-capacity slot arena for projectiles
///
/// Removal leaves a tombstone; slots are handed out round-robin and a slot is
/// only reused when the spawn cursor comes back around to it.
#[derive(Debug, Clone)]
pub struct ProjectileArena {
    slots: Vec<Option<Projectile>>,
    generations: Vec<u32>,
    next: usize,
}

impl Default for ProjectileArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectileArena {
    pub fn new() -> Self {
        Self {
            slots: vec![None; PROJECTILE_SLOTS],
            generations: vec![0; PROJECTILE_SLOTS],
            next: 0,
        }
    }

    /// Place a new active projectile in the next slot
    pub fn spawn(&mut self, pos: Vec2, vel: Vec2) -> ProjectileId {
        let index = self.next;
        self.next = (self.next + 1) % PROJECTILE_SLOTS;

        if self.slots[index].is_some() {
            log::debug!("projectile slot {} overwritten while occupied", index);
        }
        self.generations[index] = self.generations[index].wrapping_add(1);
        let id = ProjectileId {
            index: index as u16,
            generation: self.generations[index],
        };
        self.slots[index] = Some(Projectile {
            id,
            pos,
            vel,
            active: true,
            fizzle: false,
        });
        id
    }

    /// Look up a projectile; stale handles return `None`
    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.slots
            .get(id.index as usize)
            .and_then(|s| s.as_ref())
            .filter(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.slots
            .get_mut(id.index as usize)
            .and_then(|s| s.as_mut())
            .filter(|p| p.id == id)
    }

    /// Tombstone a projectile. Returns false for stale handles.
    pub fn remove(&mut self, id: ProjectileId) -> bool {
        match self.slots.get_mut(id.index as usize) {
            Some(slot) if slot.as_ref().is_some_and(|p| p.id == id) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Lifetime ran out: deactivate and mark for a fizzle burst.
    /// Returns false if the handle no longer names a live projectile.
    pub fn expire(&mut self, id: ProjectileId) -> bool {
        match self.get_mut(id) {
            Some(p) if p.active => {
                p.active = false;
                p.fizzle = true;
                true
            }
            _ => false,
        }
    }

    /// All occupied slots, in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.slots.iter_mut().flatten()
    }

    /// Active projectiles, in slot order
    pub fn active(&self) -> impl Iterator<Item = &Projectile> {
        self.iter().filter(|p| p.active)
    }

    /// Occupied slot count (active or awaiting sweep)
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Tombstone every inactive projectile, returning the positions of those
    /// that should fizzle
    pub fn sweep_inactive(&mut self) -> Vec<Vec2> {
        let mut fizzles = Vec::new();
        for slot in &mut self.slots {
            if let Some(p) = slot.as_ref().filter(|p| !p.active) {
                if p.fizzle {
                    fizzles.push(p.pos);
                }
                *slot = None;
            }
        }
        fizzles
    }

    /// Drop every projectile. Generations are kept so old handles stay stale.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}

/// Who has won the current round
///
/// Encoded additively: a wedge win is 1, a needle win is 2, and both craft
/// lost is 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundOutcome {
    #[default]
    Undecided,
    WedgeWins,
    NeedleWins,
    Draw,
}

impl RoundOutcome {
    pub fn code(self) -> u8 {
        match self {
            RoundOutcome::Undecided => 0,
            RoundOutcome::WedgeWins => 1,
            RoundOutcome::NeedleWins => 2,
            RoundOutcome::Draw => 3,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            0 => RoundOutcome::Undecided,
            1 => RoundOutcome::WedgeWins,
            2 => RoundOutcome::NeedleWins,
            _ => RoundOutcome::Draw,
        }
    }

    /// Outcome of a single tick given which craft were destroyed
    pub fn from_destroyed(wedge: bool, needle: bool) -> Self {
        match (wedge, needle) {
            (false, false) => RoundOutcome::Undecided,
            (false, true) => RoundOutcome::WedgeWins,
            (true, false) => RoundOutcome::NeedleWins,
            (true, true) => RoundOutcome::Draw,
        }
    }

    /// Fold a tick's outcome into the round's running outcome
    pub fn accumulate(self, tick: RoundOutcome) -> RoundOutcome {
        RoundOutcome::from_code(self.code() + tick.code())
    }

    #[inline]
    pub fn is_decided(self) -> bool {
        self != RoundOutcome::Undecided
    }

    /// True once `side` has been destroyed this round
    pub fn has_lost(self, side: Side) -> bool {
        match (self, side) {
            (RoundOutcome::Draw, _) => true,
            (RoundOutcome::WedgeWins, Side::Needle) => true,
            (RoundOutcome::NeedleWins, Side::Wedge) => true,
            _ => false,
        }
    }
}

/// A big explosion still spreading over several ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuingExplosion {
    pub center: Vec2,
    /// Particles for the next stage
    pub remaining: u32,
    pub outer_radius: f32,
    pub inner_radius: f32,
    /// Added to both radii after each stage
    pub growth: f32,
}

/// Round controller phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Playing,
    /// A round was decided; the world resets when the countdown runs out
    PendingReset { remaining: u32 },
}

/// Per-round bookkeeping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundState {
    pub outcome: RoundOutcome,
    /// Ticks left before reset; zero while playing
    pub pause_countdown: u32,
    /// Staged craft explosions, indexed by side
    pub explosions: [Option<ContinuingExplosion>; 2],
    /// Increments at every reset; tags deferred weapon timers
    pub number: u32,
}

impl RoundState {
    pub fn phase(&self) -> RoundPhase {
        if self.pause_countdown > 0 {
            RoundPhase::PendingReset {
                remaining: self.pause_countdown,
            }
        } else {
            RoundPhase::Playing
        }
    }
}

/// Trail snapshot of a craft
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CraftFrame {
    pub pos: Vec2,
    pub angle: f32,
    pub exhaust: f32,
}

impl From<&Craft> for CraftFrame {
    fn from(craft: &Craft) -> Self {
        Self {
            pos: craft.pos,
            angle: craft.angle,
            exhaust: craft.exhaust,
        }
    }
}

/// Trail snapshot of the sun's flare line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlareFrame {
    pub angle: f32,
    pub length: f32,
}

/// Every dot drawn in one frame: projectiles and explosion particles
pub type ParticleFrame = Vec<Vec2>;

/// Afterimage history for everything that leaves a trail
#[derive(Debug, Clone)]
pub struct Trails {
    pub crafts: [RingBuffer<CraftFrame>; 2],
    pub particles: RingBuffer<ParticleFrame>,
    pub flare: RingBuffer<FlareFrame>,
    pub pointer: RingBuffer<Vec2>,
}

impl Trails {
    pub fn new(frames: usize) -> Self {
        Self {
            crafts: [RingBuffer::new(frames), RingBuffer::new(frames)],
            particles: RingBuffer::new(frames),
            flare: RingBuffer::new(frames),
            pointer: RingBuffer::new(frames),
        }
    }

    pub fn craft(&self, side: Side) -> &RingBuffer<CraftFrame> {
        &self.crafts[side.index()]
    }

    /// Both craft trails must advance in lockstep. A mismatch is a logic bug;
    /// it is reported and rendering carries on.
    pub fn check_consistency(&self) -> bool {
        let [wedge, needle] = &self.crafts;
        if wedge.cursor() != needle.cursor() {
            log::warn!(
                "craft trail cursors out of step: wedge {} needle {}",
                wedge.cursor(),
                needle.cursor()
            );
            return false;
        }
        true
    }
}

/// The complete simulation
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub constants: Constants,
    pub seed: u64,
    /// Ticks since startup
    pub time_ticks: u64,
    /// Indexed by [`Side::index`]
    pub crafts: [Craft; 2],
    templates: [Craft; 2],
    pub projectiles: ProjectileArena,
    pub round: RoundState,
    pub trails: Trails,
    /// Deferred weapon timers
    pub events: EventQueue,
    /// Held controls and pointer, written by the input side between ticks
    pub controls: ControlState,
    /// Background stars; doubled entries are drawn twice
    pub stars: Vec<Vec2>,
    pub(crate) rng: Pcg32,
}

impl SimulationState {
    /// Build a fresh simulation
    pub fn new(constants: Constants, seed: u64) -> Self {
        let templates = [
            Craft::template(Side::Wedge, &constants),
            Craft::template(Side::Needle, &constants),
        ];
        let mut state = Self {
            trails: Trails::new(constants.trail_frames),
            seed,
            time_ticks: 0,
            crafts: templates.clone(),
            templates,
            projectiles: ProjectileArena::new(),
            round: RoundState::default(),
            events: EventQueue::new(),
            controls: ControlState::default(),
            stars: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            constants,
        };
        state.scatter_stars();
        state.restore_crafts();
        state.seed_opening_salvo();
        state
    }

    /// Default constants with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self::new(Constants::default(), seed)
    }

    pub fn craft(&self, side: Side) -> &Craft {
        &self.crafts[side.index()]
    }

    pub fn craft_mut(&mut self, side: Side) -> &mut Craft {
        &mut self.crafts[side.index()]
    }

    /// Start-of-round copy of a side's craft
    pub fn template(&self, side: Side) -> &Craft {
        &self.templates[side.index()]
    }

    /// Craft still flying this round
    pub fn survivors(&self) -> impl Iterator<Item = (Side, &Craft)> {
        Side::BOTH
            .into_iter()
            .filter(|&side| !self.round.outcome.has_lost(side))
            .map(|side| (side, self.craft(side)))
    }

    /// Distance from a point to the central body
    pub fn distance_to_center(pos: Vec2) -> f32 {
        torus_delta(CENTER, pos).length()
    }

    /// Put both craft back to their start-of-round state
    pub(crate) fn restore_crafts(&mut self) {
        self.crafts = self.templates.clone();
        if self.constants.start_layout == StartLayout::Random {
            for craft in &mut self.crafts {
                craft.pos = Vec2::new(
                    self.rng.random::<f32>() * WORLD_SIZE,
                    self.rng.random::<f32>() * WORLD_SIZE,
                );
            }
        }
    }

    /// Seed the round's opening projectiles. These never expire on a timer.
    pub(crate) fn seed_opening_salvo(&mut self) {
        let s = self.constants.projectile_speed;
        match self.constants.opening_salvo {
            OpeningSalvo::None => {}
            OpeningSalvo::PhysicsDemo => {
                let demo = [
                    (100.0, 200.0, s, 0.0),
                    (300.0, 400.0, 0.0, -s),
                    (500.0, 200.0, -s, 0.0),
                    (700.0, 400.0, 0.0, s),
                    (710.0, 900.0, 0.0, -s),
                    (750.0, 400.0, 0.0, s),
                    (770.0, 900.0, 0.0, -s),
                    (500.0, 650.0, -s, 0.0),
                    (950.0, 650.0, -2.0 * s, 0.0),
                ];
                for (x, y, vx, vy) in demo {
                    self.projectiles.spawn(Vec2::new(x, y), Vec2::new(vx, vy));
                }
            }
            OpeningSalvo::Scattered => {
                for _ in 0..40 {
                    let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
                    let pos = Vec2::new(
                        self.rng.random::<f32>() * WORLD_SIZE,
                        self.rng.random::<f32>() * WORLD_SIZE,
                    );
                    self.projectiles.spawn(pos, heading(angle) * s * 0.75);
                }
            }
        }
    }

    fn scatter_stars(&mut self) {
        self.stars.clear();
        for _ in 0..self.constants.star_count {
            let star = Vec2::new(
                25.0 + 950.0 * self.rng.random::<f32>(),
                25.0 + 950.0 * self.rng.random::<f32>(),
            );
            self.stars.push(star);
            // Roughly half the stars get double brightness
            if self.rng.random::<f32>() > 0.5 {
                self.stars.push(star);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accumulates_additively() {
        let o = RoundOutcome::Undecided.accumulate(RoundOutcome::WedgeWins);
        assert_eq!(o, RoundOutcome::WedgeWins);
        assert_eq!(o.accumulate(RoundOutcome::NeedleWins), RoundOutcome::Draw);
        assert_eq!(
            RoundOutcome::from_destroyed(true, true),
            RoundOutcome::Draw
        );
        assert_eq!(
            RoundOutcome::from_destroyed(true, false),
            RoundOutcome::NeedleWins
        );
    }

    #[test]
    fn test_trails_out_of_step_is_reported() {
        let mut trails = Trails::new(8);
        trails.crafts[0].push_empty();
        trails.crafts[1].push_empty();
        assert!(trails.check_consistency());

        trails.crafts[0].push_empty();
        assert!(!trails.check_consistency());

        trails.crafts[1].push_empty();
        assert!(trails.check_consistency());
    }

    #[test]
    fn test_has_lost() {
        assert!(RoundOutcome::WedgeWins.has_lost(Side::Needle));
        assert!(!RoundOutcome::WedgeWins.has_lost(Side::Wedge));
        assert!(RoundOutcome::Draw.has_lost(Side::Wedge));
        assert!(!RoundOutcome::Undecided.has_lost(Side::Needle));
    }

    #[test]
    fn test_arena_stale_handle_is_ignored() {
        let mut arena = ProjectileArena::new();
        let first = arena.spawn(Vec2::new(1.0, 1.0), Vec2::ZERO);
        assert!(arena.remove(first));
        assert!(!arena.remove(first));
        assert!(!arena.expire(first));

        // Cycle the cursor back around to the same slot
        let mut reused = first;
        for _ in 0..PROJECTILE_SLOTS {
            reused = arena.spawn(Vec2::ZERO, Vec2::ZERO);
        }
        assert_eq!(reused.index, first.index);
        assert_ne!(reused.generation, first.generation);
        assert!(arena.get(first).is_none());
        assert!(!arena.expire(first));
        assert!(arena.get(reused).is_some_and(|p| p.active));
    }

    #[test]
    fn test_arena_expire_then_sweep_fizzles() {
        let mut arena = ProjectileArena::new();
        let a = arena.spawn(Vec2::new(10.0, 20.0), Vec2::ZERO);
        let b = arena.spawn(Vec2::new(30.0, 40.0), Vec2::ZERO);
        assert!(arena.expire(a));
        if let Some(p) = arena.get_mut(b) {
            p.active = false;
        }
        let fizzles = arena.sweep_inactive();
        assert_eq!(fizzles, vec![Vec2::new(10.0, 20.0)]);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_arena_clear_keeps_generations() {
        let mut arena = ProjectileArena::new();
        let id = arena.spawn(Vec2::ZERO, Vec2::ZERO);
        arena.clear();
        assert!(arena.get(id).is_none());
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn test_new_state_matches_templates() {
        let state = SimulationState::with_seed(7);
        for side in Side::BOTH {
            assert_eq!(state.craft(side), state.template(side));
        }
        assert_eq!(state.craft(Side::Wedge).pos, Vec2::new(200.0, 800.0));
        assert_eq!(state.craft(Side::Needle).pos, Vec2::new(800.0, 200.0));
        assert!(state.projectiles.is_empty());
        assert!(state.stars.len() >= state.constants.star_count);
    }

    #[test]
    fn test_opening_salvo_physics_demo() {
        let constants = crate::Tuning {
            opening_salvo: OpeningSalvo::PhysicsDemo,
            ..Default::default()
        }
        .derive();
        let state = SimulationState::new(constants, 1);
        assert_eq!(state.projectiles.len(), 9);
    }

    #[test]
    fn test_sun_dive_layout() {
        let constants = crate::Tuning {
            start_layout: StartLayout::SunDive,
            ..Default::default()
        }
        .derive();
        let state = SimulationState::new(constants, 1);
        assert_eq!(state.craft(Side::Wedge).pos, Vec2::new(450.0, 550.0));
    }
}
