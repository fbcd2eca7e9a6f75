//! Deferred weapon timers
//!
//! Projectile expiry and weapon rearm happen a fixed number of ticks after a
//! shot. They are queued here and drained at the start of each tick, so the
//! simulation never depends on wall-clock timers.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::state::{ProjectileId, Side};

/// Something that must happen at a later tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredEvent {
    /// Projectile lifetime ran out
    Expire(ProjectileId),
    /// Weapon reload finished. Ignored if the round has since been reset.
    Rearm { side: Side, round: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scheduled {
    due: u64,
    seq: u64,
    event: DeferredEvent,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of deferred events keyed by due tick, then insertion order
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `event` to fire once the tick counter reaches `due`
    pub fn schedule(&mut self, due: u64, event: DeferredEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled { due, seq, event }));
    }

    /// Remove and return the earliest event due at or before `now`
    pub fn pop_due(&mut self, now: u64) -> Option<DeferredEvent> {
        match self.heap.peek() {
            Some(Reverse(s)) if s.due <= now => self.heap.pop().map(|Reverse(s)| s.event),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
