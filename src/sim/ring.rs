//! Fixed-capacity ring of per-frame snapshots
//!
//! One slot per rendered frame. The write cursor walks backwards, so the most
//! recent entry always sits one slot ahead of it. Looking back `age` frames
//! means walking forward from there.

/// Contents of one ring slot
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    /// Never written since the buffer was created
    Vacant,
    /// Explicit "nothing this frame" marker (entity absent)
    Empty,
    /// A recorded snapshot
    Frame(T),
}

impl<T> Slot<T> {
    /// The snapshot, if this slot holds one
    pub fn frame(&self) -> Option<&T> {
        match self {
            Slot::Frame(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_vacant(&self) -> bool {
        matches!(self, Slot::Vacant)
    }
}

/// Circular buffer with a decrementing write cursor
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<Slot<T>>,
    /// Next slot to overwrite (the oldest one once the ring is full)
    cursor: usize,
}

impl<T> RingBuffer<T> {
    /// Create a ring with `capacity` slots (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot::Vacant);
        Self {
            slots,
            cursor: capacity - 1,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Current write cursor
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn write(&mut self, slot: Slot<T>) {
        self.slots[self.cursor] = slot;
        self.cursor = (self.cursor + self.slots.len() - 1) % self.slots.len();
    }

    /// Record a snapshot for this frame
    pub fn push(&mut self, value: T) {
        self.write(Slot::Frame(value));
    }

    /// Record an explicit empty marker for this frame
    pub fn push_empty(&mut self) {
        self.write(Slot::Empty);
    }

    /// Slot written `age` frames before the newest one
    ///
    /// `age` 0 is the newest slot; ages wrap modulo capacity, so `age ==
    /// capacity` is the newest slot again.
    pub fn frame_at(&self, age: usize) -> &Slot<T> {
        let n = self.slots.len();
        &self.slots[(self.cursor + 1 + age % n) % n]
    }

    /// Mutable access to the newest slot's snapshot
    pub fn latest_mut(&mut self) -> Option<&mut T> {
        let n = self.slots.len();
        match &mut self.slots[(self.cursor + 1) % n] {
            Slot::Frame(v) => Some(v),
            _ => None,
        }
    }

    /// Newest snapshot, if the newest slot holds one
    pub fn latest(&self) -> Option<&T> {
        self.frame_at(0).frame()
    }
}
