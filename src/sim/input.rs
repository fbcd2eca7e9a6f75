//! Player controls
//!
//! Key events arrive asynchronously and only flip held flags here; the tick
//! samples a snapshot once at its start so a tick always sees one consistent
//! control set.

use glam::Vec2;

use super::state::Side;

/// What a control key does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Maneuver {
    Fire,
    TurnLeft,
    Thrust,
    TurnRight,
}

impl Maneuver {
    #[inline]
    fn index(self) -> usize {
        match self {
            Maneuver::Fire => 0,
            Maneuver::TurnLeft => 1,
            Maneuver::Thrust => 2,
            Maneuver::TurnRight => 3,
        }
    }
}

/// One of the eight control keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Control {
    pub side: Side,
    pub maneuver: Maneuver,
}

impl Control {
    /// Every control, in key order w a s d i j k l
    pub const ALL: [Control; 8] = [
        Control::new(Side::Wedge, Maneuver::Fire),
        Control::new(Side::Wedge, Maneuver::TurnLeft),
        Control::new(Side::Wedge, Maneuver::Thrust),
        Control::new(Side::Wedge, Maneuver::TurnRight),
        Control::new(Side::Needle, Maneuver::Fire),
        Control::new(Side::Needle, Maneuver::TurnLeft),
        Control::new(Side::Needle, Maneuver::Thrust),
        Control::new(Side::Needle, Maneuver::TurnRight),
    ];

    pub const fn new(side: Side, maneuver: Maneuver) -> Self {
        Self { side, maneuver }
    }

    /// Map a keyboard key to a control. Case-insensitive; other keys are ignored.
    pub fn from_key(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        let c = chars.next()?.to_ascii_lowercase();
        if chars.next().is_some() {
            return None;
        }
        let (side, maneuver) = match c {
            'w' => (Side::Wedge, Maneuver::Fire),
            'a' => (Side::Wedge, Maneuver::TurnLeft),
            's' => (Side::Wedge, Maneuver::Thrust),
            'd' => (Side::Wedge, Maneuver::TurnRight),
            'i' => (Side::Needle, Maneuver::Fire),
            'j' => (Side::Needle, Maneuver::TurnLeft),
            'k' => (Side::Needle, Maneuver::Thrust),
            'l' => (Side::Needle, Maneuver::TurnRight),
            _ => return None,
        };
        Some(Self::new(side, maneuver))
    }
}

/// Held controls plus the pointer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlState {
    held: [[bool; 4]; 2],
    /// Last pointer position in world units
    pub pointer: Option<Vec2>,
    /// Record the pointer into its trail
    pub light_pen: bool,
}

impl ControlState {
    pub fn press(&mut self, control: Control) {
        self.held[control.side.index()][control.maneuver.index()] = true;
    }

    pub fn release(&mut self, control: Control) {
        self.held[control.side.index()][control.maneuver.index()] = false;
    }

    /// Convenience for wiring raw key events
    pub fn set_key(&mut self, key: &str, down: bool) -> bool {
        match Control::from_key(key) {
            Some(control) if down => {
                self.press(control);
                true
            }
            Some(control) => {
                self.release(control);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_held(&self, side: Side, maneuver: Maneuver) -> bool {
        self.held[side.index()][maneuver.index()]
    }

    pub fn pointer_moved(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
    }

    pub fn toggle_light_pen(&mut self) {
        self.light_pen = !self.light_pen;
        log::debug!("light pen {}", if self.light_pen { "on" } else { "off" });
    }

    /// Release every control
    pub fn release_all(&mut self) {
        self.held = [[false; 4]; 2];
    }
}
