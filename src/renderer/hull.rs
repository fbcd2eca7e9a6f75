//! Craft outlines
//!
//! Both hulls are built in world units from the craft's half-length `h`,
//! half-width `w`, position and heading. `dir` points from stern to nose and
//! `perp` is `dir` turned a quarter clockwise on screen.

use glam::Vec2;

use crate::consts::WORLD_SIZE;
use crate::heading;
use crate::sim::Side;

/// Segments used to approximate each curved flank of the wedge
const ARC_SEGMENTS: usize = 8;

/// One pen stroke
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub points: Vec<Vec2>,
    /// Join the last point back to the first
    pub closed: bool,
}

impl Stroke {
    fn open(points: Vec<Vec2>) -> Self {
        Self { points, closed: false }
    }

    fn closed(points: Vec<Vec2>) -> Self {
        Self { points, closed: true }
    }
}

/// Pose of a hull to draw
#[derive(Debug, Clone, Copy)]
pub struct HullPose {
    pub half_length: f32,
    pub half_width: f32,
    pub pos: Vec2,
    pub angle: f32,
    /// Exhaust flame length, 0 when not thrusting
    pub exhaust: f32,
}

struct Frame {
    dir: Vec2,
    perp: Vec2,
    nose: Vec2,
    stern: Vec2,
}

impl Frame {
    fn new(pose: &HullPose) -> Self {
        let dir = heading(pose.angle);
        Self {
            dir,
            perp: dir.perp(),
            nose: pose.pos + dir * pose.half_length,
            stern: pose.pos - dir * pose.half_length,
        }
    }

    /// Point on the hull axis, `t` of the way from stern to nose
    fn along(&self, t: f32) -> Vec2 {
        self.stern.lerp(self.nose, t)
    }
}

/// Points along a circular arc, sweeping clockwise on screen from `start` to `end`
fn arc(center: Vec2, radius: f32, start: f32, end: f32) -> impl Iterator<Item = Vec2> {
    (0..=ARC_SEGMENTS).map(move |i| {
        let t = i as f32 / ARC_SEGMENTS as f32;
        center + heading(start + (end - start) * t) * radius
    })
}

fn exhaust(f: &Frame, length: f32) -> Option<Stroke> {
    (length > 0.0).then(|| Stroke::open(vec![f.stern, f.stern - f.dir * length]))
}

/// The wedge: two bulging flanks meeting at the nose, plus swept-back fins
pub fn wedge(pose: &HullPose) -> Vec<Stroke> {
    let f = Frame::new(pose);
    let w = pose.half_width;
    let back = f.along(0.47);
    let back2 = f.along(0.35);
    let back3 = f.along(0.16);
    let back4 = f.along(0.1);

    let rad = 4.72 * w;
    let curvature = 4.7 * w * 1.145;
    let (lo, hi) = (61.5f32.to_radians(), 114.67f32.to_radians());

    let mut body = vec![f.nose];
    body.extend(arc(back - f.perp * rad, curvature, lo + pose.angle, hi + pose.angle));
    body.extend(arc(back + f.perp * rad, curvature, -hi + pose.angle, -lo + pose.angle));

    let fin = |s: f32| {
        Stroke::open(vec![
            back2 + f.perp * (0.65 * w * s),
            back3 + f.perp * (1.15 * w * s),
            f.stern + f.perp * (1.2 * w * s),
            f.stern + f.perp * (0.7 * w * s),
            back4 + f.perp * (0.35 * w * s),
        ])
    };

    let mut strokes = vec![Stroke::closed(body), fin(1.0), fin(-1.0)];
    strokes.extend(exhaust(&f, pose.exhaust));
    strokes
}

/// The needle: a slim pointed body with long narrow fins
pub fn needle(pose: &HullPose) -> Vec<Stroke> {
    let f = Frame::new(pose);
    let w = pose.half_width;
    let (w1, w2, w3) = (w * 2.0 / 9.0, w * 17.0 / 30.0, w * 2.0 / 3.0);
    let front = f.along(0.85);
    let front2 = f.along(0.34);
    let front3 = f.along(0.32);

    let body = vec![
        f.nose,
        front + f.perp * w1,
        f.stern + f.perp * w1,
        f.stern - f.perp * w1,
        front - f.perp * w1,
    ];

    let fin = |s: f32| {
        Stroke::open(vec![
            front2 + f.perp * (w1 * s),
            front2 + f.perp * (w2 * s),
            front3 + f.perp * (w3 * s),
            f.stern + f.perp * (w3 * s),
            f.stern + f.perp * (w1 * s),
        ])
    };

    let mut strokes = vec![Stroke::closed(body), fin(1.0), fin(-1.0)];
    strokes.extend(exhaust(&f, pose.exhaust));
    strokes
}

/// Outline for either side
pub fn outline(side: Side, pose: &HullPose) -> Vec<Stroke> {
    match side {
        Side::Wedge => wedge(pose),
        Side::Needle => needle(pose),
    }
}

/// Positions to draw a hull at so it shows on both sides of a world edge
///
/// A craft within 1.5 half-lengths of an edge is also drawn shifted across
/// it. The unshifted position is always last.
pub fn wrapped_positions(pos: Vec2, half_length: f32) -> Vec<Vec2> {
    let low = 1.5 * half_length;
    let high = WORLD_SIZE - low;
    let mut out = Vec::with_capacity(3);
    if pos.x < low {
        out.push(pos + Vec2::new(WORLD_SIZE, 0.0));
    } else if pos.x > high {
        out.push(pos - Vec2::new(WORLD_SIZE, 0.0));
    }
    if pos.y < low {
        out.push(pos + Vec2::new(0.0, WORLD_SIZE));
    } else if pos.y > high {
        out.push(pos - Vec2::new(0.0, WORLD_SIZE));
    }
    out.push(pos);
    out
}
