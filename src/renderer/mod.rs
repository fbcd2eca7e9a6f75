//! Phosphor-style rendering
//!
//! The simulation never draws. Each frame, [`draw_frame`] reads the trail
//! buffers and live craft and issues immediate-mode calls on a [`Canvas`].
//! [`VertexCanvas`] turns those calls into triangles for the WebGPU pipeline.

pub mod hull;
pub mod palette;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use palette::Rgba;
pub use pipeline::RenderState;
pub use shapes::VertexCanvas;

use glam::Vec2;

use crate::consts::CENTER;
use crate::heading;
use crate::sim::{CraftFrame, RingBuffer, Side, SimulationState, Slot};
use hull::{HullPose, Stroke};

/// A 2D immediate-mode drawing surface in world units (0..1000, y down)
pub trait Canvas {
    fn clear(&mut self);
    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, color: Rgba);
    fn fill_square(&mut self, corner: Vec2, size: f32, color: Rgba);
}

/// Walk a trail from oldest to newest
///
/// Yields `(j, slot)` with `j` from 0 to `n`; both ends land on the newest
/// slot, first nearly invisible and last at full brightness.
fn trail_walk<T>(ring: &RingBuffer<T>) -> impl Iterator<Item = (usize, &Slot<T>)> {
    let n = ring.capacity();
    (0..=n).map(move |j| (j, ring.frame_at((n - j) % n)))
}

fn draw_strokes(canvas: &mut impl Canvas, strokes: &[Stroke], width: f32, color: Rgba) {
    for s in strokes {
        canvas.stroke_polyline(&s.points, s.closed, width, color);
    }
}

fn draw_craft(
    canvas: &mut impl Canvas,
    state: &SimulationState,
    side: Side,
    frame: &CraftFrame,
    color: Rgba,
) {
    let craft = state.craft(side);
    let width = state.constants.line_thickness;
    for pos in hull::wrapped_positions(frame.pos, craft.half_length) {
        let pose = HullPose {
            half_length: craft.half_length,
            half_width: craft.half_width,
            pos,
            angle: frame.angle,
            exhaust: frame.exhaust,
        };
        draw_strokes(canvas, &hull::outline(side, &pose), width, color);
    }
}

fn draw_dots(canvas: &mut impl Canvas, dots: &[Vec2], size: f32, color: Rgba) {
    for &p in dots {
        canvas.fill_square(p, size, color);
    }
}

/// Draw one complete frame
///
/// Back to front: debris and projectile trails, craft trails, pointer trail,
/// sun flare, stars, then the live craft and projectiles on top.
pub fn draw_frame(state: &SimulationState, canvas: &mut impl Canvas) {
    canvas.clear();
    let dot = state.constants.dot_thickness;
    let line = state.constants.line_thickness;

    let particles = &state.trails.particles;
    let n = particles.capacity();
    for (j, slot) in trail_walk(particles) {
        if let Some(frame) = slot.frame() {
            draw_dots(canvas, frame, dot, palette::dot_trail(j, n));
        }
    }

    for side in Side::BOTH {
        let ring = state.trails.craft(side);
        let n = ring.capacity();
        for (j, slot) in trail_walk(ring) {
            if let Some(frame) = slot.frame() {
                draw_craft(canvas, state, side, frame, palette::craft_trail(j, n));
            }
        }
    }

    let pointer = &state.trails.pointer;
    let n = pointer.capacity();
    for (j, slot) in trail_walk(pointer) {
        if let Some(&p) = slot.frame() {
            canvas.fill_square(p, dot, palette::dot_trail(j, n));
        }
    }

    let flare = &state.trails.flare;
    let n = flare.capacity();
    for (j, slot) in trail_walk(flare) {
        if let Some(f) = slot.frame() {
            let half = heading(f.angle) * (f.length / 2.0);
            canvas.stroke_polyline(&[CENTER + half, CENTER - half], false, line, palette::dot_trail(j, n));
        }
    }

    draw_dots(canvas, &state.stars, dot, palette::STAR);

    for (side, craft) in state.survivors() {
        draw_craft(canvas, state, side, &CraftFrame::from(craft), palette::LIVE);
    }
    if let Some(frame) = particles.latest() {
        draw_dots(canvas, frame, dot, palette::LIVE);
    }
}
