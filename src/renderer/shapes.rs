//! Tessellation of canvas primitives into triangles

use glam::Vec2;

use super::Canvas;
use super::palette::Rgba;
use super::vertex::Vertex;

/// A [`Canvas`] that collects coloured triangles in world units
///
/// Upload with [`super::pipeline::RenderState::render`] once the frame is drawn.
#[derive(Debug, Default)]
pub struct VertexCanvas {
    vertices: Vec<Vertex>,
}

impl VertexCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    fn push_quad(&mut self, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: Rgba) {
        // a-b-c-d winds around the quad
        for p in [a, b, c, c, d, a] {
            self.vertices.push(Vertex::new(p.x, p.y, color));
        }
    }

    fn push_segment(&mut self, p1: Vec2, p2: Vec2, width: f32, color: Rgba) {
        let dir = (p2 - p1).normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        // Extend by half the width so joints overlap instead of notching
        let half = width / 2.0;
        let along = dir * half;
        let across = dir.perp() * half;
        let (s, e) = (p1 - along, p2 + along);
        self.push_quad(s + across, e + across, e - across, s - across, color);
    }
}

impl Canvas for VertexCanvas {
    fn clear(&mut self) {
        self.vertices.clear();
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, color: Rgba) {
        for pair in points.windows(2) {
            self.push_segment(pair[0], pair[1], width, color);
        }
        if closed && points.len() > 2 {
            if let (Some(&last), Some(&first)) = (points.last(), points.first()) {
                self.push_segment(last, first, width, color);
            }
        }
    }

    fn fill_square(&mut self, corner: Vec2, size: f32, color: Rgba) {
        let (x0, y0) = (corner.x, corner.y);
        let (x1, y1) = (x0 + size, y0 + size);
        self.push_quad(
            Vec2::new(x0, y0),
            Vec2::new(x1, y0),
            Vec2::new(x1, y1),
            Vec2::new(x0, y1),
            color,
        );
    }
}
