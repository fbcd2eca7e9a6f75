//! Phosphor vertex format
//!
//! Strokes, dots and hulls all end up as loose coloured triangles. Positions
//! stay in world units while a frame is built and only become clip space in
//! [`super::RenderState::render`].

use bytemuck::{Pod, Zeroable};

/// One corner of a lit triangle
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    /// Straight (not premultiplied) alpha; trail fade lives here
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Same colour, moved
    pub const fn at(self, x: f32, y: f32) -> Self {
        Self::new(x, y, self.color)
    }

    /// Buffer layout matching `shader.wgsl`
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
