//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Palette standing in for the sprite art
pub mod colors {
    pub const SKY: [f32; 4] = [0.55, 0.8, 0.95, 1.0];
    pub const HILLS: [f32; 4] = [0.56, 0.74, 0.42, 1.0];
    pub const HILLS_ALT: [f32; 4] = [0.5, 0.69, 0.38, 1.0];
    pub const GROUND: [f32; 4] = [0.45, 0.3, 0.16, 1.0];
    pub const WALL: [f32; 4] = [0.42, 0.42, 0.46, 1.0];
    pub const LEDGE: [f32; 4] = [0.62, 0.45, 0.25, 1.0];
    pub const CORN: [f32; 4] = [0.98, 0.82, 0.2, 1.0];
    pub const PEPPER: [f32; 4] = [0.85, 0.16, 0.12, 1.0];
    pub const PUMPKIN: [f32; 4] = [0.95, 0.5, 0.1, 1.0];
    pub const TURKEY: [f32; 4] = [0.5, 0.3, 0.18, 1.0];
    pub const TURKEY_HEAD: [f32; 4] = [0.85, 0.2, 0.2, 1.0];
    pub const BAND: [f32; 4] = [0.3, 0.16, 0.06, 1.0];
}
