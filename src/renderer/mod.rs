//! WebGPU rendering module
//!
//! The scene is flat-coloured triangles built on the CPU in world space and
//! mapped to clip space through the camera bounds.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{game_vertices, scene_vertices, world_to_ndc};
pub use vertex::Vertex;
