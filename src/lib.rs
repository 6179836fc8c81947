//! Turkey Sling - a slingshot physics game
//!
//! Core modules:
//! - `sim`: Level layout, launch/landing state machine, camera
//! - `physics`: Rigid-body collaborator (trait + rapier2d backend)
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser glue (viewport, event listener handles)
//! - `tuning`: Data-driven game constants

pub mod physics;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Simulation rate (Hz)
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Pixels trimmed from the window height for the canvas (avoids a scrollbar)
    pub const CANVAS_HEIGHT_INSET: f32 = 4.0;
}

/// Linear interpolation between `start` and `end`
#[inline]
pub fn lerp(start: f32, end: f32, amount: f32) -> f32 {
    (1.0 - amount) * start + amount * end
}

/// Convert a duration in milliseconds to whole simulation ticks (rounded)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u32 {
    ((ms as u64 * consts::SIM_HZ as u64 + 500) / 1000) as u32
}
