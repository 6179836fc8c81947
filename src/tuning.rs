//! Data-driven game tuning
//!
//! Every gameplay constant lives here so a level can be re-balanced from a
//! JSON file without recompiling. Missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};

/// A pyramid of crates, positioned relative to the level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PyramidSpec {
    /// Left edge as a fraction of the scene width
    pub x_frac: f32,
    /// Top edge as a fraction of the viewport height
    pub y_frac: f32,
    pub columns: u32,
    pub rows: u32,
    pub column_gap: f32,
    pub row_gap: f32,
}

/// A static plank the second pyramid rests on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgeSpec {
    /// Centre x as a fraction of the scene width
    pub x_frac: f32,
    /// Centre y as a fraction of the viewport height
    pub y_frac: f32,
    pub width: f32,
    pub height: f32,
}

/// Game tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    /// Downward gravity (px/s²)
    pub gravity: f32,
    /// Level width as a multiple of the viewport width
    pub scene_width_factor: f32,
    pub ground_height: f32,
    pub wall_thickness: f32,
    /// Backdrop tile size in source pixels, and its scale
    pub backdrop_tile: (f32, f32),
    pub backdrop_scale: f32,
    pub ledges: Vec<LedgeSpec>,
    pub pyramids: Vec<PyramidSpec>,
    /// Crate size (width, height)
    pub block_size: (f32, f32),
    pub block_density: f32,

    // === Projectile ===
    /// Spawn point as fractions of the viewport (x, y)
    pub spawn_frac: (f32, f32),
    pub projectile_radius: f32,
    pub projectile_density: f32,

    // === Sling ===
    /// Elastic band spring rate per unit mass (1/s²)
    pub elastic_stiffness: f32,
    /// Elastic band damping per unit mass (1/s)
    pub elastic_damping: f32,
    /// Pointer drag spring rate per unit mass (1/s²)
    pub drag_stiffness: f32,
    pub drag_damping: f32,
    /// Impulse applied per pixel of band stretch
    pub launch_impulse_scale: f32,

    // === Landing ===
    /// Below this speed (px/s) a grounded turkey counts as landed
    pub landing_speed: f32,
    /// A slow turkey that never reaches the ground lands after this long
    pub rest_timeout_ms: u32,
    pub respawn_delay_ms: u32,

    // === Camera ===
    /// Fraction of the gap to the turkey closed each tick
    pub follow_smoothing: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    /// Target scale change per wheel notch
    pub zoom_step: f32,
    /// Fraction of the remaining zoom gap closed each tick
    pub zoom_ease: f32,
    pub zoom_epsilon: f32,
    /// Radius around the canvas centre that never pans (px)
    pub pan_dead_zone: f32,
    pub pan_gain: f32,
    /// Maximum pan speed (px per tick)
    pub pan_max_speed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 1000.0,
            scene_width_factor: 5.0,
            ground_height: 50.0,
            wall_thickness: 50.0,
            backdrop_tile: (896.0, 512.0),
            backdrop_scale: 2.0,
            ledges: vec![LedgeSpec {
                x_frac: 0.72,
                y_frac: 0.4,
                width: 350.0,
                height: 10.0,
            }],
            pyramids: vec![
                PyramidSpec {
                    x_frac: 0.5,
                    y_frac: 0.5,
                    columns: 9,
                    rows: 10,
                    column_gap: 0.0,
                    row_gap: 0.0,
                },
                PyramidSpec {
                    x_frac: 0.7,
                    y_frac: 0.1,
                    columns: 8,
                    rows: 10,
                    column_gap: 0.0,
                    row_gap: 0.0,
                },
            ],
            block_size: (25.0, 40.0),
            block_density: 0.001,

            spawn_frac: (0.4, 0.4),
            projectile_radius: 21.0,
            projectile_density: 0.004,

            elastic_stiffness: 160.0,
            elastic_damping: 6.0,
            drag_stiffness: 640.0,
            drag_damping: 40.0,
            launch_impulse_scale: 80.0,

            landing_speed: 60.0,
            rest_timeout_ms: 2000,
            respawn_delay_ms: 3000,

            follow_smoothing: 0.2,
            zoom_min: 0.6,
            zoom_max: 1.4,
            zoom_step: 0.1,
            zoom_ease: 0.2,
            zoom_epsilon: 0.01,
            pan_dead_zone: 50.0,
            pan_gain: 0.0002,
            pan_max_speed: 10.0,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides; absent fields keep their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Respawn delay converted to simulation ticks
    pub fn respawn_delay_ticks(&self) -> u32 {
        crate::ms_to_ticks(self.respawn_delay_ms)
    }

    pub fn rest_timeout_ticks(&self) -> u32 {
        crate::ms_to_ticks(self.rest_timeout_ms)
    }
}
