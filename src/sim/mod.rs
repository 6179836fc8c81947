//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Physics behind the [`Physics`](crate::physics::Physics) trait
//! - No rendering or platform dependencies

pub mod camera;
pub mod level;
pub mod sling;
pub mod state;
pub mod tick;

pub use camera::{Bounds, Camera, PointerMapping};
pub use level::{Block, LevelLayout, Pyramid, Slab, build_level, pyramid};
pub use sling::{Sling, has_landed};
pub use state::{ElasticConstraint, FlightPhase, LandingReason, SlingEvent, Viewport};
pub use tick::{Game, TickInput, tick};
