//! Fixed timestep simulation tick
//!
//! One tick: pointer drag, physics step, sling state machine, camera.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::camera::Camera;
use super::level::{LevelLayout, build_level};
use super::sling::Sling;
use super::state::{FlightPhase, SlingEvent, Viewport};
use crate::physics::Physics;
use crate::tuning::Tuning;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest pointer position in canvas pixels, once it has entered the canvas
    pub pointer: Option<Vec2>,
    /// Pointer went down this tick
    pub press: bool,
    /// Pointer went up (or left the canvas) this tick
    pub release: bool,
    /// Wheel notches since the last tick (positive = zoom out)
    pub wheel_notches: i32,
}

impl TickInput {
    /// Drop the one-shot parts once a substep has seen them
    pub fn consume(&mut self) {
        self.press = false;
        self.release = false;
        self.wheel_notches = 0;
    }
}

/// Everything the simulation owns
pub struct Game<P: Physics> {
    pub physics: P,
    pub level: LevelLayout,
    pub sling: Sling,
    pub camera: Camera,
    pub tuning: Tuning,
    /// Ticks simulated so far
    pub time_ticks: u64,
}

impl<P: Physics> Game<P> {
    /// Build the level into `physics` and put the first turkey on the band
    pub fn new(mut physics: P, viewport: Viewport, tuning: Tuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let level = build_level(viewport, &tuning, &mut rng);
        level.populate(&mut physics, &tuning);
        let sling = Sling::new(&mut physics, &level, &tuning);
        let camera = Camera::new(viewport, level.extents);

        Self {
            physics,
            level,
            sling,
            camera,
            tuning,
            time_ticks: 0,
        }
    }

    /// The canvas changed size. The level keeps its geometry.
    pub fn resize(&mut self, viewport: Viewport) {
        self.camera.resize(viewport);
    }

    /// Empty the world. Nothing is scheduled outside `tick`, so this is all
    /// teardown needs from the simulation.
    pub fn teardown(&mut self) {
        self.physics.clear();
        log::info!("World cleared after {} ticks", self.time_ticks);
    }
}

/// Advance the game by one fixed timestep, returning what the sling did
pub fn tick<P: Physics>(game: &mut Game<P>, input: &TickInput, dt: f32) -> Vec<SlingEvent> {
    let mut events = Vec::new();

    // Pointer drag, mapped through the current camera
    let world_pointer = input.pointer.map(|p| game.camera.screen_to_world(p));
    if let Some(point) = world_pointer {
        if input.press {
            game.physics.begin_drag(point);
        }
        if game.physics.dragged().is_some() {
            game.physics.drag_to(point);
        }
    }
    if input.release {
        if let Some(body) = game.physics.end_drag() {
            events.extend(game.sling.release(body, &mut game.physics, &game.tuning));
        }
    }

    game.physics.step(dt);

    let update = game.sling.update(&mut game.physics, &game.level, &game.tuning);
    events.extend(update);

    if matches!(update, Some(SlingEvent::Respawned { .. })) {
        game.camera.reset_view();
    }
    match game.sling.phase() {
        FlightPhase::InFlight => {
            if let Some(turkey) = game.physics.body(game.sling.projectile()) {
                game.camera.follow(turkey.pos.x, game.tuning.follow_smoothing);
            }
        }
        FlightPhase::Attached => {
            game.camera.idle(input.pointer, input.wheel_notches, &game.tuning);
        }
        FlightPhase::PendingReset { .. } => {}
    }

    game.time_ticks += 1;
    events
}
