//! Core game state types

use glam::Vec2;

use crate::physics::{BodyId, ElasticLink};

/// Canvas size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() / 2.0
    }
}

/// Where the turkey is in its launch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightPhase {
    /// On the band, waiting to be pulled. Pointer camera control is live.
    Attached,
    /// Launched and not yet landed
    InFlight,
    /// Landed; a fresh turkey appears when the countdown runs out
    PendingReset { ticks_remaining: u32 },
}

/// Why a flight ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingReason {
    /// Slow and touching the ground
    Grounded,
    /// Slow for too long somewhere above the ground (a crate, the ledge)
    Stalled,
    /// Fell out of the world or vanished
    Lost,
}

/// Something the sling state machine did this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlingEvent {
    Launched { impulse: Vec2 },
    Landed { at: Vec2, reason: LandingReason },
    Respawned { projectile: BodyId },
}

/// The slingshot band: a spring from a fixed anchor to the current turkey
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticConstraint {
    pub anchor: Vec2,
    /// None while the turkey is flying
    pub body: Option<BodyId>,
    pub stiffness: f32,
    pub damping: f32,
    pub visible: bool,
}

impl ElasticConstraint {
    pub fn new(anchor: Vec2, body: BodyId, stiffness: f32, damping: f32) -> Self {
        Self {
            anchor,
            body: Some(body),
            stiffness,
            damping,
            visible: true,
        }
    }

    /// Spring the physics engine should solve, if attached
    pub fn link(&self) -> Option<ElasticLink> {
        self.body.map(|body| ElasticLink {
            anchor: self.anchor,
            body,
            stiffness: self.stiffness,
            damping: self.damping,
        })
    }

    pub fn detach(&mut self) {
        self.body = None;
        self.visible = false;
    }

    pub fn attach(&mut self, body: BodyId) {
        self.body = Some(body);
        self.visible = true;
    }
}
