//! Scriptable in-memory world for state machine tests
//!
//! No gravity and no contacts: bodies coast at their velocity and tests move
//! them around by hand. Dragging snaps the body onto the pointer.

use std::collections::BTreeMap;

use glam::Vec2;

use super::{BodyDesc, BodyId, BodySnapshot, BodyView, ElasticLink, Physics, Shape};

#[derive(Debug, Clone)]
pub struct FakeBody {
    pub desc: BodyDesc,
    pub pos: Vec2,
    pub vel: Vec2,
}

impl FakeBody {
    fn mass(&self) -> f32 {
        let area = match self.desc.shape {
            Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
            Shape::Rect { width, height } => width * height,
        };
        area * self.desc.density
    }
}

#[derive(Debug, Default)]
pub struct FakePhysics {
    pub bodies: BTreeMap<BodyId, FakeBody>,
    pub elastic: Option<ElasticLink>,
    pub impulses: Vec<(BodyId, Vec2)>,
    pub steps: u32,
    drag: Option<BodyId>,
    next_id: u32,
}

impl FakePhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Teleport a body and set its velocity
    pub fn place(&mut self, id: BodyId, pos: Vec2, vel: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.pos = pos;
            body.vel = vel;
        }
    }
}

impl Physics for FakePhysics {
    fn add_body(&mut self, desc: &BodyDesc) -> BodyId {
        self.next_id += 1;
        let id = BodyId(self.next_id);
        self.bodies.insert(
            id,
            FakeBody {
                desc: *desc,
                pos: desc.pos,
                vel: Vec2::ZERO,
            },
        );
        id
    }

    fn remove_body(&mut self, id: BodyId) -> bool {
        if self.drag == Some(id) {
            self.drag = None;
        }
        self.bodies.remove(&id).is_some()
    }

    fn body(&self, id: BodyId) -> Option<BodySnapshot> {
        self.bodies.get(&id).map(|b| BodySnapshot {
            pos: b.pos,
            vel: b.vel,
            angle: 0.0,
            mass: b.mass(),
            bottom: b.pos.y + b.desc.shape.half_extents().y,
        })
    }

    fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            let mass = body.mass();
            body.vel += impulse / mass;
            self.impulses.push((id, impulse));
        }
    }

    fn set_elastic(&mut self, link: Option<ElasticLink>) {
        self.elastic = link;
    }

    fn begin_drag(&mut self, point: Vec2) -> Option<BodyId> {
        self.drag = self
            .bodies
            .iter()
            .find(|(_, b)| !b.desc.is_static && b.desc.shape.contains_local(point - b.pos))
            .map(|(id, _)| *id);
        self.drag
    }

    fn drag_to(&mut self, point: Vec2) {
        if let Some(body) = self.drag.and_then(|id| self.bodies.get_mut(&id)) {
            body.pos = point;
        }
    }

    fn end_drag(&mut self) -> Option<BodyId> {
        self.drag.take()
    }

    fn dragged(&self) -> Option<BodyId> {
        self.drag
    }

    fn step(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            if !body.desc.is_static {
                body.pos += body.vel * dt;
            }
        }
        self.steps += 1;
    }

    fn bodies(&self) -> Vec<BodyView> {
        self.bodies
            .iter()
            .map(|(id, b)| BodyView {
                id: *id,
                pos: b.pos,
                angle: 0.0,
                shape: b.desc.shape,
                skin: b.desc.skin,
            })
            .collect()
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn clear(&mut self) {
        self.bodies.clear();
        self.elastic = None;
        self.drag = None;
    }
}
