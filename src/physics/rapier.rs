//! rapier2d-backed world
//!
//! Units are pixels and seconds, y down. The elastic band and the pointer
//! drag are damped springs applied as impulses right before each step, the
//! same way a mouse constraint nudges a body toward the cursor.

use std::collections::BTreeMap;

use glam::Vec2;
use rapier2d::prelude::*;

use super::{BodyDesc, BodyId, BodySnapshot, BodyView, ElasticLink, Physics, Shape, Skin, spring_impulse};
use crate::tuning::Tuning;

/// Surface friction shared by every collider
const FRICTION: Real = 0.3;

#[derive(Debug, Clone, Copy)]
struct Entry {
    handle: RigidBodyHandle,
    shape: Shape,
    skin: Skin,
    mass: f32,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    body: BodyId,
    target: Vec2,
}

#[inline]
fn to_na(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

#[inline]
fn to_glam(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn shape_mass(shape: Shape, density: f32) -> f32 {
    let area = match shape {
        Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
        Shape::Rect { width, height } => width * height,
    };
    area * density
}

/// Physics world over rapier2d
pub struct RapierWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    /// Ordered by id so iteration (and therefore rendering) is stable
    entries: BTreeMap<BodyId, Entry>,
    elastic: Option<ElasticLink>,
    drag: Option<Drag>,
    drag_stiffness: f32,
    drag_damping: f32,
    next_id: u32,
}

impl RapierWorld {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            gravity: vector![0.0, tuning.gravity],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            entries: BTreeMap::new(),
            elastic: None,
            drag: None,
            drag_stiffness: tuning.drag_stiffness,
            drag_damping: tuning.drag_damping,
            next_id: 1,
        }
    }

    /// Current elastic band, if installed
    pub fn elastic(&self) -> Option<ElasticLink> {
        self.elastic
    }

    fn contains_point(&self, entry: &Entry, point: &Point<Real>) -> bool {
        let Some(body) = self.bodies.get(entry.handle) else {
            return false;
        };
        body.is_dynamic()
            && body
                .colliders()
                .iter()
                .filter_map(|h| self.colliders.get(*h))
                .any(|c| c.shape().contains_point(c.position(), point))
    }

    fn push(&mut self, id: BodyId, impulse: Vec2) {
        if let Some(body) = self.entries.get(&id).and_then(|e| self.bodies.get_mut(e.handle)) {
            body.apply_impulse(to_na(impulse), true);
        }
    }
}

impl Physics for RapierWorld {
    fn add_body(&mut self, desc: &BodyDesc) -> BodyId {
        let builder = if desc.is_static {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic().ccd_enabled(true)
        };
        let handle = self.bodies.insert(builder.translation(to_na(desc.pos)).build());

        let collider = match desc.shape {
            Shape::Circle { radius } => ColliderBuilder::ball(radius),
            Shape::Rect { width, height } => ColliderBuilder::cuboid(width / 2.0, height / 2.0),
        }
        .density(desc.density)
        .friction(FRICTION)
        .collision_groups(InteractionGroups::new(
            Group::from_bits_truncate(desc.filter.category),
            Group::from_bits_truncate(desc.filter.mask),
        ))
        .build();
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            Entry {
                handle,
                shape: desc.shape,
                skin: desc.skin,
                mass: shape_mass(desc.shape, desc.density),
            },
        );
        id
    }

    fn remove_body(&mut self, id: BodyId) -> bool {
        let Some(entry) = self.entries.remove(&id) else {
            return false;
        };
        self.bodies.remove(
            entry.handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        if self.drag.is_some_and(|d| d.body == id) {
            self.drag = None;
        }
        true
    }

    fn body(&self, id: BodyId) -> Option<BodySnapshot> {
        let entry = self.entries.get(&id)?;
        let body = self.bodies.get(entry.handle)?;
        let pos = to_glam(body.translation());
        let bottom = body
            .colliders()
            .iter()
            .filter_map(|h| self.colliders.get(*h))
            .map(|c| c.compute_aabb().maxs.y)
            .reduce(f32::max)
            .unwrap_or(pos.y + entry.shape.half_extents().y);
        Some(BodySnapshot {
            pos,
            vel: to_glam(body.linvel()),
            angle: body.rotation().angle(),
            mass: entry.mass,
            bottom,
        })
    }

    fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) {
        self.push(id, impulse);
    }

    fn set_elastic(&mut self, link: Option<ElasticLink>) {
        self.elastic = link;
    }

    fn begin_drag(&mut self, point: Vec2) -> Option<BodyId> {
        let p = point![point.x, point.y];
        // Latest bodies are drawn on top, so they win the pick
        let hit = self
            .entries
            .iter()
            .rev()
            .find(|(_, e)| self.contains_point(e, &p))
            .map(|(id, _)| *id);
        self.drag = hit.map(|body| Drag { body, target: point });
        hit
    }

    fn drag_to(&mut self, point: Vec2) {
        if let Some(drag) = self.drag.as_mut() {
            drag.target = point;
        }
    }

    fn end_drag(&mut self) -> Option<BodyId> {
        self.drag.take().map(|d| d.body)
    }

    fn dragged(&self) -> Option<BodyId> {
        self.drag.map(|d| d.body)
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        if let Some(link) = self.elastic {
            if let Some(snap) = self.body(link.body) {
                self.push(link.body, link.impulse(&snap, dt));
            }
        }
        if let Some(drag) = self.drag {
            if let Some(snap) = self.body(drag.body) {
                let impulse = spring_impulse(drag.target, &snap, self.drag_stiffness, self.drag_damping, dt);
                self.push(drag.body, impulse);
            }
        }

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
    }

    fn bodies(&self) -> Vec<BodyView> {
        self.entries
            .iter()
            .filter_map(|(id, e)| {
                let body = self.bodies.get(e.handle)?;
                Some(BodyView {
                    id: *id,
                    pos: to_glam(body.translation()),
                    angle: body.rotation().angle(),
                    shape: e.shape,
                    skin: e.skin,
                })
            })
            .collect()
    }

    fn body_count(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.islands = IslandManager::new();
        self.broad_phase = BroadPhase::new();
        self.narrow_phase = NarrowPhase::new();
        self.bodies = RigidBodySet::new();
        self.colliders = ColliderSet::new();
        self.impulse_joints = ImpulseJointSet::new();
        self.multibody_joints = MultibodyJointSet::new();
        self.ccd = CCDSolver::new();
        self.entries.clear();
        self.elastic = None;
        self.drag = None;
    }
}
