//! Rigid-body physics collaborator
//!
//! The game never integrates motion or resolves contacts itself. It talks to
//! a world through the [`Physics`] trait: create and remove bodies, read
//! their state, push them around with impulses, and hand over the elastic
//! band and pointer drag as springs the engine solves every step.
//!
//! Coordinates are pixels with y growing downward.

pub mod rapier;

#[cfg(test)]
pub(crate) mod fake;

use glam::Vec2;

pub use rapier::RapierWorld;

/// Opaque body handle. Never reused, so a stale id simply resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

/// Collision shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

impl Shape {
    /// Does a point given relative to the shape centre (unrotated) lie inside?
    pub fn contains_local(&self, p: Vec2) -> bool {
        match *self {
            Shape::Circle { radius } => p.length_squared() <= radius * radius,
            Shape::Rect { width, height } => p.x.abs() <= width / 2.0 && p.y.abs() <= height / 2.0,
        }
    }

    /// Half extents of the unrotated bounding box
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Shape::Circle { radius } => Vec2::splat(radius),
            Shape::Rect { width, height } => Vec2::new(width / 2.0, height / 2.0),
        }
    }
}

/// Crate palette: every block wears one of these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockSprite {
    Corn,
    Pepper,
    Pumpkin,
}

impl BlockSprite {
    pub const ALL: [BlockSprite; 3] = [BlockSprite::Corn, BlockSprite::Pepper, BlockSprite::Pumpkin];
}

/// Render metadata attached to a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skin {
    Backdrop,
    Ground,
    Wall,
    Ledge,
    Block(BlockSprite),
    Turkey,
}

/// Category/mask collision bits. Two bodies collide when each one's
/// category is in the other's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub category: u32,
    pub mask: u32,
}

impl CollisionFilter {
    pub const DEFAULT: Self = Self {
        category: 0x0001,
        mask: 0xFFFF_FFFF,
    };
    /// Scenery that nothing touches
    pub const NONE: Self = Self {
        category: 0x0002,
        mask: 0x0000,
    };
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything needed to create a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub pos: Vec2,
    pub shape: Shape,
    pub is_static: bool,
    pub density: f32,
    pub filter: CollisionFilter,
    pub skin: Skin,
}

impl BodyDesc {
    pub fn fixed(pos: Vec2, shape: Shape, skin: Skin) -> Self {
        Self {
            pos,
            shape,
            is_static: true,
            density: 1.0,
            filter: CollisionFilter::DEFAULT,
            skin,
        }
    }

    pub fn dynamic(pos: Vec2, shape: Shape, density: f32, skin: Skin) -> Self {
        Self {
            pos,
            shape,
            is_static: false,
            density,
            filter: CollisionFilter::DEFAULT,
            skin,
        }
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Point-in-time state of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub mass: f32,
    /// Lowest extent of the bounding box (largest y)
    pub bottom: f32,
}

impl BodySnapshot {
    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// What the renderer needs to draw a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyView {
    pub id: BodyId,
    pub pos: Vec2,
    pub angle: f32,
    pub shape: Shape,
    pub skin: Skin,
}

/// A spring pulling a body toward a fixed world point.
/// `stiffness` and `damping` are per unit mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticLink {
    pub anchor: Vec2,
    pub body: BodyId,
    pub stiffness: f32,
    pub damping: f32,
}

impl ElasticLink {
    /// Impulse the spring delivers to a body over `dt`
    pub fn impulse(&self, body: &BodySnapshot, dt: f32) -> Vec2 {
        spring_impulse(self.anchor, body, self.stiffness, self.damping, dt)
    }
}

/// Damped spring impulse toward `target`, scaled by the body's mass
pub fn spring_impulse(target: Vec2, body: &BodySnapshot, stiffness: f32, damping: f32, dt: f32) -> Vec2 {
    let accel = (target - body.pos) * stiffness - body.vel * damping;
    accel * body.mass * dt
}

/// The physics engine as seen by the game
pub trait Physics {
    fn add_body(&mut self, desc: &BodyDesc) -> BodyId;

    /// Remove a body; false if it was already gone
    fn remove_body(&mut self, id: BodyId) -> bool;

    fn body(&self, id: BodyId) -> Option<BodySnapshot>;

    fn apply_impulse(&mut self, id: BodyId, impulse: Vec2);

    /// Install or clear the elastic band
    fn set_elastic(&mut self, link: Option<ElasticLink>);

    /// Grab the dynamic body under `point`, if any
    fn begin_drag(&mut self, point: Vec2) -> Option<BodyId>;

    /// Move the drag target
    fn drag_to(&mut self, point: Vec2);

    /// Let go; returns the body that was being dragged
    fn end_drag(&mut self) -> Option<BodyId>;

    fn dragged(&self) -> Option<BodyId>;

    fn step(&mut self, dt: f32);

    fn bodies(&self) -> Vec<BodyView>;

    fn body_count(&self) -> usize;

    /// Drop every body, spring and drag
    fn clear(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_contains() {
        let circle = Shape::Circle { radius: 10.0 };
        assert!(circle.contains_local(Vec2::new(6.0, 8.0)));
        assert!(!circle.contains_local(Vec2::new(8.0, 8.0)));

        let rect = Shape::Rect { width: 25.0, height: 40.0 };
        assert!(rect.contains_local(Vec2::new(12.0, -19.0)));
        assert!(!rect.contains_local(Vec2::new(13.0, 0.0)));
    }

    #[test]
    fn test_spring_pulls_toward_anchor() {
        let body = BodySnapshot {
            pos: Vec2::new(10.0, 0.0),
            vel: Vec2::ZERO,
            angle: 0.0,
            mass: 2.0,
            bottom: 5.0,
        };
        let link = ElasticLink {
            anchor: Vec2::ZERO,
            body: BodyId(1),
            stiffness: 100.0,
            damping: 0.0,
        };
        let j = link.impulse(&body, 0.1);
        assert!((j.x - (-200.0)).abs() < 1e-3);
        assert_eq!(j.y, 0.0);
    }
}
