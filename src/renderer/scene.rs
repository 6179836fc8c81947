//! Scene to vertices
//!
//! Turns the physics bodies and the band into world-space triangles, back to
//! front: backdrop, static geometry, crates, turkey, band.

use glam::Vec2;

use super::shapes::{circle, rect, segment};
use super::vertex::{Vertex, colors};
use crate::physics::{BlockSprite, BodyView, Physics, Shape, Skin};
use crate::sim::{Bounds, Game};

const BAND_WIDTH: f32 = 4.0;
const CIRCLE_SEGMENTS: u32 = 24;

/// Draw order, back to front
fn layer(skin: Skin) -> u8 {
    match skin {
        Skin::Backdrop => 0,
        Skin::Ground | Skin::Wall | Skin::Ledge => 1,
        Skin::Block(_) => 2,
        Skin::Turkey => 3,
    }
}

fn color(skin: Skin) -> [f32; 4] {
    match skin {
        Skin::Backdrop => colors::HILLS,
        Skin::Ground => colors::GROUND,
        Skin::Wall => colors::WALL,
        Skin::Ledge => colors::LEDGE,
        Skin::Block(BlockSprite::Corn) => colors::CORN,
        Skin::Block(BlockSprite::Pepper) => colors::PEPPER,
        Skin::Block(BlockSprite::Pumpkin) => colors::PUMPKIN,
        Skin::Turkey => colors::TURKEY,
    }
}

/// Could any part of the body show inside `view`?
fn visible(body: &BodyView, view: &Bounds) -> bool {
    // Bounding radius covers any rotation
    let reach = body.shape.half_extents().length();
    body.pos.x + reach >= view.min.x
        && body.pos.x - reach <= view.max.x
        && body.pos.y + reach >= view.min.y
        && body.pos.y - reach <= view.max.y
}

fn push_body(out: &mut Vec<Vertex>, body: &BodyView, index: usize) {
    let mut fill = color(body.skin);
    // Alternate backdrop tiles so scrolling reads
    if body.skin == Skin::Backdrop && index % 2 == 1 {
        fill = colors::HILLS_ALT;
    }

    match body.shape {
        Shape::Rect { width, height } => {
            out.extend(rect(body.pos, Vec2::new(width, height), body.angle, fill));
        }
        Shape::Circle { radius } => {
            out.extend(circle(body.pos, radius, fill, CIRCLE_SEGMENTS));
            if body.skin == Skin::Turkey {
                // Head marker shows the spin
                let head = body.pos + Vec2::from_angle(body.angle) * radius * 0.6;
                out.extend(circle(head, radius * 0.3, colors::TURKEY_HEAD, CIRCLE_SEGMENTS / 2));
            }
        }
    }
}

/// Triangles for everything in `view`. `band` is the visible elastic, anchor to turkey.
pub fn scene_vertices(bodies: &[BodyView], band: Option<(Vec2, Vec2)>, view: &Bounds) -> Vec<Vertex> {
    let mut sorted: Vec<(usize, &BodyView)> = bodies.iter().enumerate().collect();
    sorted.sort_by_key(|(_, b)| layer(b.skin));

    let mut out = Vec::with_capacity(bodies.len() * 6);
    for (index, body) in sorted {
        if visible(body, view) {
            push_body(&mut out, body, index);
        }
    }
    if let Some((anchor, turkey)) = band {
        out.extend(segment(anchor, turkey, BAND_WIDTH, colors::BAND));
    }
    out
}

/// The band from anchor to turkey, while it is shown
pub fn band<P: Physics>(game: &Game<P>) -> Option<(Vec2, Vec2)> {
    let elastic = game.sling.elastic();
    if !elastic.visible {
        return None;
    }
    let turkey = game.physics.body(elastic.body?)?;
    Some((elastic.anchor, turkey.pos))
}

/// World point to normalized device coordinates through the camera window
pub fn world_to_ndc(view: &Bounds, p: Vec2) -> [f32; 2] {
    let size = view.size();
    [
        (p.x - view.min.x) / size.x * 2.0 - 1.0,
        1.0 - (p.y - view.min.y) / size.y * 2.0,
    ]
}

/// Draw the whole game as seen by its camera
pub fn game_vertices<P: Physics>(game: &Game<P>) -> Vec<Vertex> {
    scene_vertices(&game.physics.bodies(), band(game), &game.camera.bounds)
}
