//! Level layout
//!
//! Builds the static scene from the viewport size: ground, back wall, a strip
//! of backdrop tiles, a ledge and the crate pyramids. Layout is pure data; it
//! only touches the physics world in [`LevelLayout::populate`].

use glam::Vec2;
use rand::Rng;

use super::camera::Bounds;
use super::state::Viewport;
use crate::physics::{BlockSprite, BodyDesc, BodyId, CollisionFilter, Physics, Shape, Skin};
use crate::tuning::{PyramidSpec, Tuning};

/// An axis-aligned static rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slab {
    pub center: Vec2,
    pub size: Vec2,
}

impl Slab {
    fn shape(&self) -> Shape {
        Shape::Rect {
            width: self.size.x,
            height: self.size.y,
        }
    }
}

/// One crate in a pyramid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub pos: Vec2,
    pub size: Vec2,
    pub sprite: BlockSprite,
}

/// A triangular stack of crates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pyramid {
    pub blocks: Vec<Block>,
    /// Block count per level, top first
    pub levels: Vec<u32>,
}

/// Build a pyramid whose top-left grid cell starts at `origin`.
///
/// `columns` wide at the base, each level above one block narrower on each
/// side, at most `rows` levels. Blocks sit on a regular grid with the given
/// gaps; each one picks a sprite uniformly from the palette.
pub fn pyramid<R: Rng>(
    origin: Vec2,
    columns: u32,
    rows: u32,
    column_gap: f32,
    row_gap: f32,
    block_size: Vec2,
    rng: &mut R,
) -> Pyramid {
    let levels = rows.min(columns.div_ceil(2));
    let pitch = Vec2::new(block_size.x + column_gap, block_size.y + row_gap);
    let mut out = Pyramid::default();

    let mut row = 0;
    for level in (0..levels).rev() {
        // level 0 is the base
        let start = level;
        let end = columns.saturating_sub(level);
        if start >= end {
            continue;
        }
        for column in start..end {
            let sprite = BlockSprite::ALL[rng.random_range(0..BlockSprite::ALL.len())];
            out.blocks.push(Block {
                pos: origin + Vec2::new(column as f32 * pitch.x, row as f32 * pitch.y) + block_size / 2.0,
                size: block_size,
                sprite,
            });
        }
        out.levels.push(end - start);
        row += 1;
    }
    out
}

/// The whole level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayout {
    pub viewport: Viewport,
    pub scene_width: f32,
    /// y of the ground surface
    pub ground_level: f32,
    pub ground: Slab,
    pub walls: Vec<Slab>,
    pub backdrop: Vec<Slab>,
    pub ledges: Vec<Slab>,
    pub pyramids: Vec<Pyramid>,
    pub spawn: Vec2,
    /// Where the camera may look
    pub extents: Bounds,
}

/// Lay out the level for a viewport
pub fn build_level<R: Rng>(viewport: Viewport, tuning: &Tuning, rng: &mut R) -> LevelLayout {
    let (w, h) = (viewport.width, viewport.height);
    let scene_width = w * tuning.scene_width_factor;
    let ground_level = h - tuning.ground_height;

    let ground = Slab {
        center: Vec2::new(scene_width / 2.0, h - tuning.ground_height / 2.0),
        size: Vec2::new(scene_width * 2.0, tuning.ground_height),
    };
    let walls = vec![Slab {
        center: Vec2::new(scene_width, 0.0),
        size: Vec2::new(tuning.wall_thickness, h * 2.0),
    }];

    let tile = Vec2::new(tuning.backdrop_tile.0, tuning.backdrop_tile.1) * tuning.backdrop_scale;
    let tiles = (scene_width / tile.x).ceil() as i32 + 1;
    // One extra tile to the left so a pan to x=0 never shows sky at the seam
    let backdrop = (-1..tiles)
        .map(|i| Slab {
            center: Vec2::new(i as f32 * tile.x + tile.x / 2.0, h - tile.y / 2.0),
            size: tile,
        })
        .collect();

    let ledges = tuning
        .ledges
        .iter()
        .map(|l| Slab {
            center: Vec2::new(scene_width * l.x_frac, h * l.y_frac),
            size: Vec2::new(l.width, l.height),
        })
        .collect();

    let block_size = Vec2::new(tuning.block_size.0, tuning.block_size.1);
    let pyramids = tuning
        .pyramids
        .iter()
        .map(|p: &PyramidSpec| {
            pyramid(
                Vec2::new(scene_width * p.x_frac, h * p.y_frac),
                p.columns,
                p.rows,
                p.column_gap,
                p.row_gap,
                block_size,
                rng,
            )
        })
        .collect();

    LevelLayout {
        viewport,
        scene_width,
        ground_level,
        ground,
        walls,
        backdrop,
        ledges,
        pyramids,
        spawn: Vec2::new(w * tuning.spawn_frac.0, h * tuning.spawn_frac.1),
        extents: Bounds::new(Vec2::ZERO, Vec2::new(scene_width, h)),
    }
}

impl LevelLayout {
    pub fn block_count(&self) -> usize {
        self.pyramids.iter().map(|p| p.blocks.len()).sum()
    }

    /// Add every static and crate body to the world
    pub fn populate<P: Physics>(&self, physics: &mut P, tuning: &Tuning) -> Vec<BodyId> {
        let mut ids = Vec::with_capacity(self.backdrop.len() + self.block_count() + 4);

        for tile in &self.backdrop {
            let desc = BodyDesc::fixed(tile.center, tile.shape(), Skin::Backdrop).with_filter(CollisionFilter::NONE);
            ids.push(physics.add_body(&desc));
        }
        ids.push(physics.add_body(&BodyDesc::fixed(self.ground.center, self.ground.shape(), Skin::Ground)));
        for wall in &self.walls {
            ids.push(physics.add_body(&BodyDesc::fixed(wall.center, wall.shape(), Skin::Wall)));
        }
        for ledge in &self.ledges {
            ids.push(physics.add_body(&BodyDesc::fixed(ledge.center, ledge.shape(), Skin::Ledge)));
        }
        for block in self.pyramids.iter().flat_map(|p| &p.blocks) {
            let shape = Shape::Rect {
                width: block.size.x,
                height: block.size.y,
            };
            ids.push(physics.add_body(&BodyDesc::dynamic(
                block.pos,
                shape,
                tuning.block_density,
                Skin::Block(block.sprite),
            )));
        }

        log::info!(
            "Level built: scene {}x{}, {} backdrop tiles, {} crates in {} pyramids",
            self.scene_width,
            self.viewport.height,
            self.backdrop.len(),
            self.block_count(),
            self.pyramids.len()
        );
        ids
    }

    /// Projectile body description at the spawn point
    pub fn projectile(&self, tuning: &Tuning) -> BodyDesc {
        BodyDesc::dynamic(
            self.spawn,
            Shape::Circle {
                radius: tuning.projectile_radius,
            },
            tuning.projectile_density,
            Skin::Turkey,
        )
    }
}
