//! Movement domain: axis-separated tile collision and raycasts.

use bevy::prelude::*;

use super::components::PhysicsBody;

/// Distance between raycast probes, in pixels.
pub const RAYCAST_STEP_SIZE: f32 = 4.0;

const DEFAULT_MAX_STEP: i32 = 16;

/// Rectangle with its top-left corner at `(x, y)`.
pub fn rect_at(x: i32, y: i32, width: i32, height: i32) -> IRect {
    IRect {
        min: IVec2::new(x, y),
        max: IVec2::new(x + width, y + height),
    }
}

/// Strict overlap: rectangles that only share an edge do not overlap.
pub fn overlaps(a: IRect, b: IRect) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

pub fn translate(rect: IRect, offset: IVec2) -> IRect {
    IRect {
        min: rect.min + offset,
        max: rect.max + offset,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub point: Vec2,
    pub tile: IRect,
    pub distance: f32,
}

/// Result of moving a hitbox through the tile set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sweep {
    pub hitbox: IRect,
    pub blocked_x: bool,
    pub blocked_y: bool,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// Static level geometry and the resolver that moves hitboxes through it.
///
/// Tiles are replaced wholesale per level through [`CollisionResolver::set_tiles`]
/// and are read-only while the simulation runs.
#[derive(Resource, Debug, Clone)]
pub struct CollisionResolver {
    tiles: Vec<IRect>,
    max_step: i32,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self {
            tiles: Vec::new(),
            max_step: DEFAULT_MAX_STEP,
        }
    }
}

impl CollisionResolver {
    pub fn new(tiles: Vec<IRect>) -> Self {
        let mut resolver = Self::default();
        resolver.set_tiles(tiles);
        resolver
    }

    pub fn set_tiles(&mut self, tiles: Vec<IRect>) {
        let smallest = tiles
            .iter()
            .map(|tile| (tile.max.x - tile.min.x).min(tile.max.y - tile.min.y))
            .min();
        self.max_step = match smallest {
            Some(size) => (size / 2).max(1),
            None => DEFAULT_MAX_STEP,
        };
        debug!("Collision tiles set: {} tiles, max step {}", tiles.len(), self.max_step);
        self.tiles = tiles;
    }

    pub fn tiles(&self) -> &[IRect] {
        &self.tiles
    }

    pub fn overlaps_any(&self, rect: IRect) -> bool {
        self.tiles.iter().any(|tile| overlaps(rect, *tile))
    }

    /// Move `hitbox` by `round(velocity)`, horizontal axis first, snapping to
    /// any tile it runs into. Blocked axes have their velocity zeroed and the
    /// matching contact flag set on `physics`.
    pub fn resolve(&self, hitbox: IRect, physics: &mut PhysicsBody) -> IRect {
        let displacement = physics.velocity;
        self.sweep(hitbox, displacement, physics).hitbox
    }

    /// Same as [`CollisionResolver::resolve`] with an explicit displacement,
    /// used by the frame pipeline to apply `velocity * dt * 60`.
    pub fn sweep(&self, hitbox: IRect, displacement: Vec2, physics: &mut PhysicsBody) -> Sweep {
        let mut hitbox = hitbox;

        let blocked_x = self.move_axis(&mut hitbox, displacement.x.round() as i32, Axis::X, physics);
        if blocked_x {
            physics.velocity.x = 0.0;
        }

        let blocked_y = self.move_axis(&mut hitbox, displacement.y.round() as i32, Axis::Y, physics);
        if blocked_y {
            physics.velocity.y = 0.0;
        }

        // Resting contact: gravity is skipped while grounded, so a body
        // standing still would otherwise never touch the floor again.
        if !physics.on_ground
            && physics.velocity.y >= 0.0
            && self.overlaps_any(translate(hitbox, IVec2::Y))
        {
            physics.on_ground = true;
        }

        Sweep {
            hitbox,
            blocked_x,
            blocked_y,
        }
    }

    fn move_axis(
        &self,
        hitbox: &mut IRect,
        amount: i32,
        axis: Axis,
        physics: &mut PhysicsBody,
    ) -> bool {
        let mut remaining = amount;
        while remaining != 0 {
            let step = remaining.clamp(-self.max_step, self.max_step);
            remaining -= step;
            let offset = match axis {
                Axis::X => IVec2::new(step, 0),
                Axis::Y => IVec2::new(0, step),
            };
            *hitbox = translate(*hitbox, offset);

            let mut blocked = false;
            for tile in &self.tiles {
                if !overlaps(*hitbox, *tile) {
                    continue;
                }
                blocked = true;
                match (axis, step > 0) {
                    (Axis::X, true) => {
                        *hitbox = translate(*hitbox, IVec2::new(tile.min.x - hitbox.max.x, 0));
                        physics.on_wall_right = true;
                    }
                    (Axis::X, false) => {
                        *hitbox = translate(*hitbox, IVec2::new(tile.max.x - hitbox.min.x, 0));
                        physics.on_wall_left = true;
                    }
                    (Axis::Y, true) => {
                        *hitbox = translate(*hitbox, IVec2::new(0, tile.min.y - hitbox.max.y));
                        physics.on_ground = true;
                    }
                    (Axis::Y, false) => {
                        *hitbox = translate(*hitbox, IVec2::new(0, tile.max.y - hitbox.min.y));
                        physics.on_ceiling = true;
                    }
                }
            }
            if blocked {
                return true;
            }
        }
        false
    }

    /// March from `start` along `direction` in [`RAYCAST_STEP_SIZE`] steps,
    /// testing a 1x1 probe against the tiles. A zero direction never hits.
    pub fn raycast(&self, start: Vec2, direction: Vec2, max_distance: f32) -> Option<RaycastHit> {
        let direction = direction.try_normalize()?;
        let mut distance = 0.0;
        while distance < max_distance {
            let point = start + direction * distance;
            let probe = rect_at(point.x.floor() as i32, point.y.floor() as i32, 1, 1);
            if let Some(tile) = self.tiles.iter().find(|tile| overlaps(probe, **tile)) {
                return Some(RaycastHit {
                    point,
                    tile: *tile,
                    distance,
                });
            }
            distance += RAYCAST_STEP_SIZE;
        }
        None
    }
}
