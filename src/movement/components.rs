//! Movement domain: kinematic body components.

use bevy::prelude::*;

use super::collision::rect_at;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    /// Facing for a horizontal direction, `None` when the direction is zero.
    pub fn from_direction(x: f32) -> Option<Self> {
        if x > 0.0 {
            Some(Facing::Right)
        } else if x < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }

    pub fn is_right(self) -> bool {
        self == Facing::Right
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Right => Facing::Left,
            Facing::Left => Facing::Right,
        }
    }
}

/// Spatial state shared by every simulated entity.
///
/// `position` is the top-left corner of the visual rectangle. The hitbox is
/// an integer rectangle aligned to the bottom-center of the visual rectangle
/// and may be narrower than the sprite. The collision stage moves the hitbox
/// and the position is re-derived from it afterwards.
#[derive(Component, Debug, Clone)]
pub struct Body {
    pub position: Vec2,
    pub size: IVec2,
    pub hitbox: IRect,
    pub facing: Facing,
    /// Sub-pixel motion not yet applied to the integer hitbox.
    pub remainder: Vec2,
}

impl Body {
    pub fn new(position: Vec2, size: IVec2) -> Self {
        Self::with_hitbox(position, size, size)
    }

    pub fn with_hitbox(position: Vec2, size: IVec2, hitbox_size: IVec2) -> Self {
        let mut body = Self {
            position,
            size,
            hitbox: rect_at(0, 0, hitbox_size.x, hitbox_size.y),
            facing: Facing::Right,
            remainder: Vec2::ZERO,
        };
        body.set_position(position);
        body
    }

    pub fn hitbox_size(&self) -> IVec2 {
        self.hitbox.max - self.hitbox.min
    }

    /// Teleport the body, re-deriving the hitbox from the new position.
    pub fn set_position(&mut self, position: Vec2) {
        let hitbox_size = self.hitbox_size();
        let visual = self.visual_rect_at(position);
        let x = visual.min.x + (self.size.x - hitbox_size.x) / 2;
        let y = visual.max.y - hitbox_size.y;
        self.position = position;
        self.hitbox = rect_at(x, y, hitbox_size.x, hitbox_size.y);
        self.remainder = Vec2::ZERO;
    }

    /// Re-derive `position` after the hitbox was moved by collision.
    pub fn sync_from_hitbox(&mut self) {
        let hitbox_size = self.hitbox_size();
        let x = self.hitbox.min.x - (self.size.x - hitbox_size.x) / 2;
        let y = self.hitbox.max.y - self.size.y;
        self.position = Vec2::new(x as f32, y as f32);
    }

    pub fn visual_rect(&self) -> IRect {
        self.visual_rect_at(self.position)
    }

    fn visual_rect_at(&self, position: Vec2) -> IRect {
        rect_at(
            position.x.round() as i32,
            position.y.round() as i32,
            self.size.x,
            self.size.y,
        )
    }

    /// Center of the hitbox in world space.
    pub fn center(&self) -> Vec2 {
        (self.hitbox.min + self.hitbox.max).as_vec2() * 0.5
    }

    /// Turn toward a horizontal offset; a zero offset keeps the current facing.
    pub fn face_toward(&mut self, dx: f32) {
        if let Some(facing) = Facing::from_direction(dx) {
            self.facing = facing;
        }
    }

    /// A `width` x `height` rectangle flush against the hitbox edge we are
    /// facing, vertically centered on the hitbox.
    pub fn front_rect(&self, width: i32, height: i32) -> IRect {
        let center_y = (self.hitbox.min.y + self.hitbox.max.y) / 2;
        let y = center_y - height / 2;
        match self.facing {
            Facing::Right => rect_at(self.hitbox.max.x, y, width, height),
            Facing::Left => rect_at(self.hitbox.min.x - width, y, width, height),
        }
    }
}

/// Kinematic integrator state: velocity, gravity and collision flags.
///
/// Velocities are in pixels per 60 Hz frame. The four contact flags are
/// cleared by [`PhysicsBody::reset_collision_flags`] at the start of the
/// collision stage and written only by the collision resolver.
#[derive(Component, Debug, Clone)]
pub struct PhysicsBody {
    pub velocity: Vec2,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub gravity_enabled: bool,
    pub on_ground: bool,
    pub on_wall_left: bool,
    pub on_wall_right: bool,
    pub on_ceiling: bool,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self::new(0.8, 15.0)
    }
}

impl PhysicsBody {
    pub fn new(gravity: f32, max_fall_speed: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity,
            max_fall_speed,
            gravity_enabled: true,
            on_ground: false,
            on_wall_left: false,
            on_wall_right: false,
            on_ceiling: false,
        }
    }

    pub fn apply_gravity(&mut self, dt: f32) {
        if !self.gravity_enabled || self.on_ground {
            return;
        }
        self.velocity.y += self.gravity * dt * 60.0;
        self.velocity.y = self.velocity.y.min(self.max_fall_speed);
    }

    /// Ground friction. Decays horizontal velocity and snaps it to zero
    /// below 0.1 so bodies come to rest.
    pub fn apply_friction(&mut self, coefficient: f32, dt: f32) {
        if !self.on_ground {
            return;
        }
        let factor = (1.0 - coefficient * dt * 60.0).max(0.0);
        self.velocity.x *= factor;
        if self.velocity.x.abs() < 0.1 {
            self.velocity.x = 0.0;
        }
    }

    pub fn reset_collision_flags(&mut self) {
        self.on_ground = false;
        self.on_wall_left = false;
        self.on_wall_right = false;
        self.on_ceiling = false;
    }

    pub fn on_wall(&self) -> bool {
        self.on_wall_left || self.on_wall_right
    }

    /// Side of the wall we are touching, if any. Right wins ties.
    pub fn wall_side(&self) -> Option<Facing> {
        if self.on_wall_right {
            Some(Facing::Right)
        } else if self.on_wall_left {
            Some(Facing::Left)
        } else {
            None
        }
    }
}
