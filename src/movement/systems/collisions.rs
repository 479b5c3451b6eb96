//! Movement domain: tile collision stage.

use bevy::prelude::*;

use crate::movement::{Body, CollisionResolver, PhysicsBody};

/// Advance a body by one frame of velocity through the tile set.
///
/// The displacement is `velocity * dt * 60` plus the carried sub-pixel
/// remainder. Contact flags are reset first and rebuilt by the sweep.
pub fn step_body(resolver: &CollisionResolver, body: &mut Body, physics: &mut PhysicsBody, dt: f32) {
    physics.reset_collision_flags();

    let displacement = physics.velocity * dt * 60.0 + body.remainder;
    let sweep = resolver.sweep(body.hitbox, displacement, physics);
    let moved = (sweep.hitbox.min - body.hitbox.min).as_vec2();

    body.remainder = displacement - moved;
    if sweep.blocked_x {
        body.remainder.x = 0.0;
    }
    if sweep.blocked_y {
        body.remainder.y = 0.0;
    }
    body.hitbox = sweep.hitbox;
    body.sync_from_hitbox();
}

pub(crate) fn resolve_tile_collisions(
    time: Res<Time>,
    resolver: Res<CollisionResolver>,
    mut query: Query<(&mut Body, &mut PhysicsBody)>,
) {
    let dt = time.delta_secs();
    for (mut body, mut physics) in &mut query {
        step_body(&resolver, &mut body, &mut physics, dt);
    }
}
