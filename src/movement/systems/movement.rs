//! Movement domain: gravity integration.

use bevy::prelude::*;

use crate::movement::PhysicsBody;

pub(crate) fn apply_gravity(time: Res<Time>, mut query: Query<&mut PhysicsBody>) {
    let dt = time.delta_secs();
    for mut physics in &mut query {
        physics.apply_gravity(dt);
    }
}
