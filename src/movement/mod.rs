//! Movement domain: kinematic bodies, tile collision, and input.

use bevy::prelude::*;

mod collision;
mod components;
mod resources;
mod systems;


pub use collision::{
    CollisionResolver, RAYCAST_STEP_SIZE, RaycastHit, Sweep, overlaps, rect_at, translate,
};
pub use components::{Body, Facing, PhysicsBody};
pub use resources::{Action, InputBindings, InputState, RawInput};
pub use systems::step_body;

use crate::core::SimulationSet;

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RawInput>()
            .init_resource::<InputState>()
            .init_resource::<InputBindings>()
            .init_resource::<CollisionResolver>()
            .add_systems(
                Update,
                (systems::sample_keyboard, systems::update_input_state)
                    .chain()
                    .in_set(SimulationSet::Input),
            )
            .add_systems(Update, systems::apply_gravity.in_set(SimulationSet::Physics))
            .add_systems(
                Update,
                systems::resolve_tile_collisions.in_set(SimulationSet::Collision),
            );
    }
}
