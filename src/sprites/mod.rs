//! Sprites module: animation clip selection and playback.
//!
//! Entities pick clips by name from their behavior; rendering is external.

pub mod animation;


use bevy::prelude::*;

pub use animation::*;

use crate::core::SimulationSet;
use crate::movement::Body;

pub struct SpritesPlugin;

impl Plugin for SpritesPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<AnimationFinished>().add_systems(
            Update,
            (sync_animation_facing, update_animation_frames)
                .chain()
                .in_set(SimulationSet::Animation),
        );
    }
}

fn sync_animation_facing(mut query: Query<(&Body, &mut AnimationController), Changed<Body>>) {
    for (body, mut controller) in &mut query {
        controller.facing = body.facing;
    }
}
