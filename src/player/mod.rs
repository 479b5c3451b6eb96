//! Player domain: the input-driven player state machine.

use bevy::prelude::*;

mod fsm;
mod states;
mod systems;


pub use fsm::{PlayerContext, PlayerFsm};
pub use states::PlayerState;

use crate::combat::{Health, Invulnerable};
use crate::content::{GameplayTuning, PhysicsTuning, PlayerTuning};
use crate::core::SimulationSet;
use crate::movement::{Body, PhysicsBody};
use crate::sprites::{AnimationController, ClipLibrary};

#[derive(Component, Debug)]
pub struct Player;

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: Player,
    pub fsm: PlayerFsm,
    pub body: Body,
    pub physics: PhysicsBody,
    pub health: Health,
    pub invulnerable: Invulnerable,
    pub animation: AnimationController,
}

impl PlayerBundle {
    pub fn new(position: Vec2, player: &PlayerTuning, physics: &PhysicsTuning) -> Self {
        let (width, height) = player.size;
        let (hitbox_width, hitbox_height) = player.hitbox_size;
        Self {
            player: Player,
            fsm: PlayerFsm::new(player.clone()),
            body: Body::with_hitbox(
                position,
                IVec2::new(width, height),
                IVec2::new(hitbox_width, hitbox_height),
            ),
            physics: PhysicsBody::new(physics.gravity, physics.max_fall_speed),
            health: Health::new(player.max_health),
            invulnerable: Invulnerable::default(),
            animation: AnimationController::new(ClipLibrary::player(), "idle"),
        }
    }

    pub fn from_tuning(position: Vec2, tuning: &GameplayTuning) -> Self {
        Self::new(position, &tuning.player, &tuning.physics)
    }
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            systems::update_player_fsm.in_set(SimulationSet::Behavior),
        );
    }
}
