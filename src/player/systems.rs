//! Player domain: per-frame systems.

use bevy::prelude::*;

use super::{Player, PlayerContext, PlayerFsm};
use crate::combat::{Invulnerable, SoundCueEvent};
use crate::content::GameplayTuning;
use crate::movement::{Body, InputState, PhysicsBody};
use crate::sprites::AnimationController;

pub(crate) fn update_player_fsm(
    time: Res<Time>,
    input: Res<InputState>,
    tuning: Res<GameplayTuning>,
    mut query: Query<
        (
            Entity,
            &mut PlayerFsm,
            &mut Body,
            &mut PhysicsBody,
            &mut Invulnerable,
            &mut AnimationController,
        ),
        With<Player>,
    >,
    mut cue_events: MessageWriter<SoundCueEvent>,
) {
    let dt = time.delta_secs();

    for (entity, mut fsm, mut body, mut physics, mut invulnerable, mut animation) in &mut query {
        let mut ctx = PlayerContext {
            input: &input,
            body: &mut body,
            physics: &mut physics,
            invulnerable: &mut invulnerable,
            animation: &mut animation,
            ground_friction: tuning.physics.ground_friction,
        };
        fsm.update(dt, &mut ctx);

        for cue in fsm.take_cues() {
            cue_events.write(SoundCueEvent { entity, cue });
        }
    }
}
