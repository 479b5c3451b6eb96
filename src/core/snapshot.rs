//! Core domain: read-only view of the simulation for rendering and UI.

use bevy::prelude::*;
use serde::Serialize;

use crate::combat::{BossBrain, EnemyBrain, Health};
use crate::movement::Body;
use crate::player::PlayerFsm;
use crate::sprites::AnimationController;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub kind: String,
    pub position: [f32; 2],
    pub animation: String,
    pub facing_right: bool,
    pub health: i32,
    pub max_health: i32,
    /// Boss only.
    pub phase: Option<u8>,
    /// Player state or enemy/boss behavior name.
    pub state: String,
}

/// Everything a presentation layer may draw, rebuilt at the end of every frame.
#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct SimulationSnapshot {
    pub frame: u64,
    pub entities: Vec<EntitySnapshot>,
}

impl SimulationSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a EntitySnapshot> + 'a {
        self.entities.iter().filter(move |entity| entity.kind == kind)
    }
}

pub(crate) fn capture_snapshot(
    mut snapshot: ResMut<SimulationSnapshot>,
    query: Query<(
        &Body,
        &AnimationController,
        &Health,
        Option<&PlayerFsm>,
        Option<&EnemyBrain>,
        Option<&BossBrain>,
    )>,
) {
    snapshot.frame += 1;
    snapshot.entities.clear();

    for (body, animation, health, player, enemy, boss) in &query {
        let (kind, state, phase) = match (player, enemy, boss) {
            (Some(fsm), _, _) => ("player", fsm.state_name(), None),
            (_, Some(brain), _) if brain.is_smart() => ("smart_enemy", brain.behavior_name(), None),
            (_, Some(brain), _) => ("enemy", brain.behavior_name(), None),
            (_, _, Some(brain)) => ("boss", brain.behavior_name(), Some(brain.phase())),
            _ => continue,
        };
        snapshot.entities.push(EntitySnapshot {
            kind: kind.to_string(),
            position: body.position.to_array(),
            animation: animation.current().to_string(),
            facing_right: body.facing.is_right(),
            health: health.current,
            max_health: health.max,
            phase,
            state: state.to_string(),
        });
    }
}

/// F3 prints the current snapshot as JSON.
#[cfg(feature = "dev-tools")]
pub(crate) fn dump_snapshot_on_key(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    snapshot: Res<SimulationSnapshot>,
) {
    let Some(keyboard) = keyboard else {
        return;
    };
    if !keyboard.just_pressed(KeyCode::F3) {
        return;
    }
    match snapshot.to_json() {
        Ok(json) => info!("Simulation snapshot:\n{}", json),
        Err(err) => error!("Failed to serialize simulation snapshot: {}", err),
    }
}
