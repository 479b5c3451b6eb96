//! Combat domain: enemy and boss AI, damage, and hit resolution.

use bevy::prelude::*;

pub mod ai;
mod components;
mod events;
mod spawn;
mod systems;

#[cfg(test)]
mod tests;

pub use ai::{
    AiAction, AiContext, BehaviorKind, BossBehavior, BossBrain, BossContext, BossUpdate,
    DecisionMaker, EnemyBrain, EnemyConfig, EnemyContext, SmartConfig, TargetInfo, UtilityAi,
};
pub use components::{Boss, DamageOutcome, Enemy, Health, Invulnerable, Target, apply_damage};
pub use events::{
    BossDefeatedEvent, BossPhaseChangeEvent, BossProjectileSpawned, DamageEvent, DeathEvent,
    SoundCue, SoundCueEvent,
};
pub use spawn::{BossBundle, EnemyBundle, EntityKind, SpawnPoint, spawn_from_point};

use crate::core::SimulationSet;

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<DamageEvent>()
            .add_message::<DeathEvent>()
            .add_message::<BossPhaseChangeEvent>()
            .add_message::<BossDefeatedEvent>()
            .add_message::<BossProjectileSpawned>()
            .add_message::<SoundCueEvent>()
            .add_systems(
                Update,
                (
                    systems::assign_player_target,
                    systems::update_enemies,
                    systems::update_bosses,
                )
                    .chain()
                    .in_set(SimulationSet::Behavior),
            )
            .add_systems(Update, systems::resolve_combat.in_set(SimulationSet::Combat))
            .add_systems(
                Update,
                systems::tick_invulnerability.in_set(SimulationSet::Animation),
            )
            .add_systems(Update, systems::despawn_finished.in_set(SimulationSet::Cleanup));
    }
}
