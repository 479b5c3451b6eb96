//! Combat domain: combat-related events.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use super::components::DamageOutcome;

#[derive(Debug)]
pub struct DamageEvent {
    pub source: Entity,
    pub target: Entity,
    pub amount: i32,
    pub outcome: DamageOutcome,
}

impl Message for DamageEvent {}

#[derive(Debug)]
pub struct DeathEvent {
    pub entity: Entity,
}

impl Message for DeathEvent {}

#[derive(Debug)]
pub struct BossPhaseChangeEvent {
    pub boss: Entity,
    pub new_phase: u8,
}

impl Message for BossPhaseChangeEvent {}

#[derive(Debug)]
pub struct BossDefeatedEvent {
    pub boss: Entity,
}

impl Message for BossDefeatedEvent {}

/// The boss released its ranged projectile this frame.
#[derive(Debug)]
pub struct BossProjectileSpawned {
    pub boss: Entity,
    pub origin: Vec2,
    pub direction: Vec2,
}

impl Message for BossProjectileSpawned {}

/// Sound requests for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Jump,
    Dash,
    AttackSwing,
    Hit,
    EnemyDeath,
    BossPhase,
    PlayerHurt,
}

#[derive(Debug)]
pub struct SoundCueEvent {
    pub entity: Entity,
    pub cue: SoundCue,
}

impl Message for SoundCueEvent {}
