//! Combat domain: enemy and boss bundles, and spawning from spawn points.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::combat::ai::{BossBrain, EnemyBrain, EnemyConfig, SmartConfig, UtilityAi};
use crate::combat::components::{Boss, Enemy, Health, Invulnerable};
use crate::content::{BossTuning, EnemyTuning, GameplayTuning, PhysicsTuning, SmartEnemyTuning};
use crate::movement::{Body, PhysicsBody};
use crate::player::PlayerBundle;
use crate::sprites::{AnimationController, ClipLibrary};

#[derive(Bundle)]
pub struct EnemyBundle {
    pub enemy: Enemy,
    pub brain: EnemyBrain,
    pub body: Body,
    pub physics: PhysicsBody,
    pub health: Health,
    pub invulnerable: Invulnerable,
    pub animation: AnimationController,
}

impl EnemyBundle {
    pub fn new(position: Vec2, tuning: &EnemyTuning, physics: &PhysicsTuning) -> Self {
        Self::with_config(
            position,
            EnemyConfig::from_tuning(tuning, position),
            tuning.max_health,
            tuning.size,
            physics,
        )
    }

    pub fn with_config(
        position: Vec2,
        config: EnemyConfig,
        max_health: i32,
        size: (i32, i32),
        physics: &PhysicsTuning,
    ) -> Self {
        Self {
            enemy: Enemy,
            brain: EnemyBrain::new(config),
            body: Body::new(position, IVec2::new(size.0, size.1)),
            physics: PhysicsBody::new(physics.gravity, physics.max_fall_speed),
            health: Health::new(max_health),
            invulnerable: Invulnerable::default(),
            animation: AnimationController::new(ClipLibrary::enemy(), "idle"),
        }
    }

    /// Turn this into a smart enemy: the brain gains SmartChase, Flank and
    /// Retreat, and the returned [`UtilityAi`] drives it.
    pub fn smart(mut self, tuning: &SmartEnemyTuning, seed: u64) -> (Self, UtilityAi) {
        self.brain = self.brain.with_smart(SmartConfig::from(tuning), seed);
        let utility = UtilityAi::from_tuning(tuning, seed.wrapping_add(1));
        (self, utility)
    }
}

#[derive(Bundle)]
pub struct BossBundle {
    pub boss: Boss,
    pub brain: BossBrain,
    pub body: Body,
    pub physics: PhysicsBody,
    pub health: Health,
    pub invulnerable: Invulnerable,
    pub animation: AnimationController,
}

impl BossBundle {
    pub fn new(position: Vec2, tuning: &BossTuning, physics: &PhysicsTuning, seed: u64) -> Self {
        let (width, height) = tuning.size;
        Self {
            boss: Boss,
            brain: BossBrain::new(tuning.clone(), seed),
            body: Body::new(position, IVec2::new(width, height)),
            physics: PhysicsBody::new(physics.gravity, physics.max_fall_speed),
            health: Health::new(tuning.max_health),
            invulnerable: Invulnerable::default(),
            animation: AnimationController::new(ClipLibrary::boss(), "idle"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Enemy,
    SmartEnemy,
    Boss,
}

impl EntityKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "player" => Some(EntityKind::Player),
            "enemy" => Some(EntityKind::Enemy),
            "smart_enemy" => Some(EntityKind::SmartEnemy),
            "boss" => Some(EntityKind::Boss),
            _ => None,
        }
    }
}

/// Spawn data handed over by the level loader.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec2,
    pub kind: String,
    /// Spawns left; -1 means unlimited.
    pub remaining: i32,
    pub enabled: bool,
    pub properties: HashMap<String, f32>,
}

impl SpawnPoint {
    pub fn new(position: Vec2, kind: impl Into<String>) -> Self {
        Self {
            position,
            kind: kind.into(),
            remaining: 1,
            enabled: true,
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: f32) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn can_spawn(&self) -> bool {
        self.enabled && (self.remaining == -1 || self.remaining > 0)
    }

    /// Use up one spawn. Returns false if nothing was left.
    pub fn consume(&mut self) -> bool {
        if !self.can_spawn() {
            return false;
        }
        if self.remaining > 0 {
            self.remaining -= 1;
        }
        true
    }

    fn property(&self, key: &str) -> Option<f32> {
        self.properties.get(key).copied()
    }

    fn seed(&self) -> u64 {
        match self.property("seed") {
            Some(seed) => seed.max(0.0) as u64,
            None => (u64::from(self.position.x.to_bits()) << 32) | u64::from(self.position.y.to_bits()),
        }
    }

    /// Enemy config from tuning with this point's overrides applied.
    pub fn enemy_config(&self, tuning: &EnemyTuning) -> EnemyConfig {
        let mut config = EnemyConfig::from_tuning(tuning, self.position);
        if let Some(speed) = self.property("speed") {
            config.speed = speed;
        }
        if let Some(damage) = self.property("damage") {
            config.damage = damage.round() as i32;
        }
        if let Some(range) = self.property("detection_range") {
            config.detection_range = range;
        }
        if let Some(range) = self.property("attack_range") {
            config.attack_range = range;
        }
        if let Some(span) = self.property("patrol_span") {
            config
                .patrol_points
                .push(self.position + Vec2::new(span, 0.0));
        }
        config
    }

    pub fn smart_tuning(&self, tuning: &SmartEnemyTuning) -> SmartEnemyTuning {
        let mut smart = tuning.clone();
        if let Some(aggression) = self.property("aggression") {
            smart.aggression = aggression;
        }
        if let Some(randomness) = self.property("randomness") {
            smart.randomness = randomness;
        }
        smart
    }
}

/// Build the entity a spawn point describes and use up one of its spawns.
/// Disabled, exhausted and unknown points spawn nothing.
pub fn spawn_from_point(
    commands: &mut Commands,
    point: &mut SpawnPoint,
    tuning: &GameplayTuning,
) -> Option<Entity> {
    let Some(kind) = EntityKind::from_tag(&point.kind) else {
        warn!("Unknown spawn kind '{}' at {:?}", point.kind, point.position);
        return None;
    };
    if !point.consume() {
        debug!("Spawn point at {:?} is disabled or exhausted", point.position);
        return None;
    }

    let health_override = point.property("health").map(|health| health.round() as i32);
    let entity = match kind {
        EntityKind::Player => {
            let mut bundle = PlayerBundle::from_tuning(point.position, tuning);
            if let Some(health) = health_override {
                bundle.health = Health::new(health);
            }
            commands.spawn(bundle).id()
        }
        EntityKind::Enemy | EntityKind::SmartEnemy => {
            let bundle = EnemyBundle::with_config(
                point.position,
                point.enemy_config(&tuning.enemy),
                health_override.unwrap_or(tuning.enemy.max_health),
                tuning.enemy.size,
                &tuning.physics,
            );
            if kind == EntityKind::SmartEnemy {
                let smart = point.smart_tuning(&tuning.smart_enemy);
                let (bundle, utility) = bundle.smart(&smart, point.seed());
                commands.spawn((bundle, utility)).id()
            } else {
                commands.spawn(bundle).id()
            }
        }
        EntityKind::Boss => {
            let mut bundle =
                BossBundle::new(point.position, &tuning.boss, &tuning.physics, point.seed());
            if let Some(health) = health_override {
                bundle.health = Health::new(health);
            }
            commands.spawn(bundle).id()
        }
    };

    info!("Spawned {:?} at {:?}", kind, point.position);
    Some(entity)
}
