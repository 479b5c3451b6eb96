//! Combat domain: components and combat-related state types.

use bevy::prelude::*;

/// Marks an entity driven by [`crate::combat::EnemyBrain`].
#[derive(Component, Debug)]
pub struct Enemy;

/// Marks an entity driven by [`crate::combat::BossBrain`].
#[derive(Component, Debug)]
pub struct Boss;

/// The entity an enemy or boss is interested in.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target(pub Entity);

/// Integer hit points, always within `[0, max]`.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Subtract `amount`, clamping at zero. Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let actual = amount.clamp(0, self.current);
        self.current -= actual;
        actual
    }

    pub fn heal(&mut self, amount: i32) -> i32 {
        let actual = amount.clamp(0, self.max - self.current);
        self.current += actual;
        actual
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    pub fn ratio(&self) -> f32 {
        if self.max <= 0 {
            0.0
        } else {
            self.current as f32 / self.max as f32
        }
    }
}

/// Invulnerability frames - entity cannot take damage
#[derive(Component, Debug, Default, Clone)]
pub struct Invulnerable {
    pub timer: f32,
}

impl Invulnerable {
    pub fn is_invulnerable(&self) -> bool {
        self.timer > 0.0
    }

    /// Start a window of `duration` seconds, keeping a longer one if active.
    pub fn grant(&mut self, duration: f32) {
        self.timer = self.timer.max(duration);
    }

    pub fn tick(&mut self, dt: f32) {
        self.timer = (self.timer - dt).max(0.0);
    }
}

/// What a damage application did to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target was invulnerable or already dead.
    Ignored,
    Hurt,
    Killed,
}

impl DamageOutcome {
    pub fn landed(self) -> bool {
        self != DamageOutcome::Ignored
    }
}

/// Health and invulnerability handling shared by every damageable entity:
/// ignored while invulnerable or dead, otherwise clamp and report whether
/// the hit was fatal. Non-fatal hits open a `window` of invulnerability.
pub fn apply_damage(
    health: &mut Health,
    invulnerable: &mut Invulnerable,
    amount: i32,
    window: f32,
) -> DamageOutcome {
    if invulnerable.is_invulnerable() || health.is_dead() {
        return DamageOutcome::Ignored;
    }
    health.take_damage(amount);
    if health.is_dead() {
        DamageOutcome::Killed
    } else {
        invulnerable.grant(window);
        DamageOutcome::Hurt
    }
}
