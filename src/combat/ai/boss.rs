//! Combat domain: boss phases and attack behaviors.
//!
//! The phase is recomputed from the health ratio at the start of every
//! update, before the behavior runs. Phase 2 unlocks the ranged attack,
//! phase 3 the area attack plus a one-off speed boost.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_chacha::ChaCha8Rng;

use super::enemy::TargetInfo;
use crate::combat::components::{DamageOutcome, Health, Invulnerable, apply_damage};
use crate::content::{AttackWindow, BossTuning};
use crate::movement::{Body, PhysicsBody, rect_at};
use crate::sprites::AnimationController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossBehavior {
    Idle,
    Melee,
    Ranged,
    Area,
}

impl BossBehavior {
    pub fn name(self) -> &'static str {
        match self {
            BossBehavior::Idle => "idle",
            BossBehavior::Melee => "melee",
            BossBehavior::Ranged => "ranged",
            BossBehavior::Area => "area",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            BossBehavior::Idle,
            BossBehavior::Melee,
            BossBehavior::Ranged,
            BossBehavior::Area,
        ]
        .into_iter()
        .find(|behavior| behavior.name() == name)
    }

    pub fn is_attack(self) -> bool {
        self != BossBehavior::Idle
    }
}

pub struct BossContext<'a> {
    pub body: &'a mut Body,
    pub physics: &'a mut PhysicsBody,
    pub animation: &'a mut AnimationController,
    pub target: Option<TargetInfo>,
    pub health_ratio: f32,
}

impl BossContext<'_> {
    fn distance_to_target(&self) -> Option<f32> {
        self.target
            .map(|target| self.body.position.distance(target.position))
    }
}

/// Side effects of one boss update for the ECS layer to publish.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BossUpdate {
    pub phase_changed: Option<u8>,
    /// Origin and unit direction of a projectile released this frame.
    pub projectile: Option<(Vec2, Vec2)>,
}

#[derive(Component, Debug, Clone)]
pub struct BossBrain {
    tuning: BossTuning,
    phase: u8,
    speed: f32,
    speed_boosted: bool,
    behavior: BossBehavior,
    idle_timer: f32,
    attack_timer: f32,
    cooldown: f32,
    projectile_released: bool,
    rng: ChaCha8Rng,
}

impl BossBrain {
    pub fn new(tuning: BossTuning, seed: u64) -> Self {
        let speed = tuning.speed;
        Self {
            tuning,
            phase: 1,
            speed,
            speed_boosted: false,
            behavior: BossBehavior::Idle,
            idle_timer: 0.0,
            attack_timer: 0.0,
            cooldown: 0.0,
            projectile_released: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn tuning(&self) -> &BossTuning {
        &self.tuning
    }

    pub fn phase(&self) -> u8 {
        self.phase
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn behavior(&self) -> BossBehavior {
        self.behavior
    }

    pub fn behavior_name(&self) -> &'static str {
        self.behavior.name()
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    pub fn attack_timer(&self) -> f32 {
        self.attack_timer
    }

    /// Phase for a health ratio: above the phase-two threshold is phase 1,
    /// above the phase-three threshold phase 2, anything lower phase 3.
    pub fn phase_for(&self, health_ratio: f32) -> u8 {
        if health_ratio > self.tuning.phase_two_threshold {
            1
        } else if health_ratio > self.tuning.phase_three_threshold {
            2
        } else {
            3
        }
    }

    pub fn can_ranged(&self) -> bool {
        self.phase >= 2
    }

    pub fn can_area(&self) -> bool {
        self.phase >= 3
    }

    /// Attacks usable in the current phase; each phase is a superset of the
    /// one before.
    pub fn unlocked_attacks(&self) -> Vec<BossBehavior> {
        let mut attacks = vec![BossBehavior::Melee];
        if self.can_ranged() {
            attacks.push(BossBehavior::Ranged);
        }
        if self.can_area() {
            attacks.push(BossBehavior::Area);
        }
        attacks
    }

    /// Recompute the phase, returning the new phase if it changed. Entering
    /// phase 3 applies the speed multiplier once; it is never removed.
    pub fn update_phase(&mut self, health_ratio: f32) -> Option<u8> {
        let phase = self.phase_for(health_ratio);
        if phase == self.phase {
            return None;
        }
        info!("Boss phase {} -> {}", self.phase, phase);
        self.phase = phase;
        if phase == 3 && !self.speed_boosted {
            self.speed *= self.tuning.phase_three_speed_multiplier;
            self.speed_boosted = true;
        }
        Some(phase)
    }

    /// Pick the next attack for a target `distance` away. Melee up close;
    /// inside ranged reach a pick between ranged and melee (area joins in
    /// phase 3 once the target is close enough); further out any unlocked
    /// attack. Always returns an attack.
    pub fn choose_attack(&mut self, distance: f32) -> BossBehavior {
        if distance < self.tuning.melee_range {
            return BossBehavior::Melee;
        }

        let ranged = self.can_ranged() && distance > self.tuning.melee_range;
        let area = self.can_area() && distance < self.tuning.area_range;

        let mut pool = if ranged && distance < self.tuning.ranged_range {
            vec![BossBehavior::Ranged, BossBehavior::Melee]
        } else {
            let mut pool = vec![BossBehavior::Melee];
            if ranged {
                pool.push(BossBehavior::Ranged);
            }
            pool
        };
        if area {
            pool.push(BossBehavior::Area);
        }

        pool.choose(&mut self.rng).copied().unwrap_or(BossBehavior::Melee)
    }

    fn window(&self, behavior: BossBehavior) -> Option<&AttackWindow> {
        match behavior {
            BossBehavior::Idle => None,
            BossBehavior::Melee => Some(&self.tuning.melee),
            BossBehavior::Ranged => Some(&self.tuning.ranged),
            BossBehavior::Area => Some(&self.tuning.area),
        }
    }

    pub fn is_attack_active(&self) -> bool {
        self.window(self.behavior)
            .is_some_and(|window| window.is_active(self.attack_timer))
    }

    /// Damage rectangle of the running attack, only inside its active window.
    pub fn attack_hitbox(&self, body: &Body) -> Option<IRect> {
        if !self.is_attack_active() {
            return None;
        }
        let center = body.center().round().as_ivec2();
        match self.behavior {
            BossBehavior::Idle => None,
            BossBehavior::Melee => Some(body.front_rect(
                self.tuning.melee_range as i32,
                body.hitbox_size().y,
            )),
            BossBehavior::Ranged => {
                let size = self.tuning.projectile_size;
                Some(rect_at(center.x - size / 2, center.y - size / 2, size, size))
            }
            BossBehavior::Area => {
                let size = self.tuning.area_size;
                Some(rect_at(center.x - size / 2, center.y - size / 2, size, size))
            }
        }
    }

    pub fn attack_damage(&self) -> i32 {
        match self.behavior {
            BossBehavior::Idle | BossBehavior::Melee => self.tuning.melee_damage,
            BossBehavior::Ranged => self.tuning.ranged_damage,
            BossBehavior::Area => self.tuning.area_damage,
        }
    }

    /// Boss hits have no Hurt reaction; death is read from [`Health`].
    pub fn take_damage(
        &mut self,
        amount: i32,
        health: &mut Health,
        invulnerable: &mut Invulnerable,
    ) -> DamageOutcome {
        apply_damage(
            health,
            invulnerable,
            amount,
            self.tuning.invulnerability_duration,
        )
    }

    /// Phase first, then the current behavior.
    pub fn update(&mut self, dt: f32, ctx: &mut BossContext) -> BossUpdate {
        let mut report = BossUpdate {
            phase_changed: self.update_phase(ctx.health_ratio),
            ..default()
        };

        if ctx.health_ratio <= 0.0 {
            ctx.physics.velocity.x = 0.0;
            ctx.animation.play("death", false);
            return report;
        }

        self.cooldown = (self.cooldown - dt).max(0.0);

        let next = match self.behavior {
            BossBehavior::Idle => self.update_idle(dt, ctx),
            attack => self.update_attack(attack, dt, ctx, &mut report),
        };
        if let Some(next) = next {
            self.change_behavior(next, ctx);
        }
        report
    }

    pub fn change_behavior(&mut self, next: BossBehavior, ctx: &mut BossContext) {
        debug!("Boss behavior: {} -> {}", self.behavior.name(), next.name());
        self.behavior = next;
        match next {
            BossBehavior::Idle => {
                self.idle_timer = 0.0;
                ctx.animation.play("idle", false);
            }
            attack => {
                self.attack_timer = 0.0;
                self.projectile_released = false;
                self.cooldown = if attack == BossBehavior::Area {
                    self.tuning.attack_cooldown * self.tuning.area_cooldown_multiplier
                } else {
                    self.tuning.attack_cooldown
                };
                ctx.physics.velocity.x = 0.0;
                if let Some(target) = ctx.target {
                    ctx.body.face_toward(target.position.x - ctx.body.position.x);
                }
                ctx.animation.play(attack.name(), true);
            }
        }
    }

    pub fn change_behavior_named(&mut self, name: &str, ctx: &mut BossContext) -> bool {
        match BossBehavior::from_name(name) {
            Some(next) => {
                self.change_behavior(next, ctx);
                true
            }
            None => {
                warn!(
                    "Unknown boss behavior '{}', staying in {}",
                    name,
                    self.behavior.name()
                );
                false
            }
        }
    }

    fn update_idle(&mut self, dt: f32, ctx: &mut BossContext) -> Option<BossBehavior> {
        self.idle_timer += dt;
        ctx.physics.velocity.x = 0.0;
        let (Some(target), Some(distance)) = (ctx.target, ctx.distance_to_target()) else {
            return None;
        };
        ctx.body.face_toward(target.position.x - ctx.body.position.x);

        if self.cooldown > 0.0 {
            return None;
        }
        let ready = self.idle_timer >= self.tuning.max_idle_time
            || distance < self.tuning.melee_range * 1.5;
        if !ready {
            return None;
        }
        Some(self.choose_attack(distance))
    }

    fn update_attack(
        &mut self,
        attack: BossBehavior,
        dt: f32,
        ctx: &mut BossContext,
        report: &mut BossUpdate,
    ) -> Option<BossBehavior> {
        ctx.physics.velocity.x = 0.0;
        self.attack_timer += dt;
        let window = *self.window(attack)?;

        if attack == BossBehavior::Ranged
            && !self.projectile_released
            && self.attack_timer >= window.active_start
        {
            self.projectile_released = true;
            let origin = ctx.body.center();
            let direction = ctx
                .target
                .map(|target| (target.position - ctx.body.position).normalize_or_zero())
                .filter(|direction| *direction != Vec2::ZERO)
                .unwrap_or(Vec2::new(ctx.body.facing.sign(), 0.0));
            report.projectile = Some((origin, direction));
        }

        if self.attack_timer >= window.duration {
            return Some(BossBehavior::Idle);
        }
        None
    }
}
