//! Combat domain: utility-based decisions for smart enemies.
//!
//! Every decision cycle scores each [`AiAction`] in `[0, 1]` from an
//! [`AiContext`] snapshot, perturbs the scores with seeded noise and picks
//! the best. The chosen action is mapped onto one of the enemy's behaviors.

use std::collections::VecDeque;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::enemy::{BehaviorKind, EnemyBrain, EnemyContext};
use crate::combat::components::Health;
use crate::content::SmartEnemyTuning;

/// Response curves mapping a raw feature onto `[0, 1]`.
pub mod curves {
    pub fn linear(value: f32, min: f32, max: f32) -> f32 {
        if max <= min {
            return 0.0;
        }
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }

    pub fn inverse_linear(value: f32, min: f32, max: f32) -> f32 {
        1.0 - linear(value, min, max)
    }

    pub fn exponential(value: f32, exponent: f32) -> f32 {
        value.powf(exponent).clamp(0.0, 1.0)
    }

    /// `steepness` 10 and `midpoint` 0.5 give the usual S-curve over `[0, 1]`.
    pub fn logistic(value: f32, steepness: f32, midpoint: f32) -> f32 {
        1.0 / (1.0 + (-steepness * (value - midpoint)).exp())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiAction {
    Patrol,
    Chase,
    Attack,
    Retreat,
    Flank,
    Predict,
    Idle,
}

impl AiAction {
    /// Declaration order doubles as the tie-break order.
    pub const ALL: [AiAction; 7] = [
        AiAction::Patrol,
        AiAction::Chase,
        AiAction::Attack,
        AiAction::Retreat,
        AiAction::Flank,
        AiAction::Predict,
        AiAction::Idle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AiAction::Patrol => "patrol",
            AiAction::Chase => "chase",
            AiAction::Attack => "attack",
            AiAction::Retreat => "retreat",
            AiAction::Flank => "flank",
            AiAction::Predict => "predict",
            AiAction::Idle => "idle",
        }
    }
}

/// Snapshot rebuilt for every decision; never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct AiContext {
    pub position: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub target_position: Option<Vec2>,
    /// Pixels per 60 Hz frame.
    pub target_velocity: Option<Vec2>,
    pub target_health: Option<i32>,
    pub distance: Option<f32>,
    pub detection_range: f32,
    pub attack_range: f32,
    pub time_since_attack: f32,
}

impl AiContext {
    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0 {
            0.0
        } else {
            self.health as f32 / self.max_health as f32
        }
    }
}

/// Scores actions and keeps a short history of what it picked.
#[derive(Debug, Clone)]
pub struct DecisionMaker {
    aggression: f32,
    randomness: f32,
    history: VecDeque<AiAction>,
    history_len: usize,
    rng: ChaCha8Rng,
}

impl DecisionMaker {
    pub fn new(aggression: f32, randomness: f32, history_len: usize, seed: u64) -> Self {
        Self {
            aggression: aggression.clamp(0.0, 1.0),
            randomness: randomness.clamp(0.0, 1.0),
            history: VecDeque::with_capacity(history_len),
            history_len,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn aggression(&self) -> f32 {
        self.aggression
    }

    pub fn randomness(&self) -> f32 {
        self.randomness
    }

    pub fn history(&self) -> impl Iterator<Item = AiAction> + '_ {
        self.history.iter().copied()
    }

    /// Noise-free utility of `action`.
    pub fn score(&self, action: AiAction, ctx: &AiContext) -> f32 {
        use curves::{exponential, inverse_linear, linear, logistic};

        let aggression = self.aggression;
        let detection = ctx.detection_range;
        let attack = ctx.attack_range;

        let score = match (action, ctx.distance) {
            (AiAction::Patrol, None) => 0.9,
            (AiAction::Patrol, Some(d)) => linear(d, detection, detection * 2.0) * 0.8,

            (AiAction::Chase, Some(d)) if d <= detection => {
                if d > attack {
                    let drive = logistic(aggression, 10.0, 0.5);
                    0.7 + inverse_linear(d, attack, detection) * 0.2 + drive * 0.1
                } else {
                    0.3
                }
            }
            (AiAction::Chase, _) => 0.0,

            (AiAction::Attack, Some(d)) if d <= attack => {
                let recovery = exponential(linear(ctx.time_since_attack, 0.0, 0.5), 2.0);
                0.8 + aggression * 0.2 - (1.0 - recovery) * 0.3
            }
            (AiAction::Attack, _) => 0.0,

            (AiAction::Retreat, _) => {
                let hurt = inverse_linear(ctx.health_ratio(), 0.2, 0.5);
                (hurt * 0.9 - aggression * 0.4).max(0.0)
            }

            (AiAction::Flank, None) => 0.0,
            (AiAction::Flank, Some(d)) => {
                if d > attack && d < detection * 0.7 {
                    0.5 + aggression * 0.2
                } else {
                    0.2
                }
            }

            (AiAction::Predict, Some(d)) => match ctx.target_velocity {
                None => 0.0,
                Some(velocity) => {
                    let speed = velocity.length();
                    if speed < 0.5 {
                        0.1
                    } else if d > attack * 1.5 && d < detection {
                        0.6 + speed * 0.05
                    } else {
                        0.2
                    }
                }
            },
            (AiAction::Predict, None) => 0.0,

            (AiAction::Idle, _) => 0.1,
        };
        score.clamp(0.0, 1.0)
    }

    fn noisy_score(&mut self, action: AiAction, ctx: &AiContext) -> f32 {
        let base = self.score(action, ctx);
        if self.randomness <= 0.0 {
            return base;
        }
        let noise = (self.rng.random::<f32>() - 0.5) * 2.0 * self.randomness;
        (base + noise * 0.2).clamp(0.0, 1.0)
    }

    /// Pick the highest-scoring action. Ties go to the earliest action in
    /// [`AiAction::ALL`].
    pub fn decide(&mut self, ctx: &AiContext) -> AiAction {
        let mut best = AiAction::Idle;
        let mut best_score = f32::NEG_INFINITY;
        for action in AiAction::ALL {
            let score = self.noisy_score(action, ctx);
            if score > best_score {
                best = action;
                best_score = score;
            }
        }

        self.history.push_back(best);
        while self.history.len() > self.history_len {
            self.history.pop_front();
        }
        best
    }
}

/// Periodic decision layer on top of an [`EnemyBrain`].
#[derive(Component, Debug, Clone)]
pub struct UtilityAi {
    decisions: DecisionMaker,
    interval: f32,
    timer: f32,
    time_since_attack: f32,
    seen_swings: u32,
    last_target: Option<Vec2>,
    target_velocity: Option<Vec2>,
    current_action: Option<AiAction>,
}

impl UtilityAi {
    pub fn new(decisions: DecisionMaker, interval: f32) -> Self {
        Self {
            decisions,
            interval,
            // The first update decides immediately.
            timer: interval,
            time_since_attack: 0.0,
            seen_swings: 0,
            last_target: None,
            target_velocity: None,
            current_action: None,
        }
    }

    pub fn from_tuning(tuning: &SmartEnemyTuning, seed: u64) -> Self {
        Self::new(
            DecisionMaker::new(
                tuning.aggression,
                tuning.randomness,
                tuning.history_len,
                seed,
            ),
            tuning.decision_interval,
        )
    }

    pub fn decisions(&self) -> &DecisionMaker {
        &self.decisions
    }

    pub fn current_action(&self) -> Option<AiAction> {
        self.current_action
    }

    pub fn time_since_attack(&self) -> f32 {
        self.time_since_attack
    }

    /// Concrete behavior for an action, falling back when the brain lacks
    /// the preferred one.
    pub fn behavior_for(action: AiAction, brain: &EnemyBrain) -> BehaviorKind {
        let prefer = |smart: BehaviorKind, fallback: BehaviorKind| {
            if brain.supports(smart) { smart } else { fallback }
        };
        match action {
            AiAction::Patrol | AiAction::Idle => BehaviorKind::Patrol,
            AiAction::Chase | AiAction::Predict => {
                prefer(BehaviorKind::SmartChase, BehaviorKind::Chase)
            }
            AiAction::Attack => BehaviorKind::Attack,
            AiAction::Retreat => prefer(BehaviorKind::Retreat, BehaviorKind::Patrol),
            AiAction::Flank => prefer(BehaviorKind::Flank, BehaviorKind::Chase),
        }
    }

    pub fn build_context(
        &self,
        brain: &EnemyBrain,
        health: &Health,
        ctx: &EnemyContext,
    ) -> AiContext {
        let position = ctx.body.position;
        AiContext {
            position,
            health: health.current,
            max_health: health.max,
            target_position: ctx.target.map(|t| t.position),
            target_velocity: ctx.target.map(|_| self.target_velocity.unwrap_or(Vec2::ZERO)),
            target_health: ctx.target.map(|t| t.health),
            distance: ctx.target.map(|t| position.distance(t.position)),
            detection_range: brain.config().detection_range,
            attack_range: brain.config().attack_range,
            time_since_attack: self.time_since_attack,
        }
    }

    /// Track the target, and on each decision tick switch the brain to the
    /// behavior of the best action. Hurt and Death are never interrupted.
    pub fn update(
        &mut self,
        dt: f32,
        brain: &mut EnemyBrain,
        health: &Health,
        ctx: &mut EnemyContext,
    ) -> Option<AiAction> {
        self.time_since_attack += dt;
        if brain.swings() != self.seen_swings {
            self.seen_swings = brain.swings();
            self.time_since_attack = 0.0;
        }

        match (ctx.target, self.last_target) {
            (Some(target), Some(last)) => {
                let frames = (dt * 60.0).max(0.06);
                self.target_velocity = Some((target.position - last) / frames);
            }
            (None, _) => self.target_velocity = None,
            (Some(_), None) => {}
        }
        self.last_target = ctx.target.map(|t| t.position);

        self.timer += dt;
        if self.timer < self.interval {
            return None;
        }
        self.timer = 0.0;

        if brain.behavior().is_locked() {
            return None;
        }

        let context = self.build_context(brain, health, ctx);
        let action = self.decisions.decide(&context);
        self.current_action = Some(action);

        let behavior = Self::behavior_for(action, brain);
        if behavior != brain.behavior() {
            debug!(
                "Utility AI picked {} -> behavior {}",
                action.name(),
                behavior.name()
            );
            brain.change_behavior(behavior, ctx);
        }
        Some(action)
    }
}
