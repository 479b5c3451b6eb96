//! Combat domain: enemy behaviors.
//!
//! An enemy runs exactly one [`BehaviorKind`] at a time. Behaviors are
//! variants of one enum with per-behavior counters kept flat on
//! [`EnemyBrain`]; Patrol/Chase/Attack/Hurt/Death are always available and
//! SmartChase/Flank/Retreat only for enemies built with a [`SmartConfig`].

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::combat::components::{DamageOutcome, Health, Invulnerable, apply_damage};
use crate::content::{EnemyTuning, SmartEnemyTuning};
use crate::movement::{Body, PhysicsBody};
use crate::sprites::AnimationController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorKind {
    Patrol,
    Chase,
    SmartChase,
    Attack,
    Flank,
    Retreat,
    Hurt,
    Death,
}

impl BehaviorKind {
    pub const ALL: [BehaviorKind; 8] = [
        BehaviorKind::Patrol,
        BehaviorKind::Chase,
        BehaviorKind::SmartChase,
        BehaviorKind::Attack,
        BehaviorKind::Flank,
        BehaviorKind::Retreat,
        BehaviorKind::Hurt,
        BehaviorKind::Death,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BehaviorKind::Patrol => "patrol",
            BehaviorKind::Chase => "chase",
            BehaviorKind::SmartChase => "smart_chase",
            BehaviorKind::Attack => "attack",
            BehaviorKind::Flank => "flank",
            BehaviorKind::Retreat => "retreat",
            BehaviorKind::Hurt => "hurt",
            BehaviorKind::Death => "death",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Behaviors only enemies with a [`SmartConfig`] can run.
    pub fn is_smart(self) -> bool {
        matches!(
            self,
            BehaviorKind::SmartChase | BehaviorKind::Flank | BehaviorKind::Retreat
        )
    }

    /// Damage reactions that decisions must not pre-empt.
    pub fn is_locked(self) -> bool {
        matches!(self, BehaviorKind::Hurt | BehaviorKind::Death)
    }

    fn animation(self) -> &'static str {
        match self {
            BehaviorKind::Patrol
            | BehaviorKind::Chase
            | BehaviorKind::SmartChase
            | BehaviorKind::Flank
            | BehaviorKind::Retreat => "walk",
            BehaviorKind::Attack => "attack",
            BehaviorKind::Hurt => "hurt",
            BehaviorKind::Death => "death",
        }
    }
}

/// What an enemy knows about its target this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub position: Vec2,
    pub health: i32,
}

/// Per-enemy parameters, resolved from tuning plus spawn overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyConfig {
    pub speed: f32,
    pub chase_multiplier: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub damage: i32,
    pub attack_cooldown: f32,
    pub attack_hitbox: (i32, i32),
    pub swing_duration: f32,
    pub patrol_pause: f32,
    pub waypoint_tolerance: f32,
    pub hurt_duration: f32,
    pub death_duration: f32,
    pub invulnerability_duration: f32,
    pub patrol_points: Vec<Vec2>,
}

impl EnemyConfig {
    /// Config from tuning, patrolling around a single point at `origin`.
    pub fn from_tuning(tuning: &EnemyTuning, origin: Vec2) -> Self {
        Self {
            speed: tuning.speed,
            chase_multiplier: tuning.chase_multiplier,
            detection_range: tuning.detection_range,
            attack_range: tuning.attack_range,
            damage: tuning.damage,
            attack_cooldown: tuning.attack_cooldown,
            attack_hitbox: tuning.attack_hitbox,
            swing_duration: tuning.swing_duration,
            patrol_pause: tuning.patrol_pause,
            waypoint_tolerance: tuning.waypoint_tolerance,
            hurt_duration: tuning.hurt_duration,
            death_duration: tuning.death_duration,
            invulnerability_duration: tuning.invulnerability_duration,
            patrol_points: vec![origin],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmartConfig {
    pub prediction_factor: f32,
    pub flank_speed_multiplier: f32,
    pub flank_distance_multiplier: f32,
    pub flank_max_time: f32,
    pub retreat_speed_multiplier: f32,
    pub retreat_safe_ratio: f32,
}

impl From<&SmartEnemyTuning> for SmartConfig {
    fn from(tuning: &SmartEnemyTuning) -> Self {
        Self {
            prediction_factor: tuning.prediction_factor,
            flank_speed_multiplier: tuning.flank_speed_multiplier,
            flank_distance_multiplier: tuning.flank_distance_multiplier,
            flank_max_time: tuning.flank_max_time,
            retreat_speed_multiplier: tuning.retreat_speed_multiplier,
            retreat_safe_ratio: tuning.retreat_safe_ratio,
        }
    }
}

/// Everything an enemy behavior may read or mutate during one update.
pub struct EnemyContext<'a> {
    pub body: &'a mut Body,
    pub physics: &'a mut PhysicsBody,
    pub animation: &'a mut AnimationController,
    pub target: Option<TargetInfo>,
    pub ground_friction: f32,
}

impl EnemyContext<'_> {
    fn distance_to_target(&self) -> Option<f32> {
        self.target
            .map(|target| self.body.position.distance(target.position))
    }
}

#[derive(Debug, Clone, Default)]
struct PatrolState {
    index: usize,
    paused: bool,
    pause_timer: f32,
}

#[derive(Debug, Clone, Default)]
struct SwingState {
    cooldown: f32,
    hitbox: Option<IRect>,
    hitbox_timer: f32,
    swings: u32,
}

#[derive(Debug, Clone, Default)]
struct PredictionState {
    last_target: Option<Vec2>,
    /// Pixels per 60 Hz frame.
    target_velocity: Vec2,
}

#[derive(Debug, Clone)]
struct FlankState {
    direction: f32,
    timer: f32,
}

#[derive(Component, Debug, Clone)]
pub struct EnemyBrain {
    config: EnemyConfig,
    smart: Option<SmartConfig>,
    behavior: BehaviorKind,
    patrol: PatrolState,
    swing: SwingState,
    prediction: PredictionState,
    flank: FlankState,
    stun_timer: f32,
    death_timer: f32,
    ready_for_removal: bool,
    rng: ChaCha8Rng,
}

impl EnemyBrain {
    pub fn new(config: EnemyConfig) -> Self {
        Self {
            config,
            smart: None,
            behavior: BehaviorKind::Patrol,
            patrol: PatrolState::default(),
            swing: SwingState::default(),
            prediction: PredictionState::default(),
            flank: FlankState {
                direction: 1.0,
                timer: 0.0,
            },
            stun_timer: 0.0,
            death_timer: 0.0,
            ready_for_removal: false,
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    /// Register the SmartChase, Flank and Retreat behaviors.
    pub fn with_smart(mut self, smart: SmartConfig, seed: u64) -> Self {
        self.smart = Some(smart);
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    pub fn behavior(&self) -> BehaviorKind {
        self.behavior
    }

    pub fn behavior_name(&self) -> &'static str {
        self.behavior.name()
    }

    pub fn is_smart(&self) -> bool {
        self.smart.is_some()
    }

    pub fn supports(&self, kind: BehaviorKind) -> bool {
        !kind.is_smart() || self.smart.is_some()
    }

    pub fn ready_for_removal(&self) -> bool {
        self.ready_for_removal
    }

    /// Number of swings started so far.
    pub fn swings(&self) -> u32 {
        self.swing.swings
    }

    /// Live attack hitbox, only during a swing.
    pub fn attack_hitbox(&self) -> Option<IRect> {
        if self.behavior == BehaviorKind::Attack {
            self.swing.hitbox
        } else {
            None
        }
    }

    pub fn attack_damage(&self) -> i32 {
        self.config.damage
    }

    pub fn predicted_target_velocity(&self) -> Vec2 {
        self.prediction.target_velocity
    }

    pub fn flank_direction(&self) -> f32 {
        self.flank.direction
    }

    /// Run one frame of the current behavior and take any transition it asks for.
    pub fn update(&mut self, dt: f32, ctx: &mut EnemyContext) {
        self.swing.cooldown = (self.swing.cooldown - dt).max(0.0);
        if self.swing.hitbox.is_some() {
            self.swing.hitbox_timer -= dt;
            if self.swing.hitbox_timer <= 0.0 {
                self.swing.hitbox = None;
            }
        }

        let next = match self.behavior {
            BehaviorKind::Patrol => self.update_patrol(dt, ctx),
            BehaviorKind::Chase => self.update_chase(ctx),
            BehaviorKind::SmartChase => self.update_smart_chase(dt, ctx),
            BehaviorKind::Attack => self.update_attack(ctx),
            BehaviorKind::Flank => self.update_flank(dt, ctx),
            BehaviorKind::Retreat => self.update_retreat(ctx),
            BehaviorKind::Hurt => self.update_hurt(dt, ctx),
            BehaviorKind::Death => self.update_death(dt, ctx),
        };

        if let Some(next) = next {
            self.change_behavior(next, ctx);
        }
    }

    /// Swap behaviors: exit the current one, enter the next. Re-entering the
    /// current behavior restarts it. Unregistered behaviors are ignored.
    pub fn change_behavior(&mut self, next: BehaviorKind, ctx: &mut EnemyContext) -> bool {
        if !self.supports(next) {
            warn!(
                "Behavior '{}' is not registered for this enemy, staying in {}",
                next.name(),
                self.behavior.name()
            );
            return false;
        }
        debug!("Enemy behavior: {} -> {}", self.behavior.name(), next.name());
        self.exit(ctx);
        self.behavior = next;
        self.enter(ctx);
        true
    }

    pub fn change_behavior_named(&mut self, name: &str, ctx: &mut EnemyContext) -> bool {
        match BehaviorKind::from_name(name) {
            Some(next) => self.change_behavior(next, ctx),
            None => {
                warn!(
                    "Unknown enemy behavior '{}', staying in {}",
                    name,
                    self.behavior.name()
                );
                false
            }
        }
    }

    /// Apply a hit: fatal hits start Death, others open a short
    /// invulnerability window and start Hurt. Ignored while invulnerable
    /// or already dead.
    pub fn take_damage(
        &mut self,
        amount: i32,
        health: &mut Health,
        invulnerable: &mut Invulnerable,
        ctx: &mut EnemyContext,
    ) -> DamageOutcome {
        let outcome = apply_damage(
            health,
            invulnerable,
            amount,
            self.config.invulnerability_duration,
        );
        match outcome {
            DamageOutcome::Killed => {
                self.change_behavior(BehaviorKind::Death, ctx);
            }
            DamageOutcome::Hurt => {
                self.change_behavior(BehaviorKind::Hurt, ctx);
            }
            DamageOutcome::Ignored => {}
        }
        outcome
    }

    fn enter(&mut self, ctx: &mut EnemyContext) {
        ctx.animation.play(self.behavior.animation(), true);
        match self.behavior {
            BehaviorKind::Patrol => self.patrol.paused = false,
            BehaviorKind::SmartChase => self.prediction = PredictionState::default(),
            BehaviorKind::Flank => {
                self.flank.direction = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
                self.flank.timer = 0.0;
            }
            BehaviorKind::Hurt => self.stun_timer = self.config.hurt_duration,
            BehaviorKind::Death => {
                self.death_timer = self.config.death_duration;
                ctx.physics.velocity = Vec2::ZERO;
            }
            BehaviorKind::Chase | BehaviorKind::Attack | BehaviorKind::Retreat => {}
        }
    }

    fn exit(&mut self, ctx: &mut EnemyContext) {
        if self.behavior == BehaviorKind::Attack {
            self.swing.hitbox = None;
            ctx.physics.velocity.x = 0.0;
        }
    }

    fn move_toward(&self, ctx: &mut EnemyContext, dx: f32, speed: f32) {
        ctx.physics.velocity.x = dx.signum() * speed;
        if dx == 0.0 {
            ctx.physics.velocity.x = 0.0;
        }
        ctx.body.face_toward(dx);
    }

    // -------------------------------------------------------------------------
    // Base behaviors
    // -------------------------------------------------------------------------

    fn update_patrol(&mut self, dt: f32, ctx: &mut EnemyContext) -> Option<BehaviorKind> {
        if ctx
            .distance_to_target()
            .is_some_and(|distance| distance <= self.config.detection_range)
        {
            return Some(BehaviorKind::Chase);
        }

        let count = self.config.patrol_points.len();
        if count == 0 {
            ctx.physics.velocity.x = 0.0;
            return None;
        }

        if self.patrol.paused {
            ctx.physics.velocity.x = 0.0;
            self.patrol.pause_timer -= dt;
            if self.patrol.pause_timer <= 0.0 {
                self.patrol.paused = false;
                self.patrol.index = (self.patrol.index + 1) % count;
            }
            return None;
        }

        let waypoint = self.config.patrol_points[self.patrol.index % count];
        let dx = waypoint.x - ctx.body.position.x;
        if dx.abs() < self.config.waypoint_tolerance {
            self.patrol.paused = true;
            self.patrol.pause_timer = self.config.patrol_pause;
            ctx.physics.velocity.x = 0.0;
            ctx.animation.play("idle", false);
        } else {
            self.move_toward(ctx, dx, self.config.speed);
            ctx.animation.play("walk", false);
        }
        None
    }

    fn update_chase(&mut self, ctx: &mut EnemyContext) -> Option<BehaviorKind> {
        let (Some(target), Some(distance)) = (ctx.target, ctx.distance_to_target()) else {
            return Some(BehaviorKind::Patrol);
        };
        if distance > self.config.detection_range * 1.5 {
            return Some(BehaviorKind::Patrol);
        }
        if distance <= self.config.attack_range {
            return Some(BehaviorKind::Attack);
        }

        let dx = target.position.x - ctx.body.position.x;
        self.move_toward(ctx, dx, self.config.speed * self.config.chase_multiplier);
        None
    }

    fn update_attack(&mut self, ctx: &mut EnemyContext) -> Option<BehaviorKind> {
        ctx.physics.velocity.x = 0.0;
        let (Some(target), Some(distance)) = (ctx.target, ctx.distance_to_target()) else {
            return Some(BehaviorKind::Patrol);
        };
        if distance > self.config.attack_range * 1.5 {
            return Some(BehaviorKind::Chase);
        }
        if self.swing.cooldown > 0.0 {
            return None;
        }

        ctx.body.face_toward(target.position.x - ctx.body.position.x);
        let (width, height) = self.config.attack_hitbox;
        self.swing.hitbox = Some(ctx.body.front_rect(width, height));
        self.swing.hitbox_timer = self.config.swing_duration;
        self.swing.cooldown = self.config.attack_cooldown;
        self.swing.swings += 1;
        ctx.animation.play("attack", true);
        None
    }

    fn update_hurt(&mut self, dt: f32, ctx: &mut EnemyContext) -> Option<BehaviorKind> {
        ctx.physics.apply_friction(ctx.ground_friction, dt);
        self.stun_timer -= dt;
        if self.stun_timer <= 0.0 {
            return Some(BehaviorKind::Patrol);
        }
        None
    }

    fn update_death(&mut self, dt: f32, ctx: &mut EnemyContext) -> Option<BehaviorKind> {
        ctx.physics.velocity = Vec2::ZERO;
        self.death_timer -= dt;
        if self.death_timer <= 0.0 && !self.ready_for_removal {
            debug!("Enemy death finished, ready for removal");
            self.ready_for_removal = true;
        }
        None
    }

    // -------------------------------------------------------------------------
    // Smart behaviors
    // -------------------------------------------------------------------------

    /// Steer toward where the target will be after the time it takes us to
    /// cover the current distance, scaled by the prediction factor.
    fn update_smart_chase(&mut self, dt: f32, ctx: &mut EnemyContext) -> Option<BehaviorKind> {
        let smart = self.smart.clone()?;
        let (Some(target), Some(distance)) = (ctx.target, ctx.distance_to_target()) else {
            return Some(BehaviorKind::Patrol);
        };
        if distance > self.config.detection_range * 1.5 {
            return Some(BehaviorKind::Patrol);
        }
        if distance <= self.config.attack_range {
            return Some(BehaviorKind::Attack);
        }

        if let Some(last) = self.prediction.last_target {
            let frames = (dt * 60.0).max(0.06);
            self.prediction.target_velocity = (target.position - last) / frames;
        }
        self.prediction.last_target = Some(target.position);

        let speed = self.config.speed * self.config.chase_multiplier;
        let lead_frames = distance / speed.max(1.0) * smart.prediction_factor;
        let predicted = target.position + self.prediction.target_velocity * lead_frames;

        let dx = predicted.x - ctx.body.position.x;
        if dx.abs() > self.config.waypoint_tolerance {
            self.move_toward(ctx, dx, speed);
        } else {
            ctx.physics.velocity.x = 0.0;
        }
        None
    }

    fn update_flank(&mut self, dt: f32, ctx: &mut EnemyContext) -> Option<BehaviorKind> {
        let smart = self.smart.clone()?;
        let (Some(target), Some(distance)) = (ctx.target, ctx.distance_to_target()) else {
            return Some(BehaviorKind::Patrol);
        };

        self.flank.timer += dt;
        if self.flank.timer >= smart.flank_max_time {
            return Some(BehaviorKind::Chase);
        }
        if distance <= self.config.attack_range {
            return Some(BehaviorKind::Attack);
        }

        let to_target = (target.position - ctx.body.position).normalize_or_zero();
        let side = self.flank.direction;
        let perpendicular = Vec2::new(-to_target.y * side, to_target.x * side);
        let preferred = self.config.attack_range * smart.flank_distance_multiplier;
        let heading = if distance > preferred * 1.5 {
            (perpendicular * 0.5 + to_target * 0.5).normalize_or_zero()
        } else {
            perpendicular
        };

        ctx.physics.velocity.x = heading.x * self.config.speed * smart.flank_speed_multiplier;
        ctx.body.face_toward(target.position.x - ctx.body.position.x);
        None
    }

    fn update_retreat(&mut self, ctx: &mut EnemyContext) -> Option<BehaviorKind> {
        let smart = self.smart.clone()?;
        let (Some(target), Some(distance)) = (ctx.target, ctx.distance_to_target()) else {
            return Some(BehaviorKind::Patrol);
        };
        if distance >= self.config.detection_range * smart.retreat_safe_ratio {
            return Some(BehaviorKind::Patrol);
        }

        let away = (ctx.body.position - target.position).normalize_or_zero();
        ctx.physics.velocity.x = away.x * self.config.speed * smart.retreat_speed_multiplier;
        ctx.body.face_toward(target.position.x - ctx.body.position.x);
        None
    }
}
