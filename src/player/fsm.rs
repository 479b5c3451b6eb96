//! Player domain: the player state machine.
//!
//! Each state has an enter hook, an update that may request the next state,
//! and an exit hook. A transition always runs `exit(old)` then `enter(new)`
//! before the new state's first update, which happens on the next frame.

use bevy::prelude::*;

use super::states::{ComboState, DashState, PlayerState};
use crate::combat::{DamageOutcome, Health, Invulnerable, SoundCue, apply_damage};
use crate::content::{ComboHit, PlayerTuning};
use crate::movement::{Action, Body, Facing, InputState, PhysicsBody};
use crate::sprites::AnimationController;

/// Everything a player state may read or mutate during one update.
pub struct PlayerContext<'a> {
    pub input: &'a InputState,
    pub body: &'a mut Body,
    pub physics: &'a mut PhysicsBody,
    pub invulnerable: &'a mut Invulnerable,
    pub animation: &'a mut AnimationController,
    pub ground_friction: f32,
}

#[derive(Component, Debug, Clone)]
pub struct PlayerFsm {
    tuning: PlayerTuning,
    state: PlayerState,
    dash: DashState,
    wall_side: Facing,
    combo: ComboState,
    cues: Vec<SoundCue>,
}

impl PlayerFsm {
    pub fn new(tuning: PlayerTuning) -> Self {
        Self {
            tuning,
            state: PlayerState::Idle,
            dash: DashState::default(),
            wall_side: Facing::Right,
            combo: ComboState::default(),
            cues: Vec::new(),
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    pub fn attack_number(&self) -> usize {
        self.combo.attack_number
    }

    pub fn attack_timer(&self) -> f32 {
        self.combo.timer
    }

    pub fn can_combo(&self) -> bool {
        self.combo.can_combo
    }

    pub fn is_combo_buffered(&self) -> bool {
        self.combo.buffered
    }

    /// Live attack hitbox, only while attacking.
    pub fn attack_hitbox(&self) -> Option<IRect> {
        if self.state == PlayerState::Attack {
            self.combo.hitbox
        } else {
            None
        }
    }

    pub fn attack_damage(&self) -> i32 {
        self.current_hit().map(|hit| hit.damage).unwrap_or(0)
    }

    pub fn has_hit(&self, target: Entity) -> bool {
        self.combo.hit_targets.contains(&target)
    }

    /// Record a target for the current swing. Returns false if it was
    /// already hit by this swing.
    pub fn record_hit(&mut self, target: Entity) -> bool {
        self.combo.hit_targets.insert(target)
    }

    pub fn dash_cooldown(&self) -> f32 {
        self.dash.cooldown
    }

    /// Drain the sound cues raised since the last call.
    pub fn take_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }

    /// Apply a hit. Non-fatal hits open the invulnerability window and
    /// replace the current velocity with `knockback`.
    pub fn take_damage(
        &mut self,
        amount: i32,
        knockback: Vec2,
        health: &mut Health,
        invulnerable: &mut Invulnerable,
        physics: &mut PhysicsBody,
    ) -> DamageOutcome {
        let outcome = apply_damage(
            health,
            invulnerable,
            amount,
            self.tuning.invulnerability_duration,
        );
        if outcome == DamageOutcome::Hurt {
            physics.velocity = knockback;
            self.cues.push(SoundCue::PlayerHurt);
        }
        outcome
    }

    /// Run one frame of the current state and take any transition it asks for.
    pub fn update(&mut self, dt: f32, ctx: &mut PlayerContext) {
        self.dash.cooldown = (self.dash.cooldown - dt).max(0.0);

        let next = match self.state {
            PlayerState::Idle => self.update_idle(dt, ctx),
            PlayerState::Run => self.update_run(ctx),
            PlayerState::Jump => self.update_jump(ctx),
            PlayerState::Fall => self.update_fall(ctx),
            PlayerState::WallSlide => self.update_wall_slide(ctx),
            PlayerState::WallClimb => self.update_wall_climb(ctx),
            PlayerState::Dash => self.update_dash(dt, ctx),
            PlayerState::Attack => self.update_attack(dt, ctx),
        };

        if let Some(next) = next {
            self.change_state(next, ctx);
        }
    }

    pub fn change_state(&mut self, next: PlayerState, ctx: &mut PlayerContext) {
        debug!("Player state: {} -> {}", self.state.name(), next.name());
        self.exit(ctx);
        self.state = next;
        self.enter(ctx);
    }

    /// String-keyed transition; unknown names leave the state unchanged.
    pub fn change_state_named(&mut self, name: &str, ctx: &mut PlayerContext) -> bool {
        match PlayerState::from_name(name) {
            Some(next) => {
                self.change_state(next, ctx);
                true
            }
            None => {
                warn!("Unknown player state '{}', staying in {}", name, self.state.name());
                false
            }
        }
    }

    fn enter(&mut self, ctx: &mut PlayerContext) {
        match self.state {
            PlayerState::Idle => {
                ctx.physics.velocity.x = 0.0;
                ctx.animation.play("idle", false);
            }
            PlayerState::Run => ctx.animation.play("run", false),
            PlayerState::Jump => {
                ctx.physics.velocity.y = self.tuning.jump_force;
                ctx.physics.on_ground = false;
                ctx.animation.play("jump", true);
                self.cues.push(SoundCue::Jump);
            }
            PlayerState::Fall => ctx.animation.play("fall", false),
            PlayerState::WallSlide => {
                self.wall_side = ctx.physics.wall_side().unwrap_or(ctx.body.facing);
                ctx.body.facing = self.wall_side;
                ctx.physics.velocity.y = self.tuning.wall_slide_speed;
                ctx.animation.play("wall_slide", false);
            }
            PlayerState::WallClimb => ctx.animation.play("wall_climb", false),
            PlayerState::Dash => {
                self.dash.timer = self.tuning.dash_duration;
                self.dash.direction = ctx.body.facing.sign();
                ctx.physics.velocity = Vec2::new(self.dash.direction * self.tuning.dash_speed, 0.0);
                ctx.physics.gravity_enabled = false;
                ctx.invulnerable.grant(self.tuning.dash_duration);
                ctx.animation.play("dash", true);
                self.cues.push(SoundCue::Dash);
            }
            PlayerState::Attack => {
                self.combo.attack_number = 1;
                self.begin_hit(ctx);
            }
        }
    }

    fn exit(&mut self, ctx: &mut PlayerContext) {
        match self.state {
            PlayerState::Dash => {
                ctx.physics.gravity_enabled = true;
                self.dash.cooldown = self.tuning.dash_cooldown;
            }
            PlayerState::Attack => self.combo.hitbox = None,
            _ => {}
        }
    }

    // -------------------------------------------------------------------------
    // Shared checks
    // -------------------------------------------------------------------------

    fn dash_requested(&self, ctx: &PlayerContext) -> bool {
        ctx.input.is_just_pressed(Action::Dash) && self.dash.cooldown <= 0.0
    }

    fn landing_state(ctx: &PlayerContext) -> PlayerState {
        if ctx.input.horizontal_axis() != 0.0 {
            PlayerState::Run
        } else {
            PlayerState::Idle
        }
    }

    fn air_control(&self, ctx: &mut PlayerContext) {
        let axis = ctx.input.horizontal_axis();
        if axis != 0.0 {
            ctx.physics.velocity.x = axis * self.tuning.run_speed;
            ctx.body.face_toward(axis);
        }
    }

    fn current_hit(&self) -> Option<&ComboHit> {
        self.tuning.combo.get(self.combo.attack_number.saturating_sub(1))
    }

    // -------------------------------------------------------------------------
    // State updates
    // -------------------------------------------------------------------------

    fn update_idle(&mut self, dt: f32, ctx: &mut PlayerContext) -> Option<PlayerState> {
        ctx.physics.apply_friction(ctx.ground_friction, dt);

        if self.dash_requested(ctx) {
            return Some(PlayerState::Dash);
        }
        if ctx.input.is_just_pressed(Action::Jump) && ctx.physics.on_ground {
            return Some(PlayerState::Jump);
        }
        if ctx.input.is_just_pressed(Action::Attack) {
            return Some(PlayerState::Attack);
        }
        if ctx.input.horizontal_axis() != 0.0 {
            return Some(PlayerState::Run);
        }
        if !ctx.physics.on_ground {
            return Some(PlayerState::Fall);
        }
        None
    }

    fn update_run(&mut self, ctx: &mut PlayerContext) -> Option<PlayerState> {
        let axis = ctx.input.horizontal_axis();
        ctx.physics.velocity.x = axis * self.tuning.run_speed;
        ctx.body.face_toward(axis);

        if self.dash_requested(ctx) {
            return Some(PlayerState::Dash);
        }
        if ctx.input.is_just_pressed(Action::Attack) {
            return Some(PlayerState::Attack);
        }
        if ctx.input.is_just_pressed(Action::Jump) && ctx.physics.on_ground {
            return Some(PlayerState::Jump);
        }
        if axis == 0.0 && ctx.physics.on_ground {
            return Some(PlayerState::Idle);
        }
        if !ctx.physics.on_ground {
            return Some(PlayerState::Fall);
        }
        None
    }

    fn update_jump(&mut self, ctx: &mut PlayerContext) -> Option<PlayerState> {
        self.air_control(ctx);

        if self.dash_requested(ctx) {
            return Some(PlayerState::Dash);
        }
        if ctx.input.is_just_pressed(Action::Attack) {
            return Some(PlayerState::Attack);
        }
        if ctx.physics.on_wall() {
            return Some(PlayerState::WallSlide);
        }
        if ctx.physics.velocity.y > 0.0 {
            return Some(PlayerState::Fall);
        }
        if ctx.physics.on_ground {
            return Some(PlayerState::Idle);
        }
        None
    }

    fn update_fall(&mut self, ctx: &mut PlayerContext) -> Option<PlayerState> {
        self.air_control(ctx);

        if self.dash_requested(ctx) {
            return Some(PlayerState::Dash);
        }
        if ctx.input.is_just_pressed(Action::Attack) {
            return Some(PlayerState::Attack);
        }
        if ctx.physics.on_ground {
            return Some(Self::landing_state(ctx));
        }
        if ctx.physics.on_wall() {
            return Some(PlayerState::WallSlide);
        }
        None
    }

    fn update_wall_slide(&mut self, ctx: &mut PlayerContext) -> Option<PlayerState> {
        ctx.physics.velocity.y = ctx.physics.velocity.y.min(self.tuning.wall_slide_speed);

        if self.dash_requested(ctx) {
            ctx.body.facing = self.wall_side.flipped();
            return Some(PlayerState::Dash);
        }
        if ctx.input.is_just_pressed(Action::Jump) {
            let away = self.wall_side.flipped();
            ctx.body.facing = away;
            ctx.physics.velocity.x = away.sign() * self.tuning.wall_jump_push;
            return Some(PlayerState::Jump);
        }
        if ctx.input.is_pressed(Action::Jump) {
            return Some(PlayerState::WallClimb);
        }

        let axis = ctx.input.horizontal_axis();
        if axis != 0.0 && Facing::from_direction(axis) != Some(self.wall_side) {
            ctx.physics.velocity.x = axis * self.tuning.run_speed;
            ctx.body.face_toward(axis);
            return Some(PlayerState::Fall);
        }
        if !ctx.physics.on_wall() {
            return Some(PlayerState::Fall);
        }
        if ctx.physics.on_ground {
            return Some(Self::landing_state(ctx));
        }

        // Keep pressing into the wall so contact is re-detected next frame.
        ctx.physics.velocity.x = self.wall_side.sign() * self.tuning.wall_stick_speed;
        None
    }

    fn update_wall_climb(&mut self, ctx: &mut PlayerContext) -> Option<PlayerState> {
        ctx.physics.velocity.y = -self.tuning.wall_slide_speed * self.tuning.wall_climb_multiplier;
        ctx.physics.velocity.x = self.wall_side.sign() * self.tuning.wall_stick_speed;

        if self.dash_requested(ctx) {
            ctx.body.facing = self.wall_side.flipped();
            return Some(PlayerState::Dash);
        }
        if !ctx.input.is_pressed(Action::Jump) {
            return Some(PlayerState::WallSlide);
        }
        if !ctx.physics.on_wall() {
            return Some(PlayerState::Fall);
        }
        if ctx.physics.on_ground {
            return Some(PlayerState::Idle);
        }
        None
    }

    fn update_dash(&mut self, dt: f32, ctx: &mut PlayerContext) -> Option<PlayerState> {
        self.dash.timer -= dt;
        ctx.physics.velocity = Vec2::new(self.dash.direction * self.tuning.dash_speed, 0.0);

        if self.dash.timer > 0.0 {
            return None;
        }
        if ctx.physics.on_ground {
            Some(Self::landing_state(ctx))
        } else {
            Some(PlayerState::Fall)
        }
    }

    fn update_attack(&mut self, dt: f32, ctx: &mut PlayerContext) -> Option<PlayerState> {
        let Some(duration) = self.current_hit().map(|hit| hit.duration) else {
            return Some(PlayerState::Idle);
        };

        self.combo.timer += dt;
        ctx.physics.apply_friction(ctx.ground_friction, dt);
        self.combo.hitbox = Some(self.hitbox_for(ctx.body));

        if self.combo.timer >= duration * self.tuning.combo_window {
            self.combo.can_combo = true;
        }
        if self.combo.can_combo && ctx.input.is_just_pressed(Action::Attack) {
            self.combo.buffered = true;
        }

        if self.combo.timer < duration {
            return None;
        }
        if self.combo.buffered && self.combo.attack_number < self.tuning.combo.len() {
            self.combo.attack_number += 1;
            self.begin_hit(ctx);
            return None;
        }

        self.combo.attack_number = 1;
        if ctx.physics.on_ground {
            Some(PlayerState::Idle)
        } else {
            Some(PlayerState::Fall)
        }
    }

    /// Start the current combo hit: fresh timer, fresh hit set, new hitbox.
    fn begin_hit(&mut self, ctx: &mut PlayerContext) {
        self.combo.timer = 0.0;
        self.combo.can_combo = false;
        self.combo.buffered = false;
        self.combo.hit_targets.clear();
        self.combo.hitbox = Some(self.hitbox_for(ctx.body));
        ctx.physics.velocity.x *= self.tuning.attack_slowdown;

        if let Some(hit) = self.current_hit() {
            ctx.animation.play(&hit.animation, true);
        }
        self.cues.push(SoundCue::AttackSwing);
    }

    fn hitbox_for(&self, body: &Body) -> IRect {
        let (width, height) = self.tuning.attack_hitbox;
        body.front_rect(width, height)
    }
}
