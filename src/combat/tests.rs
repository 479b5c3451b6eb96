//! Combat domain: tests for enemy behaviors, utility decisions, boss phases,
//! and hit resolution.

use bevy::prelude::*;

use super::ai::curves;
use super::systems;
use super::*;
use crate::content::{EnemyTuning, GameplayTuning, SmartEnemyTuning};
use crate::movement::{Body, Facing, InputState, PhysicsBody};
use crate::player::{PlayerBundle, PlayerContext, PlayerState};
use crate::sprites::{AnimationController, ClipLibrary};

const FRAME: f32 = 1.0 / 60.0;

struct EnemyRig {
    brain: EnemyBrain,
    body: Body,
    physics: PhysicsBody,
    animation: AnimationController,
    health: Health,
    invulnerable: Invulnerable,
}

impl EnemyRig {
    fn new(config: EnemyConfig) -> Self {
        let mut physics = PhysicsBody::default();
        physics.on_ground = true;
        Self {
            brain: EnemyBrain::new(config),
            body: Body::new(Vec2::ZERO, IVec2::new(32, 32)),
            physics,
            animation: AnimationController::new(ClipLibrary::enemy(), "idle"),
            health: Health::new(30),
            invulnerable: Invulnerable::default(),
        }
    }

    fn basic() -> Self {
        Self::new(EnemyConfig::from_tuning(&EnemyTuning::default(), Vec2::ZERO))
    }

    fn smart() -> Self {
        let mut rig = Self::basic();
        rig.brain = rig
            .brain
            .with_smart(SmartConfig::from(&SmartEnemyTuning::default()), 7);
        rig
    }

    /// The brain plus a context over the rest of the rig.
    fn split(&mut self, target: Option<Vec2>) -> (&mut EnemyBrain, EnemyContext<'_>) {
        let ctx = EnemyContext {
            body: &mut self.body,
            physics: &mut self.physics,
            animation: &mut self.animation,
            target: target.map(|position| TargetInfo {
                position,
                health: 100,
            }),
            ground_friction: 0.2,
        };
        (&mut self.brain, ctx)
    }

    fn step(&mut self, target: Option<Vec2>, dt: f32) {
        let (brain, mut ctx) = self.split(target);
        brain.update(dt, &mut ctx);
    }

    fn force(&mut self, behavior: BehaviorKind, target: Option<Vec2>) -> bool {
        let (brain, mut ctx) = self.split(target);
        brain.change_behavior(behavior, &mut ctx)
    }

    fn hit(&mut self, amount: i32) -> DamageOutcome {
        let mut ctx = EnemyContext {
            body: &mut self.body,
            physics: &mut self.physics,
            animation: &mut self.animation,
            target: None,
            ground_friction: 0.2,
        };
        self.brain
            .take_damage(amount, &mut self.health, &mut self.invulnerable, &mut ctx)
    }

    fn behavior(&self) -> BehaviorKind {
        self.brain.behavior()
    }
}

// -----------------------------------------------------------------------------
// Enemy behaviors
// -----------------------------------------------------------------------------

#[test]
fn test_enemy_lifecycle_chase_attack_death() {
    let mut config = EnemyConfig::from_tuning(&EnemyTuning::default(), Vec2::ZERO);
    config.detection_range = 100.0;
    let mut rig = EnemyRig::new(config);
    assert_eq!(rig.brain.behavior_name(), "patrol");

    rig.step(Some(Vec2::new(50.0, 0.0)), FRAME);
    assert_eq!(rig.brain.behavior_name(), "chase");

    rig.step(Some(Vec2::new(20.0, 0.0)), FRAME);
    assert_eq!(rig.brain.behavior_name(), "attack");

    assert_eq!(rig.hit(30), DamageOutcome::Killed);
    assert_eq!(rig.brain.behavior_name(), "death");
    assert_eq!(rig.health.current, 0);

    rig.step(None, 0.25);
    assert!(!rig.brain.ready_for_removal());
    rig.step(None, 0.25);
    assert!(rig.brain.ready_for_removal());
    assert_eq!(rig.physics.velocity, Vec2::ZERO);
}

#[test]
fn test_patrol_pauses_then_walks_to_next_waypoint() {
    let mut config = EnemyConfig::from_tuning(&EnemyTuning::default(), Vec2::ZERO);
    config.patrol_points.push(Vec2::new(100.0, 0.0));
    let mut rig = EnemyRig::new(config);

    rig.step(None, 0.1);
    assert_eq!(rig.physics.velocity.x, 0.0);
    assert_eq!(rig.animation.current(), "idle");

    for _ in 0..4 {
        rig.step(None, 0.25);
    }
    rig.step(None, 0.1);
    assert_eq!(rig.physics.velocity.x, 2.0);
    assert_eq!(rig.body.facing, Facing::Right);
    assert_eq!(rig.animation.current(), "walk");
}

#[test]
fn test_patrol_without_waypoints_stands_still() {
    let mut config = EnemyConfig::from_tuning(&EnemyTuning::default(), Vec2::ZERO);
    config.patrol_points.clear();
    let mut rig = EnemyRig::new(config);
    rig.physics.velocity.x = 3.0;
    rig.step(None, FRAME);
    assert_eq!(rig.physics.velocity.x, 0.0);
    assert_eq!(rig.behavior(), BehaviorKind::Patrol);
}

#[test]
fn test_chase_keeps_target_until_hysteresis_range() {
    let mut rig = EnemyRig::basic();
    rig.force(BehaviorKind::Chase, None);

    rig.step(Some(Vec2::new(250.0, 0.0)), FRAME);
    assert_eq!(rig.behavior(), BehaviorKind::Chase);
    assert_eq!(rig.physics.velocity.x, 3.0);

    rig.step(Some(Vec2::new(-250.0, 0.0)), FRAME);
    assert_eq!(rig.physics.velocity.x, -3.0);
    assert_eq!(rig.body.facing, Facing::Left);

    rig.step(Some(Vec2::new(310.0, 0.0)), FRAME);
    assert_eq!(rig.behavior(), BehaviorKind::Patrol);
}

#[test]
fn test_chase_without_target_returns_to_patrol() {
    let mut rig = EnemyRig::basic();
    rig.force(BehaviorKind::Chase, None);
    rig.step(None, FRAME);
    assert_eq!(rig.behavior(), BehaviorKind::Patrol);
}

#[test]
fn test_attack_swings_with_cooldown_and_timed_hitbox() {
    let mut rig = EnemyRig::basic();
    let target = Some(Vec2::new(40.0, 0.0));
    rig.force(BehaviorKind::Attack, target);

    rig.step(target, FRAME);
    assert_eq!(rig.brain.swings(), 1);
    let hitbox = rig.brain.attack_hitbox().expect("swing hitbox");
    assert_eq!(hitbox.min.x, 32);
    assert_eq!(hitbox.width(), 40);
    assert_eq!(rig.brain.attack_damage(), 10);

    rig.step(target, 0.25);
    assert!(rig.brain.attack_hitbox().is_none());
    assert_eq!(rig.brain.swings(), 1);

    rig.step(target, 1.0);
    assert_eq!(rig.brain.swings(), 2);
}

#[test]
fn test_attack_faces_target_before_swinging() {
    let mut rig = EnemyRig::basic();
    let target = Some(Vec2::new(-30.0, 0.0));
    rig.force(BehaviorKind::Attack, target);
    rig.step(target, FRAME);
    assert_eq!(rig.body.facing, Facing::Left);
    assert_eq!(rig.brain.attack_hitbox().map(|rect| rect.max.x), Some(0));
}

#[test]
fn test_attack_returns_to_chase_when_target_escapes() {
    let mut rig = EnemyRig::basic();
    rig.force(BehaviorKind::Attack, None);
    rig.physics.velocity.x = 2.0;
    rig.step(Some(Vec2::new(100.0, 0.0)), FRAME);
    assert_eq!(rig.behavior(), BehaviorKind::Chase);
    assert!(rig.brain.attack_hitbox().is_none());
}

#[test]
fn test_hurt_stuns_then_patrols() {
    let mut rig = EnemyRig::basic();
    assert_eq!(rig.hit(10), DamageOutcome::Hurt);
    assert_eq!(rig.behavior(), BehaviorKind::Hurt);
    assert_eq!(rig.animation.current(), "hurt");

    rig.step(None, 0.2);
    assert_eq!(rig.behavior(), BehaviorKind::Hurt);
    rig.step(None, 0.15);
    assert_eq!(rig.behavior(), BehaviorKind::Patrol);
}

#[test]
fn test_take_damage_respects_invulnerability_window() {
    let mut rig = EnemyRig::basic();
    assert_eq!(rig.hit(10), DamageOutcome::Hurt);
    assert!(rig.invulnerable.is_invulnerable());
    assert_eq!(rig.invulnerable.timer, 0.5);

    assert_eq!(rig.hit(10), DamageOutcome::Ignored);
    assert_eq!(rig.health.current, 20);

    rig.invulnerable.tick(0.5);
    assert_eq!(rig.hit(10), DamageOutcome::Hurt);
    assert_eq!(rig.health.current, 10);
}

#[test]
fn test_dead_enemy_ignores_damage() {
    let mut rig = EnemyRig::basic();
    assert_eq!(rig.hit(100), DamageOutcome::Killed);
    assert_eq!(rig.health.current, 0);
    assert_eq!(rig.hit(10), DamageOutcome::Ignored);
    assert_eq!(rig.behavior(), BehaviorKind::Death);
}

#[test]
fn test_reentering_hurt_restarts_stun() {
    let mut rig = EnemyRig::basic();
    rig.force(BehaviorKind::Hurt, None);
    rig.step(None, 0.25);
    rig.force(BehaviorKind::Hurt, None);
    rig.step(None, 0.25);
    assert_eq!(rig.behavior(), BehaviorKind::Hurt);
}

#[test]
fn test_unknown_or_unregistered_behavior_is_ignored() {
    let mut rig = EnemyRig::basic();
    let (brain, mut ctx) = rig.split(None);
    assert!(!brain.change_behavior_named("dance", &mut ctx));
    assert!(!brain.change_behavior_named("flank", &mut ctx));
    assert_eq!(brain.behavior(), BehaviorKind::Patrol);
    assert!(brain.change_behavior_named("chase", &mut ctx));
    assert_eq!(brain.behavior(), BehaviorKind::Chase);
    assert!(!brain.supports(BehaviorKind::Retreat));
}

#[test]
fn test_behavior_names_round_trip() {
    for kind in BehaviorKind::ALL {
        assert_eq!(BehaviorKind::from_name(kind.name()), Some(kind));
    }
    assert_eq!(BehaviorKind::from_name("jump"), None);
}

// -----------------------------------------------------------------------------
// Smart behaviors
// -----------------------------------------------------------------------------

#[test]
fn test_smart_chase_tracks_target_velocity() {
    let mut rig = EnemyRig::smart();
    assert!(rig.force(BehaviorKind::SmartChase, None));

    rig.step(Some(Vec2::new(150.0, 0.0)), FRAME);
    rig.step(Some(Vec2::new(153.0, 0.0)), FRAME);
    let velocity = rig.brain.predicted_target_velocity();
    assert!((velocity.x - 3.0).abs() < 1e-3);
    assert_eq!(rig.physics.velocity.x, 3.0);
}

#[test]
fn test_smart_chase_leads_a_target_crossing_in_front() {
    let mut rig = EnemyRig::smart();
    rig.force(BehaviorKind::SmartChase, None);

    rig.step(Some(Vec2::new(-150.0, 0.0)), FRAME);
    assert!(rig.physics.velocity.x < 0.0);

    // Still on the left, but moving right fast enough that the lead point
    // is on the right.
    rig.step(Some(Vec2::new(-140.0, 0.0)), FRAME);
    assert!(rig.physics.velocity.x > 0.0);
    assert_eq!(rig.body.facing, Facing::Right);
}

#[test]
fn test_smart_chase_attacks_in_range() {
    let mut rig = EnemyRig::smart();
    rig.force(BehaviorKind::SmartChase, None);
    rig.step(Some(Vec2::new(30.0, 0.0)), FRAME);
    assert_eq!(rig.behavior(), BehaviorKind::Attack);
}

#[test]
fn test_flank_gives_up_after_max_time() {
    let mut rig = EnemyRig::smart();
    let target = Some(Vec2::new(150.0, 0.0));
    rig.force(BehaviorKind::Flank, target);
    let side = rig.brain.flank_direction();
    assert!(side == 1.0 || side == -1.0);

    for _ in 0..3 {
        rig.step(target, 0.5);
        assert_eq!(rig.behavior(), BehaviorKind::Flank);
    }
    rig.step(target, 0.5);
    assert_eq!(rig.behavior(), BehaviorKind::Chase);
}

#[test]
fn test_retreat_moves_away_until_safe() {
    let mut rig = EnemyRig::smart();
    rig.force(BehaviorKind::Retreat, None);

    rig.step(Some(Vec2::new(50.0, 0.0)), FRAME);
    assert!((rig.physics.velocity.x + 2.6).abs() < 1e-5);
    assert_eq!(rig.body.facing, Facing::Right);

    rig.step(Some(Vec2::new(200.0, 0.0)), FRAME);
    assert_eq!(rig.behavior(), BehaviorKind::Patrol);
}

// -----------------------------------------------------------------------------
// Utility decisions
// -----------------------------------------------------------------------------

fn ai_context(distance: Option<f32>, health: i32) -> AiContext {
    AiContext {
        position: Vec2::ZERO,
        health,
        max_health: 30,
        target_position: distance.map(|d| Vec2::new(d, 0.0)),
        target_velocity: distance.map(|_| Vec2::ZERO),
        target_health: distance.map(|_| 100),
        distance,
        detection_range: 200.0,
        attack_range: 50.0,
        time_since_attack: 1.0,
    }
}

#[test]
fn test_response_curves() {
    assert_eq!(curves::linear(5.0, 0.0, 10.0), 0.5);
    assert_eq!(curves::linear(-1.0, 0.0, 10.0), 0.0);
    assert_eq!(curves::linear(20.0, 0.0, 10.0), 1.0);
    assert_eq!(curves::linear(1.0, 5.0, 5.0), 0.0);
    assert_eq!(curves::inverse_linear(2.5, 0.0, 10.0), 0.75);
    assert_eq!(curves::exponential(0.5, 2.0), 0.25);
    assert_eq!(curves::logistic(0.5, 10.0, 0.5), 0.5);
    assert!(curves::logistic(1.0, 10.0, 0.5) > 0.99);
}

#[test]
fn test_decide_without_target_patrols() {
    let mut decisions = DecisionMaker::new(0.5, 0.0, 10, 1);
    assert_eq!(decisions.decide(&ai_context(None, 30)), AiAction::Patrol);
}

#[test]
fn test_decide_chases_then_attacks() {
    let mut decisions = DecisionMaker::new(0.5, 0.0, 10, 1);
    assert_eq!(decisions.decide(&ai_context(Some(150.0), 30)), AiAction::Chase);
    assert_eq!(decisions.decide(&ai_context(Some(30.0), 30)), AiAction::Attack);
}

#[test]
fn test_attack_score_recovers_after_swing() {
    let decisions = DecisionMaker::new(0.5, 0.0, 10, 1);
    let mut ctx = ai_context(Some(30.0), 30);
    ctx.time_since_attack = 0.0;
    let fresh = decisions.score(AiAction::Attack, &ctx);
    ctx.time_since_attack = 0.25;
    let halfway = decisions.score(AiAction::Attack, &ctx);
    ctx.time_since_attack = 0.5;
    let recovered = decisions.score(AiAction::Attack, &ctx);
    assert!((fresh - 0.6).abs() < 1e-5);
    // Recovery ramps in quadratically.
    assert!((halfway - 0.675).abs() < 1e-5);
    assert!((recovered - 0.9).abs() < 1e-5);
}

#[test]
fn test_chase_drive_follows_aggression_curve() {
    let ctx = ai_context(Some(150.0), 30);
    let base = 0.7 + 0.2 / 3.0;
    let calm = DecisionMaker::new(0.0, 0.0, 10, 1).score(AiAction::Chase, &ctx);
    let balanced = DecisionMaker::new(0.5, 0.0, 10, 1).score(AiAction::Chase, &ctx);
    let eager = DecisionMaker::new(1.0, 0.0, 10, 1).score(AiAction::Chase, &ctx);

    assert!((balanced - (base + 0.05)).abs() < 1e-5);
    assert!(calm > base && calm < base + 0.001);
    assert!(eager > base + 0.099 && eager < base + 0.1);
}

#[test]
fn test_low_health_retreats() {
    let mut decisions = DecisionMaker::new(0.0, 0.0, 10, 1);
    assert_eq!(decisions.decide(&ai_context(Some(150.0), 6)), AiAction::Retreat);
}

#[test]
fn test_predict_scores_moving_target() {
    let decisions = DecisionMaker::new(0.5, 0.0, 10, 1);
    let mut ctx = ai_context(Some(150.0), 30);
    assert!((decisions.score(AiAction::Predict, &ctx) - 0.1).abs() < 1e-6);
    ctx.target_velocity = Some(Vec2::new(4.0, 0.0));
    assert!((decisions.score(AiAction::Predict, &ctx) - 0.8).abs() < 1e-5);
}

#[test]
fn test_ties_go_to_first_declared_action() {
    // Patrol and Retreat both score 0.9 here.
    let mut decisions = DecisionMaker::new(0.0, 0.0, 10, 1);
    let ctx = ai_context(None, 6);
    assert_eq!(decisions.score(AiAction::Retreat, &ctx), 0.9);
    assert_eq!(decisions.decide(&ctx), AiAction::Patrol);
}

#[test]
fn test_history_is_capped() {
    let mut decisions = DecisionMaker::new(0.5, 0.0, 3, 1);
    for _ in 0..5 {
        decisions.decide(&ai_context(None, 30));
    }
    assert_eq!(decisions.history().count(), 3);
}

#[test]
fn test_noisy_decisions_are_reproducible_per_seed() {
    let ctx = ai_context(Some(100.0), 30);
    let mut a = DecisionMaker::new(0.5, 1.0, 10, 99);
    let mut b = DecisionMaker::new(0.5, 1.0, 10, 99);
    for _ in 0..20 {
        assert_eq!(a.decide(&ctx), b.decide(&ctx));
    }
    assert_eq!(DecisionMaker::new(0.5, 3.0, 10, 0).randomness(), 1.0);
}

#[test]
fn test_utility_ai_decides_immediately_and_maps_to_smart_chase() {
    let mut rig = EnemyRig::smart();
    let mut ai = UtilityAi::from_tuning(&SmartEnemyTuning::default(), 3);
    let health = rig.health.clone();
    let target = Some(Vec2::new(150.0, 0.0));

    let (brain, mut ctx) = rig.split(target);
    let action = ai.update(FRAME, brain, &health, &mut ctx);
    assert!(matches!(action, Some(AiAction::Chase | AiAction::Predict)));
    assert_eq!(brain.behavior(), BehaviorKind::SmartChase);

    // Not due again until the interval elapses.
    assert_eq!(ai.update(FRAME, brain, &health, &mut ctx), None);
}

#[test]
fn test_utility_ai_never_interrupts_hurt() {
    let mut rig = EnemyRig::smart();
    rig.hit(5);
    let mut ai = UtilityAi::from_tuning(&SmartEnemyTuning::default(), 3);
    let health = rig.health.clone();

    let (brain, mut ctx) = rig.split(Some(Vec2::new(30.0, 0.0)));
    let action = ai.update(FRAME, brain, &health, &mut ctx);
    assert_eq!(action, None);
    assert_eq!(brain.behavior(), BehaviorKind::Hurt);
}

#[test]
fn test_action_mapping_falls_back_for_basic_enemies() {
    let basic = EnemyRig::basic();
    let smart = EnemyRig::smart();
    assert_eq!(
        UtilityAi::behavior_for(AiAction::Predict, &basic.brain),
        BehaviorKind::Chase
    );
    assert_eq!(
        UtilityAi::behavior_for(AiAction::Predict, &smart.brain),
        BehaviorKind::SmartChase
    );
    assert_eq!(
        UtilityAi::behavior_for(AiAction::Retreat, &basic.brain),
        BehaviorKind::Patrol
    );
    assert_eq!(
        UtilityAi::behavior_for(AiAction::Flank, &basic.brain),
        BehaviorKind::Chase
    );
    assert_eq!(
        UtilityAi::behavior_for(AiAction::Idle, &smart.brain),
        BehaviorKind::Patrol
    );
}

// -----------------------------------------------------------------------------
// Boss
// -----------------------------------------------------------------------------

struct BossRig {
    brain: BossBrain,
    body: Body,
    physics: PhysicsBody,
    animation: AnimationController,
}

impl BossRig {
    fn new() -> Self {
        Self {
            brain: BossBrain::new(Default::default(), 11),
            body: Body::new(Vec2::ZERO, IVec2::new(64, 96)),
            physics: PhysicsBody::default(),
            animation: AnimationController::new(ClipLibrary::boss(), "idle"),
        }
    }

    fn step(&mut self, target: Option<Vec2>, health_ratio: f32, dt: f32) -> BossUpdate {
        let mut ctx = BossContext {
            body: &mut self.body,
            physics: &mut self.physics,
            animation: &mut self.animation,
            target: target.map(|position| TargetInfo {
                position,
                health: 100,
            }),
            health_ratio,
        };
        self.brain.update(dt, &mut ctx)
    }

    fn force(&mut self, behavior: BossBehavior, target: Option<Vec2>) {
        let mut ctx = BossContext {
            body: &mut self.body,
            physics: &mut self.physics,
            animation: &mut self.animation,
            target: target.map(|position| TargetInfo {
                position,
                health: 100,
            }),
            health_ratio: 1.0,
        };
        self.brain.change_behavior(behavior, &mut ctx);
    }
}

#[test]
fn test_boss_phase_thresholds() {
    let rig = BossRig::new();
    assert_eq!(rig.brain.phase_for(0.67), 1);
    assert_eq!(rig.brain.phase_for(0.50), 2);
    assert_eq!(rig.brain.phase_for(0.20), 3);
}

#[test]
fn test_boss_phases_unlock_supersets() {
    let mut brain = BossRig::new().brain;
    let one = brain.unlocked_attacks();
    brain.update_phase(0.5);
    let two = brain.unlocked_attacks();
    brain.update_phase(0.2);
    let three = brain.unlocked_attacks();

    assert!(one.iter().all(|attack| two.contains(attack)));
    assert!(two.iter().all(|attack| three.contains(attack)));
    assert!(two.len() > one.len() && three.len() > two.len());
}

#[test]
fn test_boss_speed_boost_applies_once_and_never_drops() {
    let mut brain = BossRig::new().brain;
    assert_eq!(brain.update_phase(0.5), Some(2));
    assert_eq!(brain.speed(), 3.0);
    assert_eq!(brain.update_phase(0.2), Some(3));
    assert_eq!(brain.speed(), 4.5);
    assert_eq!(brain.update_phase(0.1), None);
    assert_eq!(brain.speed(), 4.5);

    brain.update_phase(0.5);
    assert_eq!(brain.speed(), 4.5);
    brain.update_phase(0.2);
    assert_eq!(brain.speed(), 4.5);
}

#[test]
fn test_boss_phase_reported_before_behavior() {
    let mut rig = BossRig::new();
    let report = rig.step(None, 0.5, FRAME);
    assert_eq!(report.phase_changed, Some(2));
    assert_eq!(rig.brain.phase(), 2);
}

#[test]
fn test_boss_attack_choice_respects_range_and_phase() {
    let mut brain = BossRig::new().brain;
    assert_eq!(brain.choose_attack(50.0), BossBehavior::Melee);
    assert_eq!(brain.choose_attack(200.0), BossBehavior::Melee);
    assert_eq!(brain.choose_attack(1000.0), BossBehavior::Melee);

    brain.update_phase(0.5);
    for _ in 0..20 {
        assert!(matches!(
            brain.choose_attack(200.0),
            BossBehavior::Ranged | BossBehavior::Melee
        ));
        assert!(matches!(
            brain.choose_attack(400.0),
            BossBehavior::Ranged | BossBehavior::Melee
        ));
    }

    brain.update_phase(0.2);
    let close: Vec<BossBehavior> = (0..60).map(|_| brain.choose_attack(120.0)).collect();
    assert!(close.contains(&BossBehavior::Area));
    for _ in 0..20 {
        assert_ne!(brain.choose_attack(400.0), BossBehavior::Area);
    }
}

#[test]
fn test_boss_melee_window() {
    let mut rig = BossRig::new();
    let target = Some(Vec2::new(60.0, 0.0));
    rig.force(BossBehavior::Melee, target);
    assert_eq!(rig.brain.cooldown(), 1.5);

    rig.step(target, 1.0, 0.05);
    assert!(rig.brain.attack_hitbox(&rig.body).is_none());

    rig.step(target, 1.0, 0.1);
    let hitbox = rig.brain.attack_hitbox(&rig.body).expect("melee hitbox");
    assert_eq!(hitbox.min.x, 64);
    assert_eq!(hitbox.width(), 80);
    assert_eq!(rig.brain.attack_damage(), 20);

    rig.step(target, 1.0, 0.3);
    assert!(rig.brain.attack_hitbox(&rig.body).is_none());
    assert_eq!(rig.brain.behavior(), BossBehavior::Melee);

    rig.step(target, 1.0, 0.1);
    assert_eq!(rig.brain.behavior(), BossBehavior::Idle);
}

#[test]
fn test_boss_ranged_releases_one_projectile() {
    let mut rig = BossRig::new();
    let target = Some(Vec2::new(250.0, 0.0));
    rig.force(BossBehavior::Ranged, target);

    assert_eq!(rig.step(target, 1.0, 0.2).projectile, None);
    let (origin, direction) = rig
        .step(target, 1.0, 0.15)
        .projectile
        .expect("projectile released");
    assert_eq!(origin, rig.body.center());
    assert_eq!(direction, Vec2::X);
    assert_eq!(rig.step(target, 1.0, 0.1).projectile, None);
}

#[test]
fn test_boss_area_uses_longer_cooldown() {
    let mut rig = BossRig::new();
    rig.force(BossBehavior::Area, None);
    assert_eq!(rig.brain.cooldown(), 2.25);
    rig.step(None, 1.0, 0.5);
    let hitbox = rig.brain.attack_hitbox(&rig.body).expect("area hitbox");
    assert_eq!(hitbox.width(), 300);
    assert_eq!(hitbox.height(), 300);
}

#[test]
fn test_boss_idle_waits_for_cooldown() {
    let mut rig = BossRig::new();
    let target = Some(Vec2::new(50.0, 0.0));
    rig.force(BossBehavior::Melee, target);
    rig.step(target, 1.0, 0.55);
    assert_eq!(rig.brain.behavior(), BossBehavior::Idle);

    rig.step(target, 1.0, 0.5);
    assert_eq!(rig.brain.behavior(), BossBehavior::Idle);

    rig.step(target, 1.0, 0.5);
    assert_eq!(rig.brain.behavior(), BossBehavior::Melee);
}

#[test]
fn test_boss_idle_holds_still_then_attacks_distant_target() {
    let mut rig = BossRig::new();
    let target = Some(Vec2::new(-200.0, 0.0));
    rig.physics.velocity.x = 5.0;

    rig.step(target, 1.0, 1.0);
    assert_eq!(rig.brain.behavior(), BossBehavior::Idle);
    assert_eq!(rig.physics.velocity.x, 0.0);
    assert_eq!(rig.body.facing, Facing::Left);
    assert_eq!(rig.animation.current(), "idle");

    rig.step(target, 1.0, 1.0);
    assert_eq!(rig.brain.behavior(), BossBehavior::Melee);
}

#[test]
fn test_boss_damage_has_short_invulnerability() {
    let mut brain = BossRig::new().brain;
    let mut health = Health::new(500);
    let mut invulnerable = Invulnerable::default();
    assert_eq!(
        brain.take_damage(100, &mut health, &mut invulnerable),
        DamageOutcome::Hurt
    );
    assert_eq!(invulnerable.timer, 0.2);
    assert_eq!(
        brain.take_damage(100, &mut health, &mut invulnerable),
        DamageOutcome::Ignored
    );
    assert_eq!(health.current, 400);
}

// -----------------------------------------------------------------------------
// Spawning
// -----------------------------------------------------------------------------

#[test]
fn test_spawn_point_counters() {
    let mut point = SpawnPoint::new(Vec2::ZERO, "enemy");
    point.remaining = 2;
    assert!(point.consume());
    assert!(point.consume());
    assert!(!point.can_spawn());
    assert!(!point.consume());

    let mut unlimited = SpawnPoint::new(Vec2::ZERO, "enemy");
    unlimited.remaining = -1;
    for _ in 0..10 {
        assert!(unlimited.consume());
    }
    assert_eq!(unlimited.remaining, -1);

    unlimited.enabled = false;
    assert!(!unlimited.can_spawn());
}

#[test]
fn test_spawn_point_overrides() {
    let point = SpawnPoint::new(Vec2::new(10.0, 0.0), "enemy")
        .with_property("speed", 4.0)
        .with_property("damage", 12.0)
        .with_property("patrol_span", 90.0);
    let config = point.enemy_config(&EnemyTuning::default());
    assert_eq!(config.speed, 4.0);
    assert_eq!(config.damage, 12);
    assert_eq!(
        config.patrol_points,
        vec![Vec2::new(10.0, 0.0), Vec2::new(100.0, 0.0)]
    );
}

#[test]
fn test_entity_kind_tags() {
    assert_eq!(EntityKind::from_tag("smart_enemy"), Some(EntityKind::SmartEnemy));
    assert_eq!(EntityKind::from_tag("boss"), Some(EntityKind::Boss));
    assert_eq!(EntityKind::from_tag("dragon"), None);
}

#[test]
fn test_spawn_from_point_builds_entities() {
    let mut world = World::new();
    let tuning = GameplayTuning::default();

    let mut smart = SpawnPoint::new(Vec2::ZERO, "smart_enemy").with_property("health", 45.0);
    let mut boss = SpawnPoint::new(Vec2::new(300.0, 0.0), "boss");
    let mut unknown = SpawnPoint::new(Vec2::ZERO, "dragon");

    let (smart_id, boss_id, unknown_id) = {
        let mut commands = world.commands();
        (
            spawn_from_point(&mut commands, &mut smart, &tuning),
            spawn_from_point(&mut commands, &mut boss, &tuning),
            spawn_from_point(&mut commands, &mut unknown, &tuning),
        )
    };
    world.flush();

    let smart_id = smart_id.expect("smart enemy spawned");
    assert!(world.get::<UtilityAi>(smart_id).is_some());
    assert!(world.get::<EnemyBrain>(smart_id).is_some_and(|brain| brain.is_smart()));
    assert_eq!(world.get::<Health>(smart_id).map(|h| h.max), Some(45));

    let boss_id = boss_id.expect("boss spawned");
    assert_eq!(world.get::<BossBrain>(boss_id).map(|b| b.phase()), Some(1));

    assert!(unknown_id.is_none());
    assert_eq!(smart.remaining, 0);
    assert_eq!(unknown.remaining, 1);

    let mut again = smart.clone();
    let mut commands = world.commands();
    assert!(spawn_from_point(&mut commands, &mut again, &tuning).is_none());
}

// -----------------------------------------------------------------------------
// Hit resolution
// -----------------------------------------------------------------------------

fn combat_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .init_resource::<GameplayTuning>()
        .add_message::<DamageEvent>()
        .add_message::<DeathEvent>()
        .add_message::<SoundCueEvent>()
        .add_systems(Update, systems::resolve_combat);
    app
}

fn attacking_player(tuning: &GameplayTuning) -> PlayerBundle {
    let mut bundle = PlayerBundle::from_tuning(Vec2::ZERO, tuning);
    let input = InputState::default();
    let mut ctx = PlayerContext {
        input: &input,
        body: &mut bundle.body,
        physics: &mut bundle.physics,
        invulnerable: &mut bundle.invulnerable,
        animation: &mut bundle.animation,
        ground_friction: 0.2,
    };
    bundle.fsm.change_state(PlayerState::Attack, &mut ctx);
    bundle
}

#[test]
fn test_swing_hits_each_enemy_at_most_once() {
    let mut app = combat_app();
    let tuning = GameplayTuning::default();
    app.world_mut().spawn(attacking_player(&tuning));
    let enemy = app
        .world_mut()
        .spawn(EnemyBundle::new(
            Vec2::new(50.0, 20.0),
            &tuning.enemy,
            &tuning.physics,
        ))
        .id();

    for _ in 0..3 {
        app.update();
        // Clear the post-hit window so only the swing's hit set can stop a repeat.
        if let Some(mut invulnerable) = app.world_mut().get_mut::<Invulnerable>(enemy) {
            invulnerable.timer = 0.0;
        }
    }

    let world = app.world();
    assert_eq!(world.get::<Health>(enemy).map(|h| h.current), Some(20));
    assert_eq!(
        world.get::<EnemyBrain>(enemy).map(|b| b.behavior()),
        Some(BehaviorKind::Hurt)
    );
    assert_eq!(
        world.get::<PhysicsBody>(enemy).map(|p| p.velocity.x),
        Some(4.0)
    );
}

#[test]
fn test_invulnerable_player_ignores_contact() {
    let mut app = combat_app();
    let tuning = GameplayTuning::default();
    let mut bundle = PlayerBundle::from_tuning(Vec2::ZERO, &tuning);
    bundle.invulnerable.grant(1.0);
    let player = app.world_mut().spawn(bundle).id();
    app.world_mut().spawn(EnemyBundle::new(
        Vec2::new(30.0, 32.0),
        &tuning.enemy,
        &tuning.physics,
    ));

    app.update();
    assert_eq!(app.world().get::<Health>(player).map(|h| h.current), Some(100));

    if let Some(mut invulnerable) = app.world_mut().get_mut::<Invulnerable>(player) {
        invulnerable.timer = 0.0;
    }
    app.update();

    let world = app.world();
    assert_eq!(world.get::<Health>(player).map(|h| h.current), Some(90));
    assert!(world.get::<Invulnerable>(player).is_some_and(|i| i.is_invulnerable()));
    assert_eq!(
        world.get::<PhysicsBody>(player).map(|p| p.velocity),
        Some(Vec2::new(-6.0, -4.0))
    );
}

#[test]
fn test_contact_damage_can_be_disabled() {
    let mut app = combat_app();
    let mut tuning = GameplayTuning::default();
    tuning.combat.contact_damage = false;
    app.insert_resource(tuning.clone());
    let player = app
        .world_mut()
        .spawn(PlayerBundle::from_tuning(Vec2::ZERO, &tuning))
        .id();
    app.world_mut().spawn(EnemyBundle::new(
        Vec2::new(30.0, 32.0),
        &tuning.enemy,
        &tuning.physics,
    ));

    app.update();
    assert_eq!(app.world().get::<Health>(player).map(|h| h.current), Some(100));
}

#[test]
fn test_dead_enemy_is_despawned_after_death_timer() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
            std::time::Duration::from_secs_f32(0.1),
        ))
        .add_plugins(crate::SimulationPlugin);
    let tuning = GameplayTuning::default();
    let enemy = app
        .world_mut()
        .spawn(EnemyBundle::new(Vec2::ZERO, &tuning.enemy, &tuning.physics))
        .id();
    app.update();

    {
        let world = app.world_mut();
        let mut query = world.query::<(
            &mut EnemyBrain,
            &mut Health,
            &mut Invulnerable,
            &mut Body,
            &mut PhysicsBody,
            &mut AnimationController,
        )>();
        let (mut brain, mut health, mut invulnerable, mut body, mut physics, mut animation) =
            query.get_mut(world, enemy).expect("enemy exists");
        let mut ctx = EnemyContext {
            body: &mut body,
            physics: &mut physics,
            animation: &mut animation,
            target: None,
            ground_friction: 0.2,
        };
        let outcome = brain.take_damage(100, &mut health, &mut invulnerable, &mut ctx);
        assert_eq!(outcome, DamageOutcome::Killed);
    }

    for _ in 0..10 {
        app.update();
    }
    assert!(app.world().get::<EnemyBrain>(enemy).is_none());
}

#[test]
fn test_boss_target_is_assigned_and_phase_messages_flow() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(crate::SimulationPlugin);
    let tuning = GameplayTuning::default();
    let player = app
        .world_mut()
        .spawn(PlayerBundle::from_tuning(Vec2::new(600.0, 0.0), &tuning))
        .id();
    let boss = app
        .world_mut()
        .spawn(BossBundle::new(Vec2::ZERO, &tuning.boss, &tuning.physics, 5))
        .id();

    if let Some(mut health) = app.world_mut().get_mut::<Health>(boss) {
        health.current = 100;
    }
    app.update();
    app.update();

    let world = app.world();
    assert_eq!(world.get::<Target>(boss), Some(&Target(player)));
    assert_eq!(world.get::<BossBrain>(boss).map(|b| b.phase()), Some(3));
    let snapshot = world.resource::<crate::core::SimulationSnapshot>();
    let boss_view: Vec<_> = snapshot.of_kind("boss").collect();
    assert_eq!(boss_view.len(), 1);
    assert_eq!(boss_view[0].phase, Some(3));
    assert_eq!(snapshot.of_kind("player").count(), 1);
}
