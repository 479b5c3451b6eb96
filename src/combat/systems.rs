//! Combat domain: AI driving, damage resolution, and cleanup systems.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::combat::ai::{BossBrain, BossContext, EnemyBrain, EnemyContext, TargetInfo, UtilityAi};
use crate::combat::components::{Boss, DamageOutcome, Enemy, Health, Invulnerable, Target};
use crate::combat::events::{
    BossDefeatedEvent, BossPhaseChangeEvent, BossProjectileSpawned, DamageEvent, DeathEvent,
    SoundCue, SoundCueEvent,
};
use crate::content::GameplayTuning;
use crate::movement::{Body, PhysicsBody, overlaps};
use crate::player::{Player, PlayerFsm};
use crate::sprites::AnimationController;

type TargetQuery<'w, 's> =
    Query<'w, 's, (&'static Body, &'static Health), (With<Player>, Without<Enemy>, Without<Boss>)>;

fn target_info(target: Option<&Target>, targets: &TargetQuery) -> Option<TargetInfo> {
    let (body, health) = targets.get(target?.0).ok()?;
    if health.is_dead() {
        return None;
    }
    Some(TargetInfo {
        position: body.position,
        health: health.current,
    })
}

/// Horizontal sign pointing from `from` to `to`, falling back to `fallback`
/// when they are level.
fn push_direction(from: &Body, to: &Body, fallback: f32) -> f32 {
    let dx = to.center().x - from.center().x;
    if dx == 0.0 { fallback } else { dx.signum() }
}

pub(crate) fn assign_player_target(
    mut commands: Commands,
    players: Query<Entity, With<Player>>,
    untargeted: Query<Entity, (Or<(With<Enemy>, With<Boss>)>, Without<Target>)>,
) {
    let Some(player) = players.iter().next() else {
        return;
    };
    for entity in &untargeted {
        commands.entity(entity).insert(Target(player));
    }
}

pub(crate) fn update_enemies(
    time: Res<Time>,
    tuning: Res<GameplayTuning>,
    targets: TargetQuery,
    mut enemies: Query<
        (
            &mut EnemyBrain,
            Option<&mut UtilityAi>,
            Option<&Target>,
            &Health,
            &mut Body,
            &mut PhysicsBody,
            &mut AnimationController,
        ),
        (With<Enemy>, Without<Player>),
    >,
) {
    let dt = time.delta_secs();

    for (mut brain, utility, target, health, mut body, mut physics, mut animation) in &mut enemies {
        let mut ctx = EnemyContext {
            body: &mut body,
            physics: &mut physics,
            animation: &mut animation,
            target: target_info(target, &targets),
            ground_friction: tuning.physics.ground_friction,
        };
        if let Some(mut utility) = utility {
            utility.update(dt, &mut brain, health, &mut ctx);
        }
        brain.update(dt, &mut ctx);
    }
}

pub(crate) fn update_bosses(
    time: Res<Time>,
    targets: TargetQuery,
    mut bosses: Query<
        (
            Entity,
            &mut BossBrain,
            Option<&Target>,
            &Health,
            &mut Body,
            &mut PhysicsBody,
            &mut AnimationController,
        ),
        (With<Boss>, Without<Player>),
    >,
    mut phase_events: MessageWriter<BossPhaseChangeEvent>,
    mut projectile_events: MessageWriter<BossProjectileSpawned>,
    mut cue_events: MessageWriter<SoundCueEvent>,
) {
    let dt = time.delta_secs();

    for (entity, mut brain, target, health, mut body, mut physics, mut animation) in &mut bosses {
        let mut ctx = BossContext {
            body: &mut body,
            physics: &mut physics,
            animation: &mut animation,
            target: target_info(target, &targets),
            health_ratio: health.ratio(),
        };
        let report = brain.update(dt, &mut ctx);

        if let Some(new_phase) = report.phase_changed {
            phase_events.write(BossPhaseChangeEvent {
                boss: entity,
                new_phase,
            });
            cue_events.write(SoundCueEvent {
                entity,
                cue: SoundCue::BossPhase,
            });
        }
        if let Some((origin, direction)) = report.projectile {
            projectile_events.write(BossProjectileSpawned {
                boss: entity,
                origin,
                direction,
            });
        }
    }
}

/// A hit one entity lands on the player this frame.
struct Strike {
    source: Entity,
    damage: i32,
    direction: f32,
}

/// Two passes in fixed order: the player's swing against every live enemy
/// and boss, then enemy and boss attacks (and enemy contact) against the
/// player.
#[allow(clippy::type_complexity)]
pub(crate) fn resolve_combat(
    tuning: Res<GameplayTuning>,
    mut players: Query<
        (
            Entity,
            &mut PlayerFsm,
            &Body,
            &mut PhysicsBody,
            &mut Health,
            &mut Invulnerable,
        ),
        (With<Player>, Without<Enemy>, Without<Boss>),
    >,
    mut enemies: Query<
        (
            Entity,
            &mut EnemyBrain,
            &mut Body,
            &mut PhysicsBody,
            &mut AnimationController,
            &mut Health,
            &mut Invulnerable,
        ),
        (With<Enemy>, Without<Player>, Without<Boss>),
    >,
    mut bosses: Query<
        (Entity, &mut BossBrain, &Body, &mut Health, &mut Invulnerable),
        (With<Boss>, Without<Player>, Without<Enemy>),
    >,
    mut damage_events: MessageWriter<DamageEvent>,
    mut death_events: MessageWriter<DeathEvent>,
    mut cue_events: MessageWriter<SoundCueEvent>,
) {
    let combat = &tuning.combat;

    for (player, mut fsm, player_body, mut player_physics, mut player_health, mut player_invuln) in
        &mut players
    {
        // Player attacks enemies.
        if let Some(hitbox) = fsm.attack_hitbox() {
            let damage = fsm.attack_damage();

            for (entity, mut brain, mut body, mut physics, mut animation, mut health, mut invuln) in
                &mut enemies
            {
                if health.is_dead() || fsm.has_hit(entity) || !overlaps(hitbox, body.hitbox) {
                    continue;
                }
                fsm.record_hit(entity);

                let direction = push_direction(player_body, &body, player_body.facing.sign());
                let mut ctx = EnemyContext {
                    body: &mut body,
                    physics: &mut physics,
                    animation: &mut animation,
                    target: None,
                    ground_friction: tuning.physics.ground_friction,
                };
                let outcome = brain.take_damage(damage, &mut health, &mut invuln, &mut ctx);
                if outcome == DamageOutcome::Hurt {
                    ctx.physics.velocity.x = direction * combat.enemy_knockback;
                }
                report_hit(
                    player,
                    entity,
                    damage,
                    outcome,
                    &mut damage_events,
                    &mut death_events,
                    &mut cue_events,
                );
            }

            for (entity, mut brain, body, mut health, mut invuln) in &mut bosses {
                if health.is_dead() || fsm.has_hit(entity) || !overlaps(hitbox, body.hitbox) {
                    continue;
                }
                fsm.record_hit(entity);
                let outcome = brain.take_damage(damage, &mut health, &mut invuln);
                report_hit(
                    player,
                    entity,
                    damage,
                    outcome,
                    &mut damage_events,
                    &mut death_events,
                    &mut cue_events,
                );
            }
        }

        // Enemies attack the player.
        if player_invuln.is_invulnerable() || player_health.is_dead() {
            continue;
        }

        let mut strikes = Vec::new();
        for (entity, brain, body, _, _, health, _) in enemies.iter() {
            if health.is_dead() {
                continue;
            }
            let direction = push_direction(&body, player_body, 1.0);
            if let Some(hitbox) = brain.attack_hitbox()
                && overlaps(hitbox, player_body.hitbox)
            {
                strikes.push(Strike {
                    source: entity,
                    damage: brain.attack_damage(),
                    direction,
                });
            } else if combat.contact_damage && overlaps(body.hitbox, player_body.hitbox) {
                strikes.push(Strike {
                    source: entity,
                    damage: brain.attack_damage(),
                    direction,
                });
            }
        }
        for (entity, brain, body, health, _) in bosses.iter() {
            if health.is_dead() {
                continue;
            }
            if let Some(hitbox) = brain.attack_hitbox(body)
                && overlaps(hitbox, player_body.hitbox)
            {
                strikes.push(Strike {
                    source: entity,
                    damage: brain.attack_damage(),
                    direction: push_direction(body, player_body, 1.0),
                });
            }
        }

        let (knock_x, knock_y) = combat.player_knockback;
        for strike in strikes {
            let outcome = fsm.take_damage(
                strike.damage,
                Vec2::new(strike.direction * knock_x, knock_y),
                &mut player_health,
                &mut player_invuln,
                &mut player_physics,
            );
            if outcome == DamageOutcome::Ignored {
                continue;
            }
            damage_events.write(DamageEvent {
                source: strike.source,
                target: player,
                amount: strike.damage,
                outcome,
            });
            if outcome == DamageOutcome::Killed {
                info!("Player defeated by {:?}", strike.source);
                death_events.write(DeathEvent { entity: player });
            }
        }
    }
}

fn report_hit(
    source: Entity,
    target: Entity,
    amount: i32,
    outcome: DamageOutcome,
    damage_events: &mut MessageWriter<DamageEvent>,
    death_events: &mut MessageWriter<DeathEvent>,
    cue_events: &mut MessageWriter<SoundCueEvent>,
) {
    match outcome {
        DamageOutcome::Ignored => return,
        DamageOutcome::Hurt => {
            cue_events.write(SoundCueEvent {
                entity: target,
                cue: SoundCue::Hit,
            });
        }
        DamageOutcome::Killed => {
            death_events.write(DeathEvent { entity: target });
            cue_events.write(SoundCueEvent {
                entity: target,
                cue: SoundCue::EnemyDeath,
            });
        }
    }
    damage_events.write(DamageEvent {
        source,
        target,
        amount,
        outcome,
    });
}

pub(crate) fn tick_invulnerability(time: Res<Time>, mut query: Query<&mut Invulnerable>) {
    let dt = time.delta_secs();
    for mut invulnerable in &mut query {
        invulnerable.tick(dt);
    }
}

pub(crate) fn despawn_finished(
    mut commands: Commands,
    enemies: Query<(Entity, &EnemyBrain), With<Enemy>>,
    bosses: Query<(Entity, &Health), With<Boss>>,
    mut defeated_events: MessageWriter<BossDefeatedEvent>,
) {
    for (entity, brain) in &enemies {
        if brain.ready_for_removal() {
            debug!("Despawning enemy {:?}", entity);
            commands.entity(entity).despawn();
        }
    }

    for (entity, health) in &bosses {
        if health.is_dead() {
            info!("Boss {:?} defeated", entity);
            defeated_events.write(BossDefeatedEvent { boss: entity });
            commands.entity(entity).despawn();
        }
    }
}
