//! Content domain: gameplay tuning definitions.
//!
//! Every section deserializes with `#[serde(default)]`, so a RON file only
//! needs the values it overrides. Speeds are pixels per 60 Hz frame, times
//! are seconds.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Timed attack window: the hitbox is live while `active_start < t < active_end`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct AttackWindow {
    pub duration: f32,
    pub active_start: f32,
    pub active_end: f32,
}

impl AttackWindow {
    pub fn is_active(&self, t: f32) -> bool {
        t > self.active_start && t < self.active_end
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ComboHit {
    pub duration: f32,
    pub damage: i32,
    pub animation: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub ground_friction: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 0.8,
            max_fall_speed: 15.0,
            ground_friction: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub size: (i32, i32),
    pub hitbox_size: (i32, i32),
    pub max_health: i32,
    pub run_speed: f32,
    pub jump_force: f32,
    pub wall_slide_speed: f32,
    /// Climb speed as a multiple of the slide speed, applied upward.
    pub wall_climb_multiplier: f32,
    pub wall_jump_push: f32,
    /// Horizontal speed used to stay pressed against a wall.
    pub wall_stick_speed: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    pub invulnerability_duration: f32,
    pub attack_hitbox: (i32, i32),
    /// Fraction of a hit's duration after which the next hit can be buffered.
    pub combo_window: f32,
    /// Horizontal velocity multiplier applied when a swing starts.
    pub attack_slowdown: f32,
    pub combo: Vec<ComboHit>,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            size: (48, 64),
            hitbox_size: (40, 60),
            max_health: 100,
            run_speed: 5.0,
            jump_force: -15.0,
            wall_slide_speed: 2.0,
            wall_climb_multiplier: 1.5,
            wall_jump_push: 5.0,
            wall_stick_speed: 1.0,
            dash_speed: 15.0,
            dash_duration: 0.2,
            dash_cooldown: 0.35,
            invulnerability_duration: 1.0,
            attack_hitbox: (40, 48),
            combo_window: 0.7,
            attack_slowdown: 0.3,
            combo: vec![
                ComboHit {
                    duration: 0.3,
                    damage: 10,
                    animation: "attack1".to_string(),
                },
                ComboHit {
                    duration: 0.35,
                    damage: 15,
                    animation: "attack2".to_string(),
                },
                ComboHit {
                    duration: 0.5,
                    damage: 25,
                    animation: "attack3".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub size: (i32, i32),
    pub max_health: i32,
    pub speed: f32,
    pub chase_multiplier: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub damage: i32,
    pub attack_cooldown: f32,
    pub attack_hitbox: (i32, i32),
    /// How long a swing's hitbox stays live.
    pub swing_duration: f32,
    pub patrol_pause: f32,
    pub waypoint_tolerance: f32,
    pub hurt_duration: f32,
    pub death_duration: f32,
    pub invulnerability_duration: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            size: (32, 32),
            max_health: 30,
            speed: 2.0,
            chase_multiplier: 1.5,
            detection_range: 200.0,
            attack_range: 50.0,
            damage: 10,
            attack_cooldown: 1.0,
            attack_hitbox: (40, 30),
            swing_duration: 0.2,
            patrol_pause: 1.0,
            waypoint_tolerance: 5.0,
            hurt_duration: 0.3,
            death_duration: 0.5,
            invulnerability_duration: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SmartEnemyTuning {
    pub aggression: f32,
    pub randomness: f32,
    pub decision_interval: f32,
    pub history_len: usize,
    pub prediction_factor: f32,
    pub flank_speed_multiplier: f32,
    /// Preferred flanking distance as a multiple of the attack range.
    pub flank_distance_multiplier: f32,
    pub flank_max_time: f32,
    pub retreat_speed_multiplier: f32,
    /// Safe distance as a fraction of the detection range.
    pub retreat_safe_ratio: f32,
}

impl Default for SmartEnemyTuning {
    fn default() -> Self {
        Self {
            aggression: 0.5,
            randomness: 0.1,
            decision_interval: 0.3,
            history_len: 10,
            prediction_factor: 0.6,
            flank_speed_multiplier: 1.2,
            flank_distance_multiplier: 1.5,
            flank_max_time: 2.0,
            retreat_speed_multiplier: 1.3,
            retreat_safe_ratio: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BossTuning {
    pub size: (i32, i32),
    pub max_health: i32,
    pub speed: f32,
    pub phase_two_threshold: f32,
    pub phase_three_threshold: f32,
    pub phase_three_speed_multiplier: f32,
    pub melee_damage: i32,
    pub ranged_damage: i32,
    pub area_damage: i32,
    pub melee_range: f32,
    pub ranged_range: f32,
    pub area_range: f32,
    pub attack_cooldown: f32,
    pub area_cooldown_multiplier: f32,
    pub max_idle_time: f32,
    pub invulnerability_duration: f32,
    pub melee: AttackWindow,
    /// `active_start` is when the projectile spawns.
    pub ranged: AttackWindow,
    pub area: AttackWindow,
    pub projectile_size: i32,
    pub area_size: i32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            size: (64, 96),
            max_health: 500,
            speed: 3.0,
            phase_two_threshold: 0.66,
            phase_three_threshold: 0.33,
            phase_three_speed_multiplier: 1.5,
            melee_damage: 20,
            ranged_damage: 15,
            area_damage: 25,
            melee_range: 80.0,
            ranged_range: 300.0,
            area_range: 150.0,
            attack_cooldown: 1.5,
            area_cooldown_multiplier: 1.5,
            max_idle_time: 2.0,
            invulnerability_duration: 0.2,
            melee: AttackWindow {
                duration: 0.5,
                active_start: 0.1,
                active_end: 0.4,
            },
            ranged: AttackWindow {
                duration: 0.8,
                active_start: 0.3,
                active_end: 0.6,
            },
            area: AttackWindow {
                duration: 1.0,
                active_start: 0.3,
                active_end: 0.8,
            },
            projectile_size: 20,
            area_size: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Live enemies touching the player deal their base damage.
    pub contact_damage: bool,
    pub enemy_knockback: f32,
    pub player_knockback: (f32, f32),
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            contact_damage: true,
            enemy_knockback: 4.0,
            player_knockback: (6.0, -4.0),
        }
    }
}

/// The whole tuning file.
#[derive(Resource, Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameplayTuning {
    pub schema_version: u32,
    pub physics: PhysicsTuning,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub smart_enemy: SmartEnemyTuning,
    pub boss: BossTuning,
    pub combat: CombatTuning,
}
