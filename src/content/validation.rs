//! Sanity checks for tuning values.

use super::data::{AttackWindow, GameplayTuning};

/// A validation error with context about what failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub section: &'static str,
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}: {}", self.section, self.field, self.message)
    }
}

macro_rules! check_positive {
    ($errors:expr, $section:expr, $owner:expr, $field:ident) => {
        if !($owner.$field > Default::default()) {
            $errors.push(ValidationError {
                section: $section,
                field: stringify!($field),
                message: format!("must be positive, got {:?}", $owner.$field),
            });
        }
    };
}

macro_rules! check_unit {
    ($errors:expr, $section:expr, $owner:expr, $field:ident) => {
        if !(0.0..=1.0).contains(&$owner.$field) {
            $errors.push(ValidationError {
                section: $section,
                field: stringify!($field),
                message: format!("must be within [0, 1], got {}", $owner.$field),
            });
        }
    };
}

fn check_window(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    window: &AttackWindow,
) {
    let ordered = 0.0 <= window.active_start
        && window.active_start < window.active_end
        && window.active_end <= window.duration;
    if !ordered {
        errors.push(ValidationError {
            section: "boss",
            field,
            message: format!(
                "expected 0 <= start < end <= duration, got {:?}",
                window
            ),
        });
    }
}

/// Validate the tuning file. Returns every problem found, empty if valid.
pub fn validate_tuning(tuning: &GameplayTuning) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let physics = &tuning.physics;
    check_positive!(errors, "physics", physics, gravity);
    check_positive!(errors, "physics", physics, max_fall_speed);
    check_unit!(errors, "physics", physics, ground_friction);

    let player = &tuning.player;
    check_positive!(errors, "player", player, max_health);
    check_positive!(errors, "player", player, run_speed);
    check_positive!(errors, "player", player, dash_speed);
    check_positive!(errors, "player", player, dash_duration);
    check_positive!(errors, "player", player, wall_slide_speed);
    check_unit!(errors, "player", player, combo_window);
    check_unit!(errors, "player", player, attack_slowdown);
    if player.jump_force >= 0.0 {
        errors.push(ValidationError {
            section: "player",
            field: "jump_force",
            message: format!("must point up (negative), got {}", player.jump_force),
        });
    }
    if player.combo.is_empty() {
        errors.push(ValidationError {
            section: "player",
            field: "combo",
            message: "needs at least one hit".to_string(),
        });
    }
    for hit in &player.combo {
        if hit.duration <= 0.0 || hit.damage < 0 {
            errors.push(ValidationError {
                section: "player",
                field: "combo",
                message: format!("invalid hit '{}'", hit.animation),
            });
        }
    }

    let enemy = &tuning.enemy;
    check_positive!(errors, "enemy", enemy, max_health);
    check_positive!(errors, "enemy", enemy, speed);
    check_positive!(errors, "enemy", enemy, detection_range);
    check_positive!(errors, "enemy", enemy, attack_range);
    check_positive!(errors, "enemy", enemy, hurt_duration);
    check_positive!(errors, "enemy", enemy, death_duration);
    if enemy.attack_range > enemy.detection_range {
        errors.push(ValidationError {
            section: "enemy",
            field: "attack_range",
            message: "must not exceed detection_range".to_string(),
        });
    }

    let smart = &tuning.smart_enemy;
    check_unit!(errors, "smart_enemy", smart, aggression);
    check_unit!(errors, "smart_enemy", smart, randomness);
    check_positive!(errors, "smart_enemy", smart, decision_interval);
    check_positive!(errors, "smart_enemy", smart, history_len);

    let boss = &tuning.boss;
    check_positive!(errors, "boss", boss, max_health);
    check_positive!(errors, "boss", boss, attack_cooldown);
    check_unit!(errors, "boss", boss, phase_two_threshold);
    check_unit!(errors, "boss", boss, phase_three_threshold);
    if boss.phase_three_threshold >= boss.phase_two_threshold {
        errors.push(ValidationError {
            section: "boss",
            field: "phase_three_threshold",
            message: "must be below phase_two_threshold".to_string(),
        });
    }
    if boss.phase_three_speed_multiplier < 1.0 {
        errors.push(ValidationError {
            section: "boss",
            field: "phase_three_speed_multiplier",
            message: "must not slow the boss down".to_string(),
        });
    }
    check_window(&mut errors, "melee", &boss.melee);
    check_window(&mut errors, "ranged", &boss.ranged);
    check_window(&mut errors, "area", &boss.area);

    errors
}
