//! Player domain: state identifiers and per-state counters.

use std::collections::HashSet;

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Run,
    Jump,
    Fall,
    WallSlide,
    WallClimb,
    Dash,
    Attack,
}

impl PlayerState {
    pub const ALL: [PlayerState; 8] = [
        PlayerState::Idle,
        PlayerState::Run,
        PlayerState::Jump,
        PlayerState::Fall,
        PlayerState::WallSlide,
        PlayerState::WallClimb,
        PlayerState::Dash,
        PlayerState::Attack,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Run => "run",
            PlayerState::Jump => "jump",
            PlayerState::Fall => "fall",
            PlayerState::WallSlide => "wall_slide",
            PlayerState::WallClimb => "wall_climb",
            PlayerState::Dash => "dash",
            PlayerState::Attack => "attack",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.name() == name)
    }

    pub fn is_airborne(self) -> bool {
        matches!(
            self,
            PlayerState::Jump | PlayerState::Fall | PlayerState::WallSlide | PlayerState::WallClimb
        )
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DashState {
    pub timer: f32,
    pub direction: f32,
    pub cooldown: f32,
}

/// Progress through the three-hit combo.
#[derive(Debug, Clone)]
pub(crate) struct ComboState {
    /// 1-based index of the current hit.
    pub attack_number: usize,
    pub timer: f32,
    pub can_combo: bool,
    pub buffered: bool,
    /// Entities already damaged by the current swing.
    pub hit_targets: HashSet<Entity>,
    pub hitbox: Option<IRect>,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            attack_number: 1,
            timer: 0.0,
            can_combo: false,
            buffered: false,
            hit_targets: HashSet::new(),
            hitbox: None,
        }
    }
}
