//! Movement domain: input resources.

use std::collections::HashSet;

use bevy::prelude::*;

/// Named logical actions the simulation responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Attack,
    Dash,
    Pause,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::Jump,
        Action::Attack,
        Action::Dash,
        Action::Pause,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::MoveLeft => "move_left",
            Action::MoveRight => "move_right",
            Action::Jump => "jump",
            Action::Attack => "attack",
            Action::Dash => "dash",
            Action::Pause => "pause",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.name() == name)
    }
}

/// Actions physically held this frame, filled by whatever samples devices.
#[derive(Resource, Debug, Default, Clone)]
pub struct RawInput {
    pub held: HashSet<Action>,
}

impl RawInput {
    pub fn hold(&mut self, action: Action) {
        self.held.insert(action);
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

/// Per-frame action state with edge detection.
#[derive(Resource, Debug, Default, Clone)]
pub struct InputState {
    pressed: HashSet<Action>,
    just_pressed: HashSet<Action>,
    just_released: HashSet<Action>,
}

impl InputState {
    /// Advance one frame from the set of actions currently held.
    pub fn update(&mut self, held: &HashSet<Action>) {
        self.just_pressed = held.difference(&self.pressed).copied().collect();
        self.just_released = self.pressed.difference(held).copied().collect();
        self.pressed = held.clone();
    }

    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    pub fn is_just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    pub fn is_just_released(&self, action: Action) -> bool {
        self.just_released.contains(&action)
    }

    /// -1 for left, 1 for right, 0 for neither or both.
    pub fn horizontal_axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.is_pressed(Action::MoveLeft) {
            axis -= 1.0;
        }
        if self.is_pressed(Action::MoveRight) {
            axis += 1.0;
        }
        axis
    }

    pub fn reset(&mut self) {
        self.pressed.clear();
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

/// Physical key bindings used by the bundled keyboard sampler.
#[derive(Resource, Debug, Clone)]
pub struct InputBindings {
    pub keys: Vec<(KeyCode, Action)>,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            keys: vec![
                (KeyCode::ArrowLeft, Action::MoveLeft),
                (KeyCode::KeyA, Action::MoveLeft),
                (KeyCode::ArrowRight, Action::MoveRight),
                (KeyCode::KeyD, Action::MoveRight),
                (KeyCode::Space, Action::Jump),
                (KeyCode::KeyW, Action::Jump),
                (KeyCode::KeyZ, Action::Attack),
                (KeyCode::KeyJ, Action::Attack),
                (KeyCode::ShiftLeft, Action::Dash),
                (KeyCode::KeyC, Action::Dash),
                (KeyCode::Escape, Action::Pause),
            ],
        }
    }
}
