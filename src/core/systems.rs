//! Core domain: pipeline-level systems.

use bevy::prelude::*;

use crate::core::resources::GameplayPaused;
use crate::movement::{Action, InputState};

pub(crate) const PAUSE_SOURCE: &str = "pause_action";

pub(crate) fn toggle_pause(input: Res<InputState>, mut paused: ResMut<GameplayPaused>) {
    if !input.is_just_pressed(Action::Pause) {
        return;
    }
    if paused.toggle(PAUSE_SOURCE) {
        info!("Simulation paused");
    } else {
        info!("Simulation resumed");
    }
}
