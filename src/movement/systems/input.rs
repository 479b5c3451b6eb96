//! Movement domain: input sampling.

use bevy::prelude::*;

use crate::movement::{InputBindings, InputState, RawInput};

/// Copy bound keys into `RawInput`. Does nothing when no keyboard is present,
/// so headless hosts can write `RawInput` themselves.
pub(crate) fn sample_keyboard(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    bindings: Res<InputBindings>,
    mut raw: ResMut<RawInput>,
) {
    let Some(keyboard) = keyboard else {
        return;
    };
    raw.clear();
    for (key, action) in &bindings.keys {
        if keyboard.pressed(*key) {
            raw.hold(*action);
        }
    }
}

pub(crate) fn update_input_state(raw: Res<RawInput>, mut input: ResMut<InputState>) {
    input.update(&raw.held);
}
