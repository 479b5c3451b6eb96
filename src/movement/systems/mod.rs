mod collisions;
mod input;
mod movement;

pub use collisions::step_body;

pub(crate) use collisions::resolve_tile_collisions;
pub(crate) use input::{sample_keyboard, update_input_state};
pub(crate) use movement::apply_gravity;
