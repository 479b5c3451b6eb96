//! Gameplay simulation core for a 2D action platformer.
//!
//! Every domain exposes plain Rust types that hold the algorithms plus a bevy
//! `Plugin` that wires them into the frame pipeline described by
//! [`SimulationSet`]. Coordinates are screen space: `+x` right, `+y` down.

pub mod combat;
pub mod content;
pub mod core;
pub mod movement;
pub mod player;
pub mod sprites;

pub use crate::core::{SimulationPlugin, SimulationSet};
