//! Core domain: the frame pipeline, pause gating, and the render snapshot.

use bevy::prelude::*;

mod resources;
mod snapshot;
mod systems;


pub use resources::{GameplayPaused, gameplay_active};
pub use snapshot::{EntitySnapshot, SimulationSnapshot};

use crate::combat::CombatPlugin;
use crate::content::ContentPlugin;
use crate::movement::MovementPlugin;
use crate::player::PlayerPlugin;
use crate::sprites::SpritesPlugin;

/// Stages of one simulation frame, run in declaration order inside `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Input,
    /// Player state machine, enemy and boss decisions.
    Behavior,
    Physics,
    /// Horizontal then vertical tile resolution.
    Collision,
    /// Player attacks first, then enemy attacks.
    Combat,
    Animation,
    Cleanup,
}

/// Every gameplay plugin plus the pipeline ordering they rely on.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                SimulationSet::Input,
                SimulationSet::Behavior,
                SimulationSet::Physics,
                SimulationSet::Collision,
                SimulationSet::Combat,
                SimulationSet::Animation,
                SimulationSet::Cleanup,
            )
                .chain(),
        )
        .configure_sets(
            Update,
            (
                SimulationSet::Behavior,
                SimulationSet::Physics,
                SimulationSet::Collision,
                SimulationSet::Combat,
                SimulationSet::Animation,
            )
                .distributive_run_if(gameplay_active),
        )
        .init_resource::<GameplayPaused>()
        .init_resource::<SimulationSnapshot>()
        .add_plugins((
            ContentPlugin,
            MovementPlugin,
            PlayerPlugin,
            CombatPlugin,
            SpritesPlugin,
        ))
        .add_systems(
            Update,
            systems::toggle_pause
                .after(SimulationSet::Input)
                .before(SimulationSet::Behavior),
        )
        .add_systems(
            Update,
            snapshot::capture_snapshot.in_set(SimulationSet::Cleanup),
        );

        #[cfg(feature = "dev-tools")]
        app.add_systems(
            Update,
            snapshot::dump_snapshot_on_key.after(snapshot::capture_snapshot),
        );
    }
}
