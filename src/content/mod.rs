//! Content domain: data-driven gameplay tuning loaded from RON.

use std::path::PathBuf;

use bevy::prelude::*;

mod data;
mod loader;
mod validation;


pub use data::{
    AttackWindow, BossTuning, CombatTuning, ComboHit, EnemyTuning, GameplayTuning, PhysicsTuning,
    PlayerTuning, SmartEnemyTuning,
};
pub use loader::{TuningLoadError, load_tuning, parse_tuning};
pub use validation::{ValidationError, validate_tuning};

/// Where the tuning file is read from at startup.
#[derive(Resource, Debug, Clone)]
pub struct TuningPath(pub PathBuf);

impl Default for TuningPath {
    fn default() -> Self {
        Self(PathBuf::from("assets/data/gameplay_tuning.ron"))
    }
}

pub struct ContentPlugin;

impl Plugin for ContentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TuningPath>()
            .init_resource::<GameplayTuning>()
            .add_systems(Startup, load_gameplay_tuning);
    }
}

/// Replace the default tuning with the file contents when it loads and
/// validates cleanly. Any failure keeps the built-in defaults.
fn load_gameplay_tuning(path: Res<TuningPath>, mut tuning: ResMut<GameplayTuning>) {
    if !path.0.exists() {
        warn!(
            "Tuning file {} not found, using built-in defaults",
            path.0.display()
        );
        return;
    }

    let loaded = match load_tuning(&path.0) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    let errors = validate_tuning(&loaded);
    if !errors.is_empty() {
        for e in &errors {
            error!("Tuning validation error: {}", e);
        }
        warn!(
            "{} tuning validation errors, using built-in defaults",
            errors.len()
        );
        return;
    }

    info!("Loaded gameplay tuning from {}", path.0.display());
    *tuning = loaded;
}
