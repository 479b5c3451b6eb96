use std::time::Duration;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use knightfall::SimulationPlugin;
use knightfall::combat::{SpawnPoint, spawn_from_point};
use knightfall::content::GameplayTuning;
use knightfall::core::SimulationSnapshot;
use knightfall::movement::{Action, CollisionResolver, RawInput, rect_at};

const TILE: i32 = 32;
const DEFAULT_FRAMES: u32 = 600;

/// Headless run: a walled arena with a player, a couple of enemies and the
/// boss, stepped at a fixed 60 Hz. Prints the final snapshot as JSON.
fn main() {
    let frames = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / 60.0,
        )))
        .add_plugins(SimulationPlugin);

    // Startup loads the tuning file.
    app.update();

    app.world_mut()
        .resource_mut::<CollisionResolver>()
        .set_tiles(arena_tiles(40, 20));

    let tuning = app.world().resource::<GameplayTuning>().clone();
    let mut spawn_points = vec![
        SpawnPoint::new(Vec2::new(96.0, 500.0), "player"),
        SpawnPoint::new(Vec2::new(400.0, 560.0), "enemy").with_property("patrol_span", 160.0),
        SpawnPoint::new(Vec2::new(700.0, 560.0), "smart_enemy").with_property("seed", 7.0),
        SpawnPoint::new(Vec2::new(1000.0, 480.0), "boss").with_property("seed", 11.0),
    ];
    {
        let mut commands = app.world_mut().commands();
        for point in &mut spawn_points {
            spawn_from_point(&mut commands, point, &tuning);
        }
    }
    app.world_mut().flush();

    for frame in 0..frames {
        let mut input = app.world_mut().resource_mut::<RawInput>();
        input.clear();
        if frame % 120 < 60 {
            input.hold(Action::MoveRight);
        }
        if frame % 40 == 0 {
            input.hold(Action::Attack);
        }
        app.update();
    }

    let snapshot = app.world().resource::<SimulationSnapshot>();
    match snapshot.to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => error!("Failed to serialize simulation snapshot: {}", err),
    }
}

/// Floor along the bottom row plus a wall on each side.
fn arena_tiles(columns: i32, rows: i32) -> Vec<IRect> {
    let mut tiles = Vec::new();
    for column in 0..columns {
        tiles.push(rect_at(column * TILE, (rows - 1) * TILE, TILE, TILE));
    }
    for row in 0..rows - 1 {
        tiles.push(rect_at(0, row * TILE, TILE, TILE));
        tiles.push(rect_at((columns - 1) * TILE, row * TILE, TILE, TILE));
    }
    tiles
}
