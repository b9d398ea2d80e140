use std::path::{Path, PathBuf};

use bevy::prelude::*;

use crate::atomic_write::atomic_write;
use crate::save_error::SaveError;
use crate::serialization::{
    create_save_data, decode_save, encode_save, reset_rail_world, restore_save,
};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Write the rail world to `path`.
#[derive(Event, Debug, Clone)]
pub struct SaveRailsEvent {
    pub path: PathBuf,
}

/// Replace the rail world with the save at `path`.
#[derive(Event, Debug, Clone)]
pub struct LoadRailsEvent {
    pub path: PathBuf,
}

/// Start over with an empty rail world and default params.
#[derive(Event, Debug, Clone, Default)]
pub struct NewRailwayEvent;

/// Result of a save or load request.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SaveLoadOutcome {
    Saved { path: PathBuf, bytes: usize },
    Loaded { path: PathBuf, vehicles: usize },
    Failed { path: PathBuf, message: String },
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveRailsEvent>()
            .add_event::<LoadRailsEvent>()
            .add_event::<NewRailwayEvent>()
            .add_event::<SaveLoadOutcome>()
            .add_systems(
                Update,
                (exclusive_save, exclusive_load, exclusive_new_railway).chain(),
            );
    }
}

// ---------------------------------------------------------------------------
// Exclusive systems
// ---------------------------------------------------------------------------

pub fn save_to_path(world: &mut World, path: &Path) -> Result<usize, SaveError> {
    let bytes = encode_save(&create_save_data(world))?;
    atomic_write(path, &bytes)?;
    Ok(bytes.len())
}

pub fn load_from_path(world: &mut World, path: &Path) -> Result<usize, SaveError> {
    let bytes = std::fs::read(path)?;
    let data = decode_save(&bytes)?;
    Ok(restore_save(world, &data))
}

/// Handles every pending `SaveRailsEvent` with full world access.
pub(crate) fn exclusive_save(world: &mut World) {
    let requests: Vec<SaveRailsEvent> = world
        .resource_mut::<Events<SaveRailsEvent>>()
        .drain()
        .collect();
    for request in requests {
        let outcome = match save_to_path(world, &request.path) {
            Ok(bytes) => {
                info!("Saved rail world to {} ({bytes} bytes)", request.path.display());
                SaveLoadOutcome::Saved {
                    path: request.path,
                    bytes,
                }
            }
            Err(e) => {
                error!("Save to {} failed: {e}", request.path.display());
                SaveLoadOutcome::Failed {
                    path: request.path,
                    message: e.to_string(),
                }
            }
        };
        world.send_event(outcome);
    }
}

/// Handles every pending `LoadRailsEvent`. Despawns are immediate, so the
/// world is consistent before the next fixed tick.
pub(crate) fn exclusive_load(world: &mut World) {
    let requests: Vec<LoadRailsEvent> = world
        .resource_mut::<Events<LoadRailsEvent>>()
        .drain()
        .collect();
    for request in requests {
        let outcome = match load_from_path(world, &request.path) {
            Ok(vehicles) => {
                info!(
                    "Loaded rail world from {} ({vehicles} vehicles)",
                    request.path.display()
                );
                SaveLoadOutcome::Loaded {
                    path: request.path,
                    vehicles,
                }
            }
            Err(e) => {
                error!("Load from {} failed: {e}", request.path.display());
                SaveLoadOutcome::Failed {
                    path: request.path,
                    message: e.to_string(),
                }
            }
        };
        world.send_event(outcome);
    }
}

/// Handles `NewRailwayEvent`. Several requests in one frame reset once.
pub(crate) fn exclusive_new_railway(world: &mut World) {
    let requested = world
        .resource_mut::<Events<NewRailwayEvent>>()
        .drain()
        .count();
    if requested == 0 {
        return;
    }
    reset_rail_world(world);
    info!("Started a new rail world");
}
