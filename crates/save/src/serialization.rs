//! Snapshot and restore of the rail world.
//!
//! Resources travel through the `SaveableRegistry` extension map; vehicles
//! are captured component by component into [`SavedRailVehicle`]s.

use bevy::prelude::*;

use simulation::rail_params::RailParams;
use simulation::track_catalog::TrackCatalog;
use simulation::vehicles::{RailVehicle, VehicleBounds};
use simulation::SaveableRegistry;

use crate::file_header::{unwrap_payload, wrap_compressed};
use crate::save_error::SaveError;
pub use crate::save_types::{SaveData, SavedRailVehicle, CURRENT_SAVE_VERSION};

/// Capture every registered resource and every rail vehicle.
pub fn create_save_data(world: &mut World) -> SaveData {
    let extensions = {
        let world: &World = world;
        world
            .get_resource::<SaveableRegistry>()
            .map(|registry| registry.save_all(world))
            .unwrap_or_default()
    };

    let mut query = world.query::<(&RailVehicle, &VehicleBounds, &Transform)>();
    let vehicles = query
        .iter(world)
        .map(|(vehicle, bounds, transform)| SavedRailVehicle::capture(vehicle, bounds, transform))
        .collect();

    SaveData {
        version: CURRENT_SAVE_VERSION,
        extensions,
        vehicles,
    }
}

/// Header-wrapped, LZ4-compressed bitcode.
pub fn encode_save(data: &SaveData) -> Result<Vec<u8>, SaveError> {
    wrap_compressed(&bitcode::encode(data))
}

pub fn decode_save(bytes: &[u8]) -> Result<SaveData, SaveError> {
    if bytes.is_empty() {
        return Err(SaveError::NoData);
    }
    let payload = unwrap_payload(bytes)?;
    let data: SaveData = bitcode::decode(&payload)?;
    if data.version > CURRENT_SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: CURRENT_SAVE_VERSION,
            found: data.version,
        });
    }
    Ok(data)
}

/// Replace the rail world with `data`. Returns the number of vehicles
/// spawned.
///
/// Existing rail vehicles are despawned, registered resources reloaded (keys
/// missing from the save reset to default) and the track catalog rebuilt
/// before vehicles are respawned, so an attached vehicle resumes on the same
/// block at the same `t`.
pub fn restore_save(world: &mut World, data: &SaveData) -> usize {
    despawn_vehicles(world);

    if world.contains_resource::<SaveableRegistry>() {
        world.resource_scope(|world, registry: Mut<SaveableRegistry>| {
            registry.load_all(world, &data.extensions);
        });
    } else {
        warn!("restore_save: no SaveableRegistry, rail resources left as they are");
    }
    rebuild_catalog(world);

    for saved in &data.vehicles {
        world.spawn(saved.components());
    }
    data.vehicles.len()
}

/// Clear the rail world: no vehicles, and every registered resource back at
/// its default.
pub fn reset_rail_world(world: &mut World) {
    despawn_vehicles(world);
    if world.contains_resource::<SaveableRegistry>() {
        world.resource_scope(|world, registry: Mut<SaveableRegistry>| {
            registry.reset_all(world);
        });
    } else {
        warn!("reset_rail_world: no SaveableRegistry, rail resources left as they are");
    }
    rebuild_catalog(world);
}

fn despawn_vehicles(world: &mut World) {
    let existing: Vec<Entity> = world
        .query_filtered::<Entity, With<RailVehicle>>()
        .iter(world)
        .collect();
    for entity in existing {
        world.despawn(entity);
    }
}

fn rebuild_catalog(world: &mut World) {
    let params = world.get_resource::<RailParams>().cloned().unwrap_or_default();
    match TrackCatalog::build(&params) {
        Ok(catalog) => world.insert_resource(catalog),
        Err(e) => warn!("keeping current track catalog, rebuild failed: {e}"),
    }
}
