//! Save/load for the rail world.
//!
//! A save is bitcode-encoded [`SaveData`], LZ4-compressed behind a 24-byte
//! checksummed header. Resources are persisted through the simulation's
//! `SaveableRegistry`; vehicles are captured directly.

mod atomic_write;
pub mod file_header;
pub mod save_error;
mod save_plugin;
mod save_types;
pub mod serialization;

pub use atomic_write::atomic_write;
pub use save_error::SaveError;
pub use save_plugin::{
    load_from_path, save_to_path, LoadRailsEvent, NewRailwayEvent, SaveLoadOutcome, SavePlugin,
    SaveRailsEvent,
};
pub use serialization::{
    create_save_data, decode_save, encode_save, reset_rail_world, restore_save, SaveData,
    SavedRailVehicle, CURRENT_SAVE_VERSION,
};
