// ---------------------------------------------------------------------------
// Save structs and version constants
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use simulation::vehicles::{PreviousPose, RailVehicle, TrackAttachment, VehicleBounds};

/// Current save data version.
/// v1 = extension map (rail params, rail grid) + rail vehicles
pub const CURRENT_SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct SaveData {
    pub version: u32,
    /// `Saveable` resources by key.
    pub extensions: BTreeMap<String, Vec<u8>>,
    pub vehicles: Vec<SavedRailVehicle>,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: CURRENT_SAVE_VERSION,
            extensions: BTreeMap::new(),
            vehicles: Vec::new(),
        }
    }
}

/// One rail vehicle. A free vehicle keeps `block` and `t` zeroed.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct SavedRailVehicle {
    pub attached: bool,
    pub block: [i32; 3],
    pub t: f32,
    pub velocity: [f32; 3],
    pub height: f32,
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
}

impl SavedRailVehicle {
    pub fn capture(vehicle: &RailVehicle, bounds: &VehicleBounds, transform: &Transform) -> Self {
        let (attached, block, t) = match vehicle.attachment {
            Some(attachment) => (true, attachment.block.to_array(), attachment.t),
            None => (false, [0; 3], 0.0),
        };
        Self {
            attached,
            block,
            t,
            velocity: vehicle.velocity.to_array(),
            height: bounds.height,
            translation: transform.translation.to_array(),
            rotation: transform.rotation.to_array(),
        }
    }

    /// Components to respawn this vehicle with. The previous pose starts at
    /// the current one so the first rendered frame does not blend.
    pub fn components(&self) -> (RailVehicle, VehicleBounds, Transform, PreviousPose) {
        let attachment = self.attached.then(|| TrackAttachment {
            block: IVec3::from_array(self.block),
            t: self.t,
        });
        let transform = Transform {
            translation: Vec3::from_array(self.translation),
            rotation: Quat::from_array(self.rotation),
            scale: Vec3::ONE,
        };
        (
            RailVehicle {
                attachment,
                velocity: Vec3::from_array(self.velocity),
            },
            VehicleBounds {
                height: self.height,
            },
            transform,
            PreviousPose::from_transform(&transform),
        )
    }
}
