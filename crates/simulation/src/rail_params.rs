//! Data-driven rail tunables.
//!
//! [`RailParams`] gathers the constants the motion controller and the track
//! catalog read at runtime, so they can be overridden from a JSON file and
//! persist across save/load. Changing the resource rebuilds the catalog.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use tracks::{CrossingConvention, ParameterConvention, SegmentOptions, ARC_SEGMENT_SAMPLES};

use crate::config::{ATTACH_DISTANCE, DEFAULT_GRAVITY, RIDE_CLEARANCE};

#[derive(
    Resource, Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
#[serde(default)]
pub struct RailParams {
    /// Chord samples per curve for arclength tables.
    pub arc_samples: u32,
    pub attach_distance: f32,
    pub ride_clearance: f32,
    /// Acceleration along the rail toward lower ground. Zero disables it.
    pub gravity: f32,
    pub parameter_convention: ParameterConvention,
    pub crossing_convention: CrossingConvention,
}

impl Default for RailParams {
    fn default() -> Self {
        Self {
            arc_samples: ARC_SEGMENT_SAMPLES as u32,
            attach_distance: ATTACH_DISTANCE,
            ride_clearance: RIDE_CLEARANCE,
            gravity: DEFAULT_GRAVITY,
            parameter_convention: ParameterConvention::default(),
            crossing_convention: CrossingConvention::default(),
        }
    }
}

impl RailParams {
    /// Parse overrides; fields missing from `json` keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn segment_options(&self) -> SegmentOptions {
        SegmentOptions {
            samples: self.arc_samples as usize,
            parameter_convention: self.parameter_convention,
            crossing_convention: self.crossing_convention,
        }
    }
}

impl crate::Saveable for RailParams {
    const SAVE_KEY: &'static str = "rail_params";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        // always saved, so loading restores exactly the params the save ran with
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}
