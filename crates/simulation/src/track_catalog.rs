//! Prebuilt segments for every (shape, rotation) a block can take.

use std::collections::HashMap;

use bevy::prelude::*;
use tracks::{Rotation, TrackError, TrackSegment};

use crate::rail_params::RailParams;
use crate::track_shapes::TrackShape;

#[derive(Resource, Debug, Clone)]
pub struct TrackCatalog {
    segments: HashMap<(TrackShape, Rotation), TrackSegment>,
}

impl Default for TrackCatalog {
    fn default() -> Self {
        // the default params always build
        Self::build(&RailParams::default()).unwrap_or_else(|_| Self {
            segments: HashMap::new(),
        })
    }
}

impl TrackCatalog {
    pub fn build(params: &RailParams) -> Result<Self, TrackError> {
        let options = params.segment_options();
        let mut segments = HashMap::new();
        for shape in TrackShape::ALL {
            for rotation in Rotation::all() {
                let segment = TrackSegment::new(shape.curves(), &options)?
                    .oriented(shape.descriptor(), rotation);
                segments.insert((shape, rotation), segment);
            }
        }
        Ok(Self { segments })
    }

    pub fn segment(&self, shape: TrackShape, rotation: Rotation) -> Option<&TrackSegment> {
        self.segments.get(&(shape, rotation))
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Rebuilds the catalog after `RailParams` changes. A rejected rebuild keeps
/// the previous catalog.
pub fn rebuild_catalog(params: Res<RailParams>, mut catalog: ResMut<TrackCatalog>) {
    match TrackCatalog::build(&params) {
        Ok(rebuilt) => {
            debug!("TrackCatalog rebuilt with {} segments", rebuilt.len());
            *catalog = rebuilt;
        }
        Err(e) => warn!("TrackCatalog: keeping previous segments, rebuild failed: {e}"),
    }
}
