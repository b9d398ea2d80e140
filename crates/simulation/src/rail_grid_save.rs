// ---------------------------------------------------------------------------
// Saveable implementation for RailGrid
// ---------------------------------------------------------------------------

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use tracks::Rotation;

use crate::rail_grid::{RailGrid, TrackBlock};
use crate::track_shapes::TrackShape;

#[derive(Encode, Decode, Default)]
struct SavedRailGrid {
    blocks: Vec<SavedTrackBlock>,
}

#[derive(Encode, Decode)]
struct SavedTrackBlock {
    cell: [i32; 3],
    shape: u8,
    quarter_turns: u8,
}

impl crate::Saveable for RailGrid {
    const SAVE_KEY: &'static str = "rail_grid";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if self.is_empty() {
            return None;
        }
        let mut blocks: Vec<SavedTrackBlock> = self
            .iter()
            .map(|(cell, block)| SavedTrackBlock {
                cell: cell.to_array(),
                shape: block.shape.code(),
                quarter_turns: block.rotation.quarter_turns(),
            })
            .collect();
        // HashMap order is not stable between runs
        blocks.sort_by_key(|b| b.cell);
        Some(bitcode::encode(&SavedRailGrid { blocks }))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        let saved: SavedRailGrid = crate::decode_or_warn(Self::SAVE_KEY, bytes);
        let mut grid = RailGrid::new();
        for block in saved.blocks {
            let cell = IVec3::from_array(block.cell);
            let Some(shape) = TrackShape::from_code(block.shape) else {
                warn!(
                    "RailGrid: skipping block at {} with unknown shape code {}",
                    cell, block.shape
                );
                continue;
            };
            let rotation = Rotation::from_quarter_turns(i32::from(block.quarter_turns));
            grid.insert(cell, TrackBlock::new(shape, rotation));
        }
        grid
    }
}
