//! World storage of placed track blocks, keyed by integer cell.

use std::collections::HashMap;

use bevy::prelude::*;
use tracks::{Rotation, Side};

use crate::track_shapes::TrackShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackBlock {
    pub shape: TrackShape,
    pub rotation: Rotation,
}

impl TrackBlock {
    pub fn new(shape: TrackShape, rotation: Rotation) -> Self {
        Self { shape, rotation }
    }

    /// Lift of this block's rail end on `side`, or `None` if no end is there.
    pub fn end_on(&self, side: Side) -> Option<i32> {
        let ends = self.shape.descriptor().rotated(self.rotation);
        let (start_lift, end_lift) = self.shape.lifts();
        [(ends.start, start_lift), (ends.end, end_lift)]
            .into_iter()
            .find(|(end, _)| *end == side)
            .map(|(_, lift)| lift)
    }

    /// Where the rail crosses `side` when the block sits at `cell`, in doubled
    /// cell coordinates so face centers stay integral. Two ends join exactly
    /// when their ports coincide.
    pub fn port(&self, cell: IVec3, side: Side) -> Option<IVec3> {
        let lift = self.end_on(side)?;
        Some(cell * 2 + side.direction() + IVec3::Y * (2 * lift - 1))
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct RailGrid {
    blocks: HashMap<IVec3, TrackBlock>,
}

impl RailGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `block` at `cell`, returning whatever was there before.
    pub fn insert(&mut self, cell: IVec3, block: TrackBlock) -> Option<TrackBlock> {
        self.blocks.insert(cell, block)
    }

    pub fn remove(&mut self, cell: IVec3) -> Option<TrackBlock> {
        self.blocks.remove(&cell)
    }

    pub fn get(&self, cell: IVec3) -> Option<TrackBlock> {
        self.blocks.get(&cell).copied()
    }

    pub fn contains(&self, cell: IVec3) -> bool {
        self.blocks.contains_key(&cell)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (IVec3, TrackBlock)> + '_ {
        self.blocks.iter().map(|(cell, block)| (*cell, *block))
    }

    /// The cell whose unit cube contains `position`.
    pub fn cell_of(position: Vec3) -> IVec3 {
        position.round().as_ivec3()
    }

    /// First track cell hit by a ray cast straight down from `from`, no
    /// further than `distance`.
    pub fn scan_down(&self, from: Vec3, distance: f32) -> Option<IVec3> {
        let top = Self::cell_of(from);
        let bottom = Self::cell_of(from - Vec3::Y * distance.max(0.0));
        (bottom.y..=top.y)
            .rev()
            .map(|y| IVec3::new(top.x, y, top.z))
            .find(|cell| self.contains(*cell))
    }
}
