//! Block-backed track topology.
//!
//! Neighbors are found by stepping from a block's cell across its start or
//! end face and looking the adjacent cell up in the [`RailGrid`]. A raised
//! ramp end steps one cell up as well, and a ramp climbing toward a face is
//! found one cell down. Nothing is cached: every query sees the grid as it is
//! now.

use bevy::prelude::*;
use tracks::{Placement, SegmentRef, Side, TrackSegment, TrackTopology};

use crate::rail_grid::RailGrid;
use crate::track_catalog::TrackCatalog;

#[derive(Clone, Copy)]
pub struct RailWorld<'a> {
    pub grid: &'a RailGrid,
    pub catalog: &'a TrackCatalog,
}

impl<'a> RailWorld<'a> {
    pub fn new(grid: &'a RailGrid, catalog: &'a TrackCatalog) -> Self {
        Self { grid, catalog }
    }

    /// The segment whose rail meets the end of `cell`'s rail on `face`.
    fn across(&self, cell: IVec3, face: Side) -> Option<SegmentRef<'_, IVec3>> {
        let block = self.grid.get(cell)?;
        let port = block.port(cell, face)?;
        let lift = block.end_on(face)?;
        let facing = face.reverse();

        let ahead = cell + face.direction() + IVec3::Y * lift;
        let found = [ahead, ahead + IVec3::NEG_Y].into_iter().find(|&neighbor_cell| {
            self.grid
                .get(neighbor_cell)
                .and_then(|neighbor| neighbor.port(neighbor_cell, facing))
                == Some(port)
        });
        match found {
            Some(neighbor_cell) => self.segment_at(neighbor_cell),
            None => {
                if self.grid.contains(ahead) {
                    debug!(
                        "RailWorld: block at {} does not connect back to {} across {:?}",
                        ahead, cell, face
                    );
                }
                None
            }
        }
    }
}

impl<'a> TrackTopology for RailWorld<'a> {
    type Context = IVec3;

    fn segment_at(&self, cell: IVec3) -> Option<SegmentRef<'_, IVec3>> {
        let block = self.grid.get(cell)?;
        let segment = self.catalog.segment(block.shape, block.rotation)?;
        Some(SegmentRef::new(segment, cell))
    }

    fn previous_of(&self, segment: &TrackSegment, cell: IVec3) -> Option<SegmentRef<'_, IVec3>> {
        self.across(cell, segment.ends().start)
    }

    fn next_of(&self, segment: &TrackSegment, cell: IVec3) -> Option<SegmentRef<'_, IVec3>> {
        self.across(cell, segment.ends().end)
    }

    fn placement(&self, cell: IVec3) -> Option<Placement> {
        let block = self.grid.get(cell)?;
        Some(Placement::new(cell.as_vec3(), block.rotation.quat()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rail_grid::TrackBlock;
    use crate::track_shapes::TrackShape;
    use tracks::Rotation;

    fn block(shape: TrackShape, turns: i32) -> TrackBlock {
        TrackBlock::new(shape, Rotation::from_quarter_turns(turns))
    }

    /// Three straights heading -Z from the origin.
    fn line(middle: TrackBlock) -> RailGrid {
        let mut grid = RailGrid::new();
        grid.insert(IVec3::new(0, 0, 0), block(TrackShape::Straight, 0));
        grid.insert(IVec3::new(0, 0, -1), middle);
        grid.insert(IVec3::new(0, 0, -2), block(TrackShape::Straight, 0));
        grid
    }

    #[test]
    fn test_neighbors_along_a_line() {
        let grid = line(block(TrackShape::Straight, 0));
        let catalog = TrackCatalog::default();
        let world = RailWorld::new(&grid, &catalog);
        let middle = world.segment_at(IVec3::new(0, 0, -1)).unwrap();
        let next = world.next_of(middle.segment, middle.context).unwrap();
        let previous = world.previous_of(middle.segment, middle.context).unwrap();
        assert_eq!(next.context, IVec3::new(0, 0, -2));
        assert_eq!(previous.context, IVec3::ZERO);
        assert!(!world.is_inverted(middle, next));
    }

    #[test]
    fn test_half_turned_neighbor_is_inverted() {
        let grid = line(block(TrackShape::Straight, 2));
        let catalog = TrackCatalog::default();
        let world = RailWorld::new(&grid, &catalog);
        let first = world.segment_at(IVec3::ZERO).unwrap();
        let next = world.next_of(first.segment, first.context).unwrap();
        assert_eq!(next.context, IVec3::new(0, 0, -1));
        assert!(world.is_inverted(first, next));
    }

    #[test]
    fn test_sideways_neighbor_is_a_gap() {
        // a straight turned a quarter runs along X and has no face toward +Z
        let grid = line(block(TrackShape::Straight, 1));
        let catalog = TrackCatalog::default();
        let world = RailWorld::new(&grid, &catalog);
        let first = world.segment_at(IVec3::ZERO).unwrap();
        assert!(world.next_of(first.segment, first.context).is_none());
    }

    #[test]
    fn test_removed_block_vanishes() {
        let mut grid = line(block(TrackShape::Straight, 0));
        grid.remove(IVec3::new(0, 0, -1));
        let catalog = TrackCatalog::default();
        let world = RailWorld::new(&grid, &catalog);
        let first = world.segment_at(IVec3::ZERO).unwrap();
        assert!(world.next_of(first.segment, first.context).is_none());
        assert!(world.segment_at(IVec3::new(0, 0, -1)).is_none());
        assert!(world.placement(IVec3::new(0, 0, -1)).is_none());
    }

    #[test]
    fn test_crossing_into_next_block() {
        let grid = line(block(TrackShape::Straight, 0));
        let catalog = TrackCatalog::default();
        let world = RailWorld::new(&grid, &catalog);
        let first = world.segment_at(IVec3::ZERO).unwrap();
        let pair = first
            .segment
            .get_track_segment(1.25, IVec3::ZERO, &world)
            .unwrap();
        assert_eq!(pair.context, IVec3::new(0, 0, -1));
        assert!((pair.t - 0.25).abs() < 1e-3, "got {}", pair.t);

        let placement = world.placement(pair.context).unwrap();
        let p = placement.transform_point(pair.point());
        assert!((p - Vec3::new(0.0, -0.5, -0.75)).length() < 1e-3, "got {p}");
    }

    #[test]
    fn test_corner_joins_a_straight_to_its_left() {
        let mut grid = RailGrid::new();
        grid.insert(IVec3::ZERO, block(TrackShape::Corner, 0));
        // exits Left into -X; a straight turned a quarter runs Right -> Left
        grid.insert(IVec3::NEG_X, block(TrackShape::Straight, 1));
        let catalog = TrackCatalog::default();
        let world = RailWorld::new(&grid, &catalog);
        let corner = world.segment_at(IVec3::ZERO).unwrap();
        let next = world.next_of(corner.segment, corner.context).unwrap();
        assert_eq!(next.context, IVec3::NEG_X);
        assert!(!world.is_inverted(corner, next));
    }

    #[test]
    fn test_placement_uses_block_rotation() {
        let mut grid = RailGrid::new();
        grid.insert(IVec3::new(3, 1, 0), block(TrackShape::Straight, 1));
        let catalog = TrackCatalog::default();
        let world = RailWorld::new(&grid, &catalog);
        let placement = world.placement(IVec3::new(3, 1, 0)).unwrap();
        assert_eq!(placement.translation, Vec3::new(3.0, 1.0, 0.0));
        let heading = placement.transform_vector(Vec3::NEG_Z);
        assert!((heading - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_ramp_joins_level_track_above_and_below() {
        let mut grid = RailGrid::new();
        grid.insert(IVec3::ZERO, block(TrackShape::Straight, 0));
        grid.insert(IVec3::new(0, 0, -1), block(TrackShape::Ramp, 0));
        grid.insert(IVec3::new(0, 1, -2), block(TrackShape::Straight, 0));
        let catalog = TrackCatalog::default();
        let world = RailWorld::new(&grid, &catalog);

        let ramp = world.segment_at(IVec3::new(0, 0, -1)).unwrap();
        let top = world.next_of(ramp.segment, ramp.context).unwrap();
        assert_eq!(top.context, IVec3::new(0, 1, -2));
        assert!(!world.is_inverted(ramp, top));
        let bottom = world.previous_of(ramp.segment, ramp.context).unwrap();
        assert_eq!(bottom.context, IVec3::ZERO);

        // and back down from the upper straight
        let back = world.previous_of(top.segment, top.context).unwrap();
        assert_eq!(back.context, IVec3::new(0, 0, -1));
    }

    #[test]
    fn test_level_block_beside_a_ramp_top_is_a_gap() {
        let mut grid = RailGrid::new();
        grid.insert(IVec3::ZERO, block(TrackShape::Ramp, 0));
        grid.insert(IVec3::new(0, 0, -1), block(TrackShape::Straight, 0));
        let catalog = TrackCatalog::default();
        let world = RailWorld::new(&grid, &catalog);
        let ramp = world.segment_at(IVec3::ZERO).unwrap();
        assert!(world.next_of(ramp.segment, ramp.context).is_none());
    }

    #[test]
    fn test_descending_ramp_is_inverted() {
        // heading -Z, the ramp below is entered from its raised end
        let mut grid = RailGrid::new();
        grid.insert(IVec3::ZERO, block(TrackShape::Straight, 0));
        grid.insert(IVec3::new(0, -1, -1), block(TrackShape::Ramp, 2));
        let catalog = TrackCatalog::default();
        let world = RailWorld::new(&grid, &catalog);
        let first = world.segment_at(IVec3::ZERO).unwrap();
        let ramp = world.next_of(first.segment, first.context).unwrap();
        assert_eq!(ramp.context, IVec3::new(0, -1, -1));
        assert!(world.is_inverted(first, ramp));
    }
}
