//! Laying track from a cursor, one command batch at a time.
//!
//! A [`TrackBuildContext`] borrows the grid for the length of one batch and
//! walks a cursor forward: each piece is placed so its entry faces the
//! previous piece's exit. There is no shared builder state between batches.
//! Building backward is the same walk started off a block's entry instead of
//! its exit.

use std::fmt;

use bevy::prelude::*;
use tracks::{Rotation, Side};

use crate::rail_grid::{RailGrid, TrackBlock};
use crate::track_shapes::TrackShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildCommand {
    Straight,
    Left,
    Right,
    /// Climb one cell over the next cell of travel.
    Up,
    /// Drop one cell over the next cell of travel.
    Down,
    /// Delete the block in the cell the next piece would go in.
    Remove,
}

/// Where a batch starts laying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildAnchor {
    /// The first piece goes in `cell`, travelling toward `heading`.
    At { cell: IVec3, heading: Side },
    /// Continue off the exit of the block at this cell.
    After(IVec3),
    /// Continue off the entry of the block at this cell.
    Before(IVec3),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The cursor cell already holds a block.
    Occupied(IVec3),
    /// Nothing to remove at this cell.
    NotTrack(IVec3),
    /// No block or horizontal heading to continue from.
    NoAnchor(IVec3),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Occupied(cell) => write!(f, "cell {cell} is already occupied"),
            BuildError::NotTrack(cell) => write!(f, "no track to remove at {cell}"),
            BuildError::NoAnchor(cell) => write!(f, "cannot continue track from {cell}"),
        }
    }
}

impl std::error::Error for BuildError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub placed: Vec<IVec3>,
    pub removed: Vec<IVec3>,
    /// Most recently placed cell.
    pub last: Option<IVec3>,
}

/// The level block that joins `entry` to `exit`, preferring one laid in the
/// direction of travel.
pub fn block_between(entry: Side, exit: Side) -> Option<TrackBlock> {
    let candidates = || {
        TrackShape::LEVEL.into_iter().flat_map(|shape| {
            Rotation::all()
                .into_iter()
                .map(move |rotation| (shape, rotation, shape.descriptor().rotated(rotation)))
        })
    };
    candidates()
        .find(|(_, _, ends)| ends.start == entry && ends.end == exit)
        .or_else(|| candidates().find(|(_, _, ends)| ends.start == exit && ends.end == entry))
        .map(|(shape, rotation, _)| TrackBlock::new(shape, rotation))
}

/// The ramp whose low end faces `low`.
pub fn ramp_from(low: Side) -> Option<TrackBlock> {
    Rotation::all()
        .into_iter()
        .find(|rotation| TrackShape::Ramp.descriptor().rotated(*rotation).start == low)
        .map(|rotation| TrackBlock::new(TrackShape::Ramp, rotation))
}

pub struct TrackBuildContext<'a> {
    grid: &'a mut RailGrid,
    cursor: IVec3,
    heading: Side,
    report: BuildReport,
}

impl<'a> TrackBuildContext<'a> {
    /// Start laying at `cursor`, travelling toward `heading`.
    pub fn new(grid: &'a mut RailGrid, cursor: IVec3, heading: Side) -> Result<Self, BuildError> {
        if matches!(heading, Side::Top | Side::Bottom) {
            return Err(BuildError::NoAnchor(cursor));
        }
        Ok(Self {
            grid,
            cursor,
            heading,
            report: BuildReport::default(),
        })
    }

    pub fn from_anchor(grid: &'a mut RailGrid, anchor: BuildAnchor) -> Result<Self, BuildError> {
        match anchor {
            BuildAnchor::At { cell, heading } => Self::new(grid, cell, heading),
            BuildAnchor::After(cell) => Self::continue_from(grid, cell),
            BuildAnchor::Before(cell) => Self::continue_before(grid, cell),
        }
    }

    /// Continue past the exit of the block at `cell`.
    pub fn continue_from(grid: &'a mut RailGrid, cell: IVec3) -> Result<Self, BuildError> {
        let block = grid.get(cell).ok_or(BuildError::NoAnchor(cell))?;
        let exit = block.shape.descriptor().rotated(block.rotation).end;
        Self::off_end(grid, cell, block, exit)
    }

    /// Continue past the entry of the block at `cell`, laying away from it.
    pub fn continue_before(grid: &'a mut RailGrid, cell: IVec3) -> Result<Self, BuildError> {
        let block = grid.get(cell).ok_or(BuildError::NoAnchor(cell))?;
        let entry = block.shape.descriptor().rotated(block.rotation).start;
        Self::off_end(grid, cell, block, entry)
    }

    fn off_end(
        grid: &'a mut RailGrid,
        cell: IVec3,
        block: TrackBlock,
        side: Side,
    ) -> Result<Self, BuildError> {
        let lift = block.end_on(side).ok_or(BuildError::NoAnchor(cell))?;
        Self::new(grid, cell + side.direction() + IVec3::Y * lift, side)
    }

    pub fn cursor(&self) -> IVec3 {
        self.cursor
    }

    pub fn heading(&self) -> Side {
        self.heading
    }

    pub fn apply(&mut self, command: BuildCommand) -> Result<(), BuildError> {
        let heading = self.heading;
        let turned = |turns| Rotation::from_quarter_turns(turns).rotate_side(heading);
        match command {
            BuildCommand::Straight => self.lay_level(heading),
            BuildCommand::Left => self.lay_level(turned(1)),
            BuildCommand::Right => self.lay_level(turned(3)),
            BuildCommand::Up => self.lay_ramp(true),
            BuildCommand::Down => self.lay_ramp(false),
            BuildCommand::Remove => {
                self.grid
                    .remove(self.cursor)
                    .ok_or(BuildError::NotTrack(self.cursor))?;
                self.report.removed.push(self.cursor);
                Ok(())
            }
        }
    }

    fn lay_level(&mut self, exit: Side) -> Result<(), BuildError> {
        let block =
            block_between(self.heading.reverse(), exit).ok_or(BuildError::NoAnchor(self.cursor))?;
        self.place(self.cursor, block)?;
        self.cursor += exit.direction();
        self.heading = exit;
        Ok(())
    }

    /// A climbing ramp fills the cursor cell. A descending one fills the cell
    /// below it, entered from its raised end.
    fn lay_ramp(&mut self, climbing: bool) -> Result<(), BuildError> {
        let (cell, low) = if climbing {
            (self.cursor, self.heading.reverse())
        } else {
            (self.cursor + IVec3::NEG_Y, self.heading)
        };
        let block = ramp_from(low).ok_or(BuildError::NoAnchor(self.cursor))?;
        self.place(cell, block)?;
        self.cursor = cell + self.heading.direction();
        if climbing {
            self.cursor += IVec3::Y;
        }
        Ok(())
    }

    fn place(&mut self, cell: IVec3, block: TrackBlock) -> Result<(), BuildError> {
        if self.grid.contains(cell) {
            return Err(BuildError::Occupied(cell));
        }
        self.grid.insert(cell, block);
        self.report.placed.push(cell);
        self.report.last = Some(cell);
        Ok(())
    }

    /// Apply `commands` in order. Commands before a failing one stay applied.
    pub fn run(mut self, commands: &[BuildCommand]) -> Result<BuildReport, BuildError> {
        for command in commands {
            self.apply(*command)?;
        }
        Ok(self.finish())
    }

    pub fn finish(self) -> BuildReport {
        self.report
    }
}

/// A batch of build commands starting at `anchor`.
#[derive(Event, Debug, Clone)]
pub struct BuildTrackEvent {
    pub anchor: BuildAnchor,
    pub commands: Vec<BuildCommand>,
}

pub fn apply_build_events(mut events: EventReader<BuildTrackEvent>, mut grid: ResMut<RailGrid>) {
    for event in events.read() {
        let result = TrackBuildContext::from_anchor(&mut grid, event.anchor)
            .and_then(|context| context.run(&event.commands));
        match result {
            Ok(report) => info!(
                "Track built from {:?}: {} placed, {} removed",
                event.anchor,
                report.placed.len(),
                report.removed.len()
            ),
            Err(e) => warn!("Track build from {:?} stopped: {e}", event.anchor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ends(block: TrackBlock) -> (Side, Side) {
        let d = block.shape.descriptor().rotated(block.rotation);
        (d.start, d.end)
    }

    #[test]
    fn test_block_between_prefers_forward_orientation() {
        let straight = block_between(Side::Back, Side::Front).unwrap();
        assert_eq!(straight.shape, TrackShape::Straight);
        assert_eq!(ends(straight), (Side::Back, Side::Front));

        let left = block_between(Side::Back, Side::Left).unwrap();
        assert_eq!(left.shape, TrackShape::Corner);
        assert_eq!(ends(left), (Side::Back, Side::Left));
    }

    #[test]
    fn test_right_turn_uses_a_reversed_corner() {
        let right = block_between(Side::Back, Side::Right).unwrap();
        assert_eq!(right.shape, TrackShape::Corner);
        assert_eq!(ends(right), (Side::Right, Side::Back));
    }

    #[test]
    fn test_run_lays_a_connected_line() {
        let mut grid = RailGrid::new();
        let report = TrackBuildContext::new(&mut grid, IVec3::ZERO, Side::Front)
            .unwrap()
            .run(&[BuildCommand::Straight, BuildCommand::Straight, BuildCommand::Left])
            .unwrap();
        assert_eq!(
            report.placed,
            vec![IVec3::ZERO, IVec3::new(0, 0, -1), IVec3::new(0, 0, -2)]
        );
        assert_eq!(report.last, Some(IVec3::new(0, 0, -2)));
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.get(IVec3::new(0, 0, -2)).unwrap().shape, TrackShape::Corner);
    }

    #[test]
    fn test_cursor_follows_turns() {
        let mut grid = RailGrid::new();
        let mut context = TrackBuildContext::new(&mut grid, IVec3::ZERO, Side::Front).unwrap();
        context.apply(BuildCommand::Right).unwrap();
        assert_eq!(context.heading(), Side::Right);
        assert_eq!(context.cursor(), IVec3::X);
        context.apply(BuildCommand::Left).unwrap();
        assert_eq!(context.heading(), Side::Front);
        assert_eq!(context.cursor(), IVec3::new(1, 0, -1));
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut grid = RailGrid::new();
        grid.insert(
            IVec3::new(0, 0, -1),
            TrackBlock::new(TrackShape::Straight, Rotation::IDENTITY),
        );
        let err = TrackBuildContext::new(&mut grid, IVec3::ZERO, Side::Front)
            .unwrap()
            .run(&[BuildCommand::Straight, BuildCommand::Straight])
            .unwrap_err();
        assert_eq!(err, BuildError::Occupied(IVec3::new(0, 0, -1)));
        // the first piece stays
        assert!(grid.contains(IVec3::ZERO));
    }

    #[test]
    fn test_remove_and_not_track() {
        let mut grid = RailGrid::new();
        grid.insert(IVec3::ZERO, TrackBlock::new(TrackShape::Straight, Rotation::IDENTITY));
        let report = TrackBuildContext::new(&mut grid, IVec3::ZERO, Side::Front)
            .unwrap()
            .run(&[BuildCommand::Remove])
            .unwrap();
        assert_eq!(report.removed, vec![IVec3::ZERO]);
        assert!(grid.is_empty());

        let err = TrackBuildContext::new(&mut grid, IVec3::ZERO, Side::Front)
            .unwrap()
            .run(&[BuildCommand::Remove])
            .unwrap_err();
        assert_eq!(err, BuildError::NotTrack(IVec3::ZERO));
    }

    #[test]
    fn test_continue_from_existing_block() {
        let mut grid = RailGrid::new();
        grid.insert(
            IVec3::ZERO,
            TrackBlock::new(TrackShape::Corner, Rotation::IDENTITY),
        );
        let context = TrackBuildContext::continue_from(&mut grid, IVec3::ZERO).unwrap();
        assert_eq!(context.heading(), Side::Left);
        assert_eq!(context.cursor(), IVec3::NEG_X);

        assert_eq!(
            TrackBuildContext::continue_from(&mut grid, IVec3::ONE).err(),
            Some(BuildError::NoAnchor(IVec3::ONE))
        );
    }

    #[test]
    fn test_vertical_heading_rejected() {
        let mut grid = RailGrid::new();
        assert_eq!(
            TrackBuildContext::new(&mut grid, IVec3::ZERO, Side::Top).err(),
            Some(BuildError::NoAnchor(IVec3::ZERO))
        );
    }

    #[test]
    fn test_error_display() {
        let msg = format!("{}", BuildError::Occupied(IVec3::new(1, 2, 3)));
        assert!(msg.contains("occupied"), "got: {msg}");
    }

    #[test]
    fn test_up_and_down_step_the_cursor() {
        let mut grid = RailGrid::new();
        let mut context = TrackBuildContext::new(&mut grid, IVec3::ZERO, Side::Front).unwrap();
        context.apply(BuildCommand::Up).unwrap();
        assert_eq!(context.cursor(), IVec3::new(0, 1, -1));
        assert_eq!(context.heading(), Side::Front);
        context.apply(BuildCommand::Down).unwrap();
        assert_eq!(context.cursor(), IVec3::new(0, 0, -2));
        let report = context.finish();
        // the descending ramp sits under the cursor it was laid from
        assert_eq!(report.placed, vec![IVec3::ZERO, IVec3::new(0, 0, -1)]);

        let up = grid.get(IVec3::ZERO).unwrap();
        assert_eq!(up.shape, TrackShape::Ramp);
        assert_eq!(ends(up), (Side::Back, Side::Front));
        let down = grid.get(IVec3::new(0, 0, -1)).unwrap();
        assert_eq!(ends(down), (Side::Front, Side::Back));
    }

    #[test]
    fn test_down_into_occupied_cell_rejected() {
        let mut grid = RailGrid::new();
        grid.insert(
            IVec3::new(0, -1, 0),
            TrackBlock::new(TrackShape::Straight, Rotation::IDENTITY),
        );
        let err = TrackBuildContext::new(&mut grid, IVec3::ZERO, Side::Front)
            .unwrap()
            .run(&[BuildCommand::Down])
            .unwrap_err();
        assert_eq!(err, BuildError::Occupied(IVec3::new(0, -1, 0)));
    }

    #[test]
    fn test_continue_from_a_ramp_top() {
        let mut grid = RailGrid::new();
        grid.insert(IVec3::ZERO, ramp_from(Side::Back).unwrap());
        let context = TrackBuildContext::continue_from(&mut grid, IVec3::ZERO).unwrap();
        assert_eq!(context.cursor(), IVec3::new(0, 1, -1));
        assert_eq!(context.heading(), Side::Front);
    }

    #[test]
    fn test_build_backward_off_an_entry() {
        let mut grid = RailGrid::new();
        grid.insert(
            IVec3::ZERO,
            TrackBlock::new(TrackShape::Straight, Rotation::IDENTITY),
        );
        let report = TrackBuildContext::from_anchor(&mut grid, BuildAnchor::Before(IVec3::ZERO))
            .unwrap()
            .run(&[BuildCommand::Straight, BuildCommand::Left])
            .unwrap();
        assert_eq!(report.placed, vec![IVec3::Z, IVec3::new(0, 0, 2)]);
        // laid heading +Z, so a left turn leaves toward +X
        let corner = grid.get(IVec3::new(0, 0, 2)).unwrap();
        assert_eq!(ends(corner), (Side::Front, Side::Right));

        assert_eq!(
            TrackBuildContext::from_anchor(&mut grid, BuildAnchor::Before(IVec3::ONE)).err(),
            Some(BuildError::NoAnchor(IVec3::ONE))
        );
    }
}
