//! Builder methods for track and vehicle setup in integration tests.

use bevy::prelude::*;
use tracks::{Rotation, Side};

use crate::motion::pose_at;
use crate::rail_grid::{RailGrid, TrackBlock};
use crate::rail_params::RailParams;
use crate::rail_topology::RailWorld;
use crate::track_builder::{BuildAnchor, BuildCommand, BuildTrackEvent, TrackBuildContext};
use crate::track_catalog::TrackCatalog;
use crate::track_shapes::TrackShape;
use crate::vehicles::{rail_vehicle_bundle, PreviousPose, TrackAttachment};

use super::TestRailway;

impl TestRailway {
    // -----------------------------------------------------------------------
    // Parameters and track
    // -----------------------------------------------------------------------

    /// Replace the rail parameters. The catalog rebuilds on the next tick.
    pub fn with_params(mut self, params: RailParams) -> Self {
        self.app.world_mut().insert_resource(params);
        self
    }

    /// Turn gravity off so vehicles keep a constant speed on any grade.
    pub fn without_gravity(mut self) -> Self {
        self.app.world_mut().resource_mut::<RailParams>().gravity = 0.0;
        self
    }

    /// Place a single block, turned `quarter_turns` counter-clockwise.
    pub fn with_block(mut self, cell: IVec3, shape: TrackShape, quarter_turns: i32) -> Self {
        self.place_block(cell, shape, quarter_turns);
        self
    }

    /// `count` straights starting at `start`, laid toward `heading`.
    pub fn with_straight_line(self, start: IVec3, heading: Side, count: usize) -> Self {
        self.with_track(start, heading, &vec![BuildCommand::Straight; count])
    }

    /// Lay track immediately through a build context, bypassing events.
    pub fn with_track(self, anchor: IVec3, heading: Side, commands: &[BuildCommand]) -> Self {
        self.with_track_from(
            BuildAnchor::At {
                cell: anchor,
                heading,
            },
            commands,
        )
    }

    pub fn with_track_from(mut self, anchor: BuildAnchor, commands: &[BuildCommand]) -> Self {
        let result = {
            let mut grid = self.app.world_mut().resource_mut::<RailGrid>();
            TrackBuildContext::from_anchor(&mut grid, anchor).and_then(|context| context.run(commands))
        };
        if let Err(e) = result {
            panic!("test track from {anchor:?} failed: {e}");
        }
        self
    }

    pub fn place_block(&mut self, cell: IVec3, shape: TrackShape, quarter_turns: i32) {
        self.app
            .world_mut()
            .resource_mut::<RailGrid>()
            .insert(cell, TrackBlock::new(shape, Rotation::from_quarter_turns(quarter_turns)));
    }

    pub fn remove_block(&mut self, cell: IVec3) -> Option<TrackBlock> {
        self.app.world_mut().resource_mut::<RailGrid>().remove(cell)
    }

    /// Queue a build batch; it is applied on the next tick.
    pub fn send_build(&mut self, anchor: IVec3, heading: Side, commands: &[BuildCommand]) {
        self.send_build_from(
            BuildAnchor::At {
                cell: anchor,
                heading,
            },
            commands,
        );
    }

    pub fn send_build_from(&mut self, anchor: BuildAnchor, commands: &[BuildCommand]) {
        self.app.world_mut().send_event(BuildTrackEvent {
            anchor,
            commands: commands.to_vec(),
        });
    }

    // -----------------------------------------------------------------------
    // Vehicles
    // -----------------------------------------------------------------------

    /// Spawn a free unit-height vehicle. It attaches on the next tick if
    /// track lies within the attach distance below it.
    pub fn spawn_vehicle(&mut self, translation: Vec3, velocity: Vec3) -> Entity {
        self.app
            .world_mut()
            .spawn(rail_vehicle_bundle(translation, velocity, 1.0))
            .id()
    }

    /// Spawn a unit-height vehicle already attached at `t` along `block`.
    pub fn spawn_vehicle_on(&mut self, block: IVec3, t: f32, velocity: Vec3) -> Entity {
        let attachment = TrackAttachment { block, t };
        let world = self.app.world();
        let rail_world = RailWorld::new(world.resource::<RailGrid>(), world.resource::<TrackCatalog>());
        let Some((translation, rotation)) =
            pose_at(&rail_world, world.resource::<RailParams>(), attachment, 1.0)
        else {
            panic!("no track at {block} to spawn a vehicle on");
        };

        let (mut vehicle, bounds, mut transform, _) = rail_vehicle_bundle(translation, velocity, 1.0);
        vehicle.attachment = Some(attachment);
        if let Some(rotation) = rotation {
            transform.rotation = rotation;
        }
        let previous = PreviousPose::from_transform(&transform);
        self.app
            .world_mut()
            .spawn((vehicle, bounds, transform, previous))
            .id()
    }
}
