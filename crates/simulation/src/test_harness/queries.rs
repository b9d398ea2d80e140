//! Query and simulation-tick methods for `TestRailway`.

use bevy::prelude::*;

use crate::rail_grid::RailGrid;
use crate::rail_params::RailParams;
use crate::track_catalog::TrackCatalog;
use crate::vehicles::{PreviousPose, RailVehicle, RailVehicleEvent, TrackAttachment};
use crate::TickCounter;

use super::TestRailway;

impl TestRailway {
    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks by directly executing the `FixedUpdate`
    /// schedule, bypassing Bevy's virtual clock.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn grid(&self) -> &RailGrid {
        self.app.world().resource::<RailGrid>()
    }

    pub fn catalog(&self) -> &TrackCatalog {
        self.app.world().resource::<TrackCatalog>()
    }

    pub fn params(&self) -> &RailParams {
        self.app.world().resource::<RailParams>()
    }

    pub fn params_mut(&mut self) -> Mut<'_, RailParams> {
        self.app.world_mut().resource_mut::<RailParams>()
    }

    pub fn tick_count(&self) -> u64 {
        self.app.world().resource::<TickCounter>().0
    }

    pub fn vehicle(&self, entity: Entity) -> &RailVehicle {
        self.app
            .world()
            .get::<RailVehicle>(entity)
            .unwrap_or_else(|| panic!("{entity:?} is not a rail vehicle"))
    }

    pub fn attachment(&self, entity: Entity) -> Option<TrackAttachment> {
        self.vehicle(entity).attachment
    }

    pub fn transform(&self, entity: Entity) -> Transform {
        *self
            .app
            .world()
            .get::<Transform>(entity)
            .unwrap_or_else(|| panic!("{entity:?} has no Transform"))
    }

    pub fn previous_pose(&self, entity: Entity) -> PreviousPose {
        *self
            .app
            .world()
            .get::<PreviousPose>(entity)
            .unwrap_or_else(|| panic!("{entity:?} has no PreviousPose"))
    }

    pub fn vehicle_count(&mut self) -> usize {
        self.app
            .world_mut()
            .query::<&RailVehicle>()
            .iter(self.app.world())
            .count()
    }

    /// Take every vehicle event sent since the last drain.
    pub fn drain_vehicle_events(&mut self) -> Vec<RailVehicleEvent> {
        self.app
            .world_mut()
            .resource_mut::<Events<RailVehicleEvent>>()
            .drain()
            .collect()
    }
}
