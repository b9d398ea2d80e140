//! # TestRailway: headless integration test harness for the rail simulation
//!
//! Wraps `bevy::app::App` + `RailSimulationPlugin` behind a fluent builder so
//! tests can lay track, drop vehicles and drive `FixedUpdate` directly,
//! without a window or renderer.

mod assertions;
mod queries;
mod setup;

use std::time::Duration;

use bevy::app::{App, Plugins};
use bevy::prelude::*;

use crate::RailSimulationPlugin;

/// A headless Bevy App wrapping `RailSimulationPlugin` for integration testing.
///
/// Use builder methods to set up track and vehicles, then call `tick()` to
/// advance the simulation and query/assert on the resulting ECS state.
pub struct TestRailway {
    app: App,
}

impl TestRailway {
    /// An empty railway: no blocks, no vehicles, default parameters and a
    /// 10 Hz fixed step.
    pub fn new() -> Self {
        Self::from_app(App::new())
    }

    /// An empty railway with extra plugins added before the first update.
    pub fn with_plugins<M>(plugins: impl Plugins<M>) -> Self {
        let mut app = App::new();
        app.add_plugins(plugins);
        Self::from_app(app)
    }

    fn from_app(mut app: App) -> Self {
        app.add_plugins(MinimalPlugins);
        app.add_plugins(RailSimulationPlugin);

        // Run one update so Startup systems execute.
        app.update();

        Self { app }
    }

    /// Length of one fixed tick, in seconds.
    pub fn with_timestep(mut self, seconds: f64) -> Self {
        self.app
            .world_mut()
            .resource_mut::<Time<Fixed>>()
            .set_timestep(Duration::from_secs_f64(seconds));
        self
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

impl Default for TestRailway {
    fn default() -> Self {
        Self::new()
    }
}
