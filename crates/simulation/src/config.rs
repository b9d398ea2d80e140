use bevy::math::Vec3;

/// How far below a vehicle's center the attach scan reaches.
pub const ATTACH_DISTANCE: f32 = 1.2;

/// Gap left between the underside of a vehicle and the rail.
pub const RIDE_CLEARANCE: f32 = 0.05;

/// Downward acceleration applied along the rail tangent, in units/s^2.
pub const DEFAULT_GRAVITY: f32 = 15.0;

/// The axis a vehicle model faces when its rotation is identity.
pub const VEHICLE_FORWARD: Vec3 = Vec3::NEG_Z;

/// Fixed simulation rate installed by `RailSimulationPlugin`.
pub const DEFAULT_TIMESTEP_HZ: f64 = 10.0;

/// Height of the rail surface relative to a block's cell center.
pub const RAIL_PLANE_Y: f32 = -0.5;
