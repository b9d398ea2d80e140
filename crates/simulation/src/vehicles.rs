//! Rail vehicle components and lifecycle events.

use bevy::prelude::*;

/// Where an attached vehicle sits: the placement whose segment it is
/// measured on, and the distance along that segment.
///
/// In the block world the placement is a grid cell; other topologies key
/// their segments however they like.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackAttachment<C = IVec3> {
    pub block: C,
    pub t: f32,
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct RailVehicle {
    /// `None` until a downward scan finds track below the vehicle.
    pub attachment: Option<TrackAttachment>,
    pub velocity: Vec3,
}

impl RailVehicle {
    pub fn with_velocity(velocity: Vec3) -> Self {
        Self {
            attachment: None,
            velocity,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }
}

/// Bounding height, used to lift the vehicle's center off the rail.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct VehicleBounds {
    pub height: f32,
}

impl Default for VehicleBounds {
    fn default() -> Self {
        Self { height: 1.0 }
    }
}

/// Pose before the most recent motion update.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PreviousPose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for PreviousPose {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl PreviousPose {
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            translation: transform.translation,
            rotation: transform.rotation,
        }
    }

    /// Blend from this pose toward `current`; `alpha` is the fraction of the
    /// fixed step elapsed since the last update.
    pub fn interpolate(&self, current: &Transform, alpha: f32) -> Transform {
        let alpha = alpha.clamp(0.0, 1.0);
        Transform {
            translation: self.translation.lerp(current.translation, alpha),
            rotation: self.rotation.slerp(current.rotation, alpha),
            scale: current.scale,
        }
    }
}

#[derive(Event, Debug, Clone, PartialEq)]
pub enum RailVehicleEvent {
    Attached { entity: Entity, block: IVec3, t: f32 },
    Detached { entity: Entity, block: IVec3 },
}

/// Everything a free vehicle needs to be picked up by the motion systems.
pub fn rail_vehicle_bundle(
    translation: Vec3,
    velocity: Vec3,
    height: f32,
) -> (RailVehicle, VehicleBounds, Transform, PreviousPose) {
    let transform = Transform::from_translation(translation);
    (
        RailVehicle::with_velocity(velocity),
        VehicleBounds { height },
        transform,
        PreviousPose::from_transform(&transform),
    )
}
