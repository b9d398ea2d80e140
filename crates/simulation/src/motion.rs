//! Per-tick rail vehicle motion.
//!
//! A free vehicle looks straight down for track and, on a hit, attaches at
//! the nearest point of the block's segment. An attached vehicle has its
//! velocity constrained to the rail tangent and its distance advanced by
//! `velocity . tangent * dt`, crossing into neighboring segments through any
//! [`TrackTopology`]. The systems drive the block world, [`RailWorld`]. The
//! pose is always written at the resolved position.
//!
//! Per vehicle, each tick ends in exactly one [`StepOutcome`]:
//!
//! | outcome | attachment | velocity | pose |
//! |---|---|---|---|
//! | `Moved` | new block and `t` | projected | rail point and tangent frame |
//! | `Blocked` | unchanged | projected | unchanged |
//! | `Degenerate` | unchanged | unchanged | position only |
//! | `Lost` | cleared | unchanged | unchanged |

use bevy::prelude::*;
use tracks::{CurveLocation, TrackSegmentPair, TrackTopology};

use crate::config::VEHICLE_FORWARD;
use crate::rail_grid::RailGrid;
use crate::rail_params::RailParams;
use crate::rail_topology::RailWorld;
use crate::track_catalog::TrackCatalog;
use crate::vehicles::{PreviousPose, RailVehicle, RailVehicleEvent, TrackAttachment, VehicleBounds};

/// Segment hand-offs allowed in one step. A step that needs more stops at
/// the boundary of the last segment reached and continues next tick.
const MAX_HOPS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome<C = IVec3> {
    Moved {
        attachment: TrackAttachment<C>,
        velocity: Vec3,
        translation: Vec3,
        /// `None` when the tangent at the landing point is degenerate.
        rotation: Option<Quat>,
    },
    /// No track in the direction of travel.
    Blocked { velocity: Vec3 },
    /// Zero tangent under the vehicle.
    Degenerate { translation: Vec3 },
    /// The segment the vehicle was attached to no longer exists.
    Lost,
}

/// Result of a successful attach scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment<C = IVec3> {
    pub attachment: TrackAttachment<C>,
    pub velocity: Vec3,
    pub translation: Vec3,
    pub rotation: Option<Quat>,
}

/// Orientation that turns `VEHICLE_FORWARD` onto `tangent`: a yaw onto the
/// tangent's horizontal heading, then a pitch up or down to the grade.
/// `None` for a zero tangent.
pub fn rail_orientation(tangent: Vec3) -> Option<Quat> {
    let direction = tangent.try_normalize()?;
    let yaw = match Vec3::new(direction.x, 0.0, direction.z).try_normalize() {
        Some(heading) => Quat::from_rotation_y((-heading.x).atan2(-heading.z)),
        // straight up or down: no heading to yaw toward
        None => Quat::IDENTITY,
    };
    let pitch = Quat::from_rotation_arc(yaw * VEHICLE_FORWARD, direction);
    Some(pitch * yaw)
}

/// Vehicle center for a vehicle resting on `rail_point`.
pub fn ride_translation(rail_point: Vec3, height: f32, clearance: f32) -> Vec3 {
    rail_point + Vec3::Y * (height * 0.5 + clearance)
}

/// Velocity after gravity along the rail and projection onto `tangent`.
pub fn constrain_velocity(velocity: Vec3, tangent: Vec3, gravity: f32, dt: f32) -> Vec3 {
    let pulled = velocity + tangent * tangent.dot(Vec3::NEG_Y * gravity * dt);
    tangent * pulled.dot(tangent)
}

/// Follow hand-offs until `t` lies inside the segment it is measured on.
///
/// `None` when a hand-off finds no track. Out of hops, the landing is pinned
/// to the end of the last segment reached.
fn settle<'a, T: TrackTopology>(
    world: &'a T,
    mut pair: TrackSegmentPair<'a, T::Context>,
) -> Option<TrackSegmentPair<'a, T::Context>> {
    for _ in 0..MAX_HOPS {
        if matches!(pair.segment.locate(pair.t), CurveLocation::Within(_)) {
            return Some(pair);
        }
        pair = pair.segment.get_track_segment(pair.t, pair.context, world)?;
    }
    if !matches!(pair.segment.locate(pair.t), CurveLocation::Within(_)) {
        debug!(
            "Rail step ran out of hand-offs at {:?}, pinning t={:.3}",
            pair.context, pair.t
        );
        pair.t = pair.t.clamp(0.0, pair.segment.max_distance());
    }
    Some(pair)
}

/// Pose of a vehicle of `height` resting at `attachment`.
pub fn pose_at<T: TrackTopology>(
    world: &T,
    params: &RailParams,
    attachment: TrackAttachment<T::Context>,
    height: f32,
) -> Option<(Vec3, Option<Quat>)> {
    let here = world.segment_at(attachment.block)?;
    let placement = world.placement(attachment.block)?;
    let rail_point = placement.transform_point(here.segment.point_at(attachment.t));
    let tangent = placement.transform_vector(here.segment.tangent_at(attachment.t));
    Some((
        ride_translation(rail_point, height, params.ride_clearance),
        rail_orientation(tangent),
    ))
}

/// Place a vehicle on the track below `position`, if any.
pub fn attach(
    world: &RailWorld,
    params: &RailParams,
    position: Vec3,
    velocity: Vec3,
    height: f32,
) -> Option<Attachment> {
    let block = world.grid.scan_down(position, params.attach_distance)?;
    attach_at(world, params, block, position, velocity, height)
}

/// Place a vehicle at the point of the segment at `context` nearest to
/// `position`.
pub fn attach_at<T: TrackTopology>(
    world: &T,
    params: &RailParams,
    context: T::Context,
    position: Vec3,
    velocity: Vec3,
    height: f32,
) -> Option<Attachment<T::Context>> {
    let here = world.segment_at(context)?;
    let placement = world.placement(context)?;
    let attachment = TrackAttachment {
        block: context,
        t: here.segment.nearest_t(position, &placement),
    };

    let tangent = placement.transform_vector(here.segment.tangent_at(attachment.t));
    let (translation, rotation) = pose_at(world, params, attachment, height)?;
    Some(Attachment {
        attachment,
        velocity: tangent * velocity.dot(tangent),
        translation,
        rotation,
    })
}

/// Advance one attached vehicle by `dt`.
pub fn step_vehicle<T: TrackTopology>(
    world: &T,
    params: &RailParams,
    attachment: TrackAttachment<T::Context>,
    velocity: Vec3,
    height: f32,
    dt: f32,
) -> StepOutcome<T::Context> {
    let (Some(here), Some(placement)) = (
        world.segment_at(attachment.block),
        world.placement(attachment.block),
    ) else {
        return StepOutcome::Lost;
    };

    let local_tangent = here.segment.tangent_at(attachment.t);
    if local_tangent == Vec3::ZERO {
        let rail_point = placement.transform_point(here.segment.point_at(attachment.t));
        return StepOutcome::Degenerate {
            translation: ride_translation(rail_point, height, params.ride_clearance),
        };
    }

    let tangent = placement.transform_vector(local_tangent);
    let velocity = constrain_velocity(velocity, tangent, params.gravity, dt);
    let target = attachment.t + velocity.dot(tangent) * dt;

    let landing = here
        .segment
        .get_track_segment(target, attachment.block, world)
        .and_then(|pair| settle(world, pair))
        .map(|pair| TrackAttachment {
            block: pair.context,
            t: pair.t,
        });
    let Some((attachment, (translation, rotation))) = landing
        .and_then(|landed| pose_at(world, params, landed, height).map(|pose| (landed, pose)))
    else {
        return StepOutcome::Blocked { velocity };
    };

    StepOutcome::Moved {
        attachment,
        velocity,
        translation,
        rotation,
    }
}

type VehicleQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static mut RailVehicle,
        &'static VehicleBounds,
        &'static mut Transform,
        &'static mut PreviousPose,
    ),
>;

/// Look for track below every free vehicle.
pub fn attach_vehicles(
    grid: Res<RailGrid>,
    catalog: Res<TrackCatalog>,
    params: Res<RailParams>,
    mut vehicles: VehicleQuery,
    mut events: EventWriter<RailVehicleEvent>,
) {
    let world = RailWorld::new(&grid, &catalog);
    for (entity, mut vehicle, bounds, mut transform, mut previous) in &mut vehicles {
        if vehicle.is_attached() {
            continue;
        }
        let Some(found) = attach(
            &world,
            &params,
            transform.translation,
            vehicle.velocity,
            bounds.height,
        ) else {
            continue;
        };

        *previous = PreviousPose::from_transform(&transform);
        transform.translation = found.translation;
        if let Some(rotation) = found.rotation {
            transform.rotation = rotation;
        }
        vehicle.velocity = found.velocity;
        vehicle.attachment = Some(found.attachment);

        info!(
            "Rail vehicle {:?} attached to block {} at t={:.3}",
            entity, found.attachment.block, found.attachment.t
        );
        events.send(RailVehicleEvent::Attached {
            entity,
            block: found.attachment.block,
            t: found.attachment.t,
        });
    }
}

/// Advance every attached vehicle by one fixed step.
pub fn advance_vehicles(
    time: Res<Time<Fixed>>,
    grid: Res<RailGrid>,
    catalog: Res<TrackCatalog>,
    params: Res<RailParams>,
    mut vehicles: VehicleQuery,
    mut events: EventWriter<RailVehicleEvent>,
) {
    let dt = time.timestep().as_secs_f32();
    let world = RailWorld::new(&grid, &catalog);
    for (entity, mut vehicle, bounds, mut transform, mut previous) in &mut vehicles {
        let Some(attachment) = vehicle.attachment else {
            continue;
        };
        *previous = PreviousPose::from_transform(&transform);

        let outcome = step_vehicle(
            &world,
            &params,
            attachment,
            vehicle.velocity,
            bounds.height,
            dt,
        );
        match outcome {
            StepOutcome::Blocked { .. } => debug!(
                "Rail vehicle {:?} stalled at end of track on block {} (t={:.3})",
                entity, attachment.block, attachment.t
            ),
            StepOutcome::Lost => {
                info!(
                    "Rail vehicle {:?} detached: block {} is gone",
                    entity, attachment.block
                );
                events.send(RailVehicleEvent::Detached {
                    entity,
                    block: attachment.block,
                });
            }
            StepOutcome::Moved { .. } | StepOutcome::Degenerate { .. } => {}
        }
        apply_step(outcome, &mut vehicle, &mut transform);
    }
}

/// Write a step's result onto the vehicle. Orientation is left as it was
/// wherever the outcome carries none.
pub fn apply_step(outcome: StepOutcome, vehicle: &mut RailVehicle, transform: &mut Transform) {
    match outcome {
        StepOutcome::Moved {
            attachment,
            velocity,
            translation,
            rotation,
        } => {
            vehicle.attachment = Some(attachment);
            vehicle.velocity = velocity;
            transform.translation = translation;
            if let Some(rotation) = rotation {
                transform.rotation = rotation;
            }
        }
        StepOutcome::Blocked { velocity } => vehicle.velocity = velocity,
        StepOutcome::Degenerate { translation } => transform.translation = translation,
        StepOutcome::Lost => vehicle.attachment = None,
    }
}
