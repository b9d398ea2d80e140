//! Built-in track block shapes, in block-local space.
//!
//! A block occupies the unit cube centered on its cell; rails run along the
//! bottom face (`y = -0.5`). Curves are authored for the unrotated block and
//! turned into place by the block's [`Rotation`] at evaluation time.
//!
//! A ramp climbs one full block: its start sits on the rail plane and its end
//! on the rail plane of the cell above and ahead, so each end carries a lift
//! of 0 or 1 cells alongside its face.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};
use tracks::{CubicBezier, PathDescriptor, Side};

use crate::config::RAIL_PLANE_Y;

/// Control-point distance for a cubic approximation of a quarter circle.
pub const CIRCLE_KAPPA: f32 = 0.552_284_8;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub enum TrackShape {
    Straight,
    Corner,
    /// Straight climb from the start face to the end face one cell up.
    Ramp,
}

impl TrackShape {
    pub const ALL: [TrackShape; 3] = [TrackShape::Straight, TrackShape::Corner, TrackShape::Ramp];

    /// Shapes whose ends both sit on the block's own rail plane.
    pub const LEVEL: [TrackShape; 2] = [TrackShape::Straight, TrackShape::Corner];

    /// Entry and exit faces before rotation.
    pub fn descriptor(self) -> PathDescriptor {
        match self {
            TrackShape::Straight | TrackShape::Ramp => PathDescriptor::new(Side::Back, Side::Front),
            TrackShape::Corner => PathDescriptor::new(Side::Back, Side::Left),
        }
    }

    /// Cells the start and end are raised above the block's rail plane.
    pub fn lifts(self) -> (i32, i32) {
        match self {
            TrackShape::Straight | TrackShape::Corner => (0, 0),
            TrackShape::Ramp => (0, 1),
        }
    }

    pub fn curves(self) -> Vec<CubicBezier> {
        let entry = Vec3::new(0.0, RAIL_PLANE_Y, 0.5);
        match self {
            TrackShape::Straight => {
                vec![CubicBezier::straight(entry, Vec3::new(0.0, RAIL_PLANE_Y, -0.5))]
            }
            TrackShape::Corner => {
                // quarter circle of radius 0.5 around the Left/Back edge
                let handle = CIRCLE_KAPPA * 0.5;
                vec![CubicBezier::new(
                    entry,
                    Vec3::new(0.0, RAIL_PLANE_Y, 0.5 - handle),
                    Vec3::new(-0.5 + handle, RAIL_PLANE_Y, 0.0),
                    Vec3::new(-0.5, RAIL_PLANE_Y, 0.0),
                )]
            }
            TrackShape::Ramp => {
                vec![CubicBezier::straight(entry, Vec3::new(0.0, RAIL_PLANE_Y + 1.0, -0.5))]
            }
        }
    }

    /// Stable save code.
    pub fn code(self) -> u8 {
        match self {
            TrackShape::Straight => 0,
            TrackShape::Corner => 1,
            TrackShape::Ramp => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TrackShape::Straight),
            1 => Some(TrackShape::Corner),
            2 => Some(TrackShape::Ramp),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_center(side: Side) -> Vec3 {
        side.direction().as_vec3() * 0.5 + Vec3::new(0.0, RAIL_PLANE_Y, 0.0)
    }

    #[test]
    fn test_curves_run_between_declared_faces() {
        for shape in TrackShape::ALL {
            let curves = shape.curves();
            let descriptor = shape.descriptor();
            let (start_lift, end_lift) = shape.lifts();
            let start = curves[0].point(0.0);
            let end = curves[curves.len() - 1].point(1.0);
            let raised = |lift: i32| Vec3::Y * lift as f32;
            assert!(
                (start - face_center(descriptor.start) - raised(start_lift)).length() < 1e-6,
                "{shape:?} starts at {start}"
            );
            assert!(
                (end - face_center(descriptor.end) - raised(end_lift)).length() < 1e-6,
                "{shape:?} ends at {end}"
            );
        }
    }

    #[test]
    fn test_corner_stays_near_its_radius() {
        let curve = TrackShape::Corner.curves()[0];
        let center = Vec3::new(-0.5, RAIL_PLANE_Y, 0.5);
        for step in 0..=10 {
            let p = curve.point(step as f32 / 10.0);
            let radius = (p - center).length();
            assert!((radius - 0.5).abs() < 2e-3, "radius {radius} at step {step}");
        }
    }

    #[test]
    fn test_codes_are_stable() {
        for shape in TrackShape::ALL {
            assert_eq!(TrackShape::from_code(shape.code()), Some(shape));
        }
        assert_eq!(TrackShape::from_code(7), None);
    }

    #[test]
    fn test_ramp_climbs_at_forty_five_degrees() {
        let curve = TrackShape::Ramp.curves()[0];
        let tangent = curve.tangent(0.5);
        let grade = Vec3::new(0.0, 1.0, -1.0).normalize();
        assert!((tangent - grade).length() < 1e-5, "got {tangent}");
        assert!(TrackShape::LEVEL.iter().all(|shape| shape.lifts() == (0, 0)));
    }
}
