//! Parametric track topology for rail vehicles.
//!
//! A [`TrackSegment`] owns a chain of [`CubicBezier`] curves and an
//! [`ArcLengthTable`] over them, and maps a distance `t` to points, tangents
//! and transported normals. Distances outside the segment are resolved into
//! neighboring segments through a [`TrackTopology`], which may flip the
//! direction of measurement at an inverted joint.
//!
//! This crate holds no world state. The block world lives in the
//! `simulation` crate; [`ChainTopology`] is a standalone topology for tests
//! and for track that is not block-backed.

pub mod arc_length;
pub mod bezier;
pub mod chain;
pub mod error;
pub mod segment;
pub mod side;
pub mod topology;

pub use arc_length::{ArcLengthTable, CurveLocation, ParameterConvention, ARC_SEGMENT_SAMPLES};
pub use bezier::CubicBezier;
pub use chain::ChainTopology;
pub use error::TrackError;
pub use segment::{
    CrossingConvention, PathDescriptor, SegmentOptions, TrackSegment, TrackSegmentPair,
};
pub use side::{Rotation, Side};
pub use topology::{sides_inverted, Placement, SegmentRef, TrackTopology};
