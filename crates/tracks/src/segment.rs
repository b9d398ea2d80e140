//! A piece of track made of one or more Bezier curves with its own arclength
//! parameterization.
//!
//! A segment answers point/tangent/normal queries for a distance `t` measured
//! from its start. When `t` runs off either end, the query is handed to the
//! neighboring segment found through a [`TrackTopology`], re-measuring `t` in
//! the neighbor's parameterization (from its far end when the joint is
//! inverted).

use bevy::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::arc_length::{ArcLengthTable, CurveLocation, ParameterConvention, ARC_SEGMENT_SAMPLES};
use crate::bezier::CubicBezier;
use crate::error::TrackError;
use crate::side::{Rotation, Side};
use crate::topology::{Placement, SegmentRef, TrackTopology};

/// How far past the end of a segment a distance lands on the next one.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub enum CrossingConvention {
    /// `t - max_distance`: the overflow carries into the next segment.
    #[default]
    Overflow,
    /// `max_distance - t`, the literal measure of the reference behavior.
    Reference,
}

/// Declared entry and exit faces of a track shape, before rotation.
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
pub struct PathDescriptor {
    pub start: Side,
    pub end: Side,
}

impl PathDescriptor {
    pub const fn new(start: Side, end: Side) -> Self {
        Self { start, end }
    }

    pub fn rotated(self, rotation: Rotation) -> Self {
        Self {
            start: rotation.rotate_side(self.start),
            end: rotation.rotate_side(self.end),
        }
    }
}

impl Default for PathDescriptor {
    fn default() -> Self {
        Self::new(Side::Back, Side::Front)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentOptions {
    pub samples: usize,
    pub parameter_convention: ParameterConvention,
    pub crossing_convention: CrossingConvention,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            samples: ARC_SEGMENT_SAMPLES,
            parameter_convention: ParameterConvention::default(),
            crossing_convention: CrossingConvention::default(),
        }
    }
}

/// Result of resolving a distance: the segment it landed on, the distance in
/// that segment's parameterization, and the placement it belongs to.
#[derive(Debug)]
pub struct TrackSegmentPair<'a, C> {
    pub t: f32,
    pub segment: &'a TrackSegment,
    pub context: C,
}

impl<C: Copy> Clone for TrackSegmentPair<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Copy> Copy for TrackSegmentPair<'_, C> {}

impl<'a, C: Copy> TrackSegmentPair<'a, C> {
    fn landing(t: f32, on: SegmentRef<'a, C>) -> Self {
        Self {
            t,
            segment: on.segment,
            context: on.context,
        }
    }

    pub fn segment_ref(&self) -> SegmentRef<'a, C> {
        SegmentRef::new(self.segment, self.context)
    }

    pub fn point(&self) -> Vec3 {
        self.segment.point_at(self.t)
    }

    pub fn tangent(&self) -> Vec3 {
        self.segment.tangent_at(self.t)
    }

    pub fn normal(&self) -> Vec3 {
        self.segment.normal_at(self.t)
    }

    pub fn binormal(&self) -> Vec3 {
        self.segment.binormal_at(self.t)
    }
}

#[derive(Debug, Clone)]
pub struct TrackSegment {
    curves: Vec<CubicBezier>,
    arc: ArcLengthTable,
    starting_binormal: Vec3,
    starting_normal: Vec3,
    ends: PathDescriptor,
    rotation: Rotation,
    parameter_convention: ParameterConvention,
    crossing_convention: CrossingConvention,
}

impl TrackSegment {
    /// Build a segment whose starting binormal is derived from world up.
    pub fn new(curves: Vec<CubicBezier>, options: &SegmentOptions) -> Result<Self, TrackError> {
        let Some(first) = curves.first() else {
            return Err(TrackError::EmptySegment);
        };
        let binormal = first.binormal(0.0, Vec3::Y);
        Self::with_binormal(curves, binormal, options)
    }

    pub fn with_binormal(
        curves: Vec<CubicBezier>,
        starting_binormal: Vec3,
        options: &SegmentOptions,
    ) -> Result<Self, TrackError> {
        let arc = ArcLengthTable::build(&curves, options.samples)?;
        let starting_normal = curves[0].tangent(0.0).cross(starting_binormal);
        Ok(Self {
            curves,
            arc,
            starting_binormal,
            starting_normal,
            ends: PathDescriptor::default(),
            rotation: Rotation::IDENTITY,
            parameter_convention: options.parameter_convention,
            crossing_convention: options.crossing_convention,
        })
    }

    /// Label the segment's ends for a placement turned by `rotation`.
    pub fn oriented(mut self, descriptor: PathDescriptor, rotation: Rotation) -> Self {
        self.ends = descriptor.rotated(rotation);
        self.rotation = rotation;
        self
    }

    pub fn curves(&self) -> &[CubicBezier] {
        &self.curves
    }

    pub fn arc_lengths(&self) -> &[f32] {
        self.arc.cumulative()
    }

    pub fn max_distance(&self) -> f32 {
        self.arc.max_distance()
    }

    /// Entry and exit faces after rotation.
    pub fn ends(&self) -> PathDescriptor {
        self.ends
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn starting_binormal(&self) -> Vec3 {
        self.starting_binormal
    }

    pub fn starting_normal(&self) -> Vec3 {
        self.starting_normal
    }

    pub fn locate(&self, t: f32) -> CurveLocation {
        self.arc.locate(t)
    }

    pub fn local_parameter(&self, index: usize, t: f32) -> f32 {
        self.arc.local_parameter(index, t, self.parameter_convention)
    }

    /// Curve index and clamped parameter for a distance on this segment.
    /// Distances off either end pin to that end.
    fn curve_parameter(&self, t: f32) -> (usize, f32) {
        match self.locate(t) {
            CurveLocation::BeforeStart => (0, 0.0),
            CurveLocation::PastEnd => (self.curves.len() - 1, 1.0),
            CurveLocation::Within(index) => (index, self.local_parameter(index, t).clamp(0.0, 1.0)),
        }
    }

    /// Local-space point at `t` on this segment alone, no neighbor lookup.
    pub fn point_at(&self, t: f32) -> Vec3 {
        let (index, u) = self.curve_parameter(t);
        self.curves[index].point(u)
    }

    pub fn tangent_at(&self, t: f32) -> Vec3 {
        let (index, u) = self.curve_parameter(t);
        self.curves[index].tangent(u)
    }

    /// Rotation carrying the starting tangent onto the tangent at `t`.
    /// `None` when either tangent is degenerate.
    fn transport(&self, t: f32) -> Option<Quat> {
        let start = self.curves[0].tangent(0.0);
        let tangent = self.tangent_at(t);
        if start == Vec3::ZERO || tangent == Vec3::ZERO {
            return None;
        }
        Some(Quat::from_rotation_arc(start, tangent))
    }

    /// Starting normal transported along the curve to `t`.
    pub fn normal_at(&self, t: f32) -> Vec3 {
        match self.transport(t) {
            Some(arc) => arc * self.starting_normal,
            None => self.starting_normal,
        }
    }

    pub fn binormal_at(&self, t: f32) -> Vec3 {
        match self.transport(t) {
            Some(arc) => arc * self.starting_binormal,
            None => self.starting_binormal,
        }
    }

    /// Distance along the segment of the sample closest to `target`, with
    /// samples placed into world space by `placement`.
    ///
    /// Samples are scanned in curve order; the first sample at the minimum
    /// distance wins.
    pub fn nearest_t(&self, target: Vec3, placement: &Placement) -> f32 {
        let samples = self.arc.samples();
        let mut result = 0.0;
        let mut closest = f32::MAX;
        let mut travelled = 0.0_f32;
        let mut previous = self.curves[0].point(0.0);
        for curve in &self.curves {
            for step in 0..=samples {
                let current = curve.point(step as f32 / samples as f32);
                travelled += current.distance(previous);
                previous = current;

                let distance = placement.transform_point(current).distance(target);
                if distance < closest {
                    closest = distance;
                    result = travelled;
                }
            }
        }
        result
    }

    /// Resolve `t` to the segment it lies on.
    ///
    /// Inside `[0, max_distance)` this is `(t, self)`. Past the end the next
    /// segment is consulted, before the start the previous one. `None` means
    /// there is no track in that direction.
    pub fn get_track_segment<'a, T: TrackTopology>(
        &'a self,
        t: f32,
        context: T::Context,
        topology: &'a T,
    ) -> Option<TrackSegmentPair<'a, T::Context>> {
        let here = SegmentRef::new(self, context);
        match self.locate(t) {
            CurveLocation::Within(_) => Some(TrackSegmentPair::landing(t, here)),
            CurveLocation::PastEnd => {
                let next = topology.next_of(self, context)?;
                let measured = match self.crossing_convention {
                    CrossingConvention::Overflow => t - self.max_distance(),
                    CrossingConvention::Reference => self.max_distance() - t,
                };
                let result = if topology.is_inverted(here, next) {
                    next.segment.max_distance() - measured
                } else {
                    measured
                };
                Some(TrackSegmentPair::landing(result, next))
            }
            CurveLocation::BeforeStart => {
                let previous = topology.previous_of(self, context)?;
                let mut result = previous.segment.max_distance() + t;
                if topology.is_inverted(previous, here) {
                    result = previous.segment.max_distance() - result;
                }
                Some(TrackSegmentPair::landing(result, previous))
            }
        }
    }

    pub fn point<T: TrackTopology>(&self, t: f32, context: T::Context, topology: &T) -> Option<Vec3> {
        self.get_track_segment(t, context, topology)
            .map(|pair| pair.point())
    }

    pub fn tangent<T: TrackTopology>(
        &self,
        t: f32,
        context: T::Context,
        topology: &T,
    ) -> Option<Vec3> {
        self.get_track_segment(t, context, topology)
            .map(|pair| pair.tangent())
    }

    pub fn normal<T: TrackTopology>(&self, t: f32, context: T::Context, topology: &T) -> Option<Vec3> {
        self.get_track_segment(t, context, topology)
            .map(|pair| pair.normal())
    }

    pub fn binormal<T: TrackTopology>(
        &self,
        t: f32,
        context: T::Context,
        topology: &T,
    ) -> Option<Vec3> {
        self.get_track_segment(t, context, topology)
            .map(|pair| pair.binormal())
    }

    pub fn world_point<T: TrackTopology>(
        &self,
        t: f32,
        context: T::Context,
        topology: &T,
        placement: &Placement,
    ) -> Option<Vec3> {
        self.point(t, context, topology)
            .map(|p| placement.transform_point(p))
    }

    pub fn world_tangent<T: TrackTopology>(
        &self,
        t: f32,
        context: T::Context,
        topology: &T,
        placement: &Placement,
    ) -> Option<Vec3> {
        self.tangent(t, context, topology)
            .map(|v| placement.transform_vector(v))
    }

    pub fn world_normal<T: TrackTopology>(
        &self,
        t: f32,
        context: T::Context,
        topology: &T,
        placement: &Placement,
    ) -> Option<Vec3> {
        self.normal(t, context, topology)
            .map(|v| placement.transform_vector(v))
    }

    pub fn world_binormal<T: TrackTopology>(
        &self,
        t: f32,
        context: T::Context,
        topology: &T,
        placement: &Placement,
    ) -> Option<Vec3> {
        self.binormal(t, context, topology)
            .map(|v| placement.transform_vector(v))
    }
}
