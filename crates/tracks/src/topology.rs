//! The neighbor-lookup capability a segment consults when a distance runs off
//! either end.
//!
//! Implementations resolve neighbors freshly on every query from whatever
//! storage backs them; segments never hold references to each other.

use bevy::math::{Quat, Vec3};

use crate::segment::TrackSegment;

/// A segment paired with the context token that identifies its placement.
#[derive(Debug)]
pub struct SegmentRef<'a, C> {
    pub segment: &'a TrackSegment,
    pub context: C,
}

impl<C: Copy> Clone for SegmentRef<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Copy> Copy for SegmentRef<'_, C> {}

impl<'a, C> SegmentRef<'a, C> {
    pub fn new(segment: &'a TrackSegment, context: C) -> Self {
        Self { segment, context }
    }
}

/// Rigid transform from segment-local space into world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Placement {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Placement {
    pub const IDENTITY: Placement = Placement {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.rotation * local + self.translation
    }

    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }
}

/// Neighbor resolution and joint inversion policy for one kind of track.
pub trait TrackTopology {
    /// Identifies a specific placement of a segment (a block cell, a chain index...).
    type Context: Copy + PartialEq + std::fmt::Debug;

    /// The segment placed at `context`, if that placement still exists.
    fn segment_at(&self, context: Self::Context) -> Option<SegmentRef<'_, Self::Context>>;

    /// The segment joined to `segment`'s start side.
    fn previous_of(
        &self,
        segment: &TrackSegment,
        context: Self::Context,
    ) -> Option<SegmentRef<'_, Self::Context>>;

    /// The segment joined to `segment`'s end side.
    fn next_of(
        &self,
        segment: &TrackSegment,
        context: Self::Context,
    ) -> Option<SegmentRef<'_, Self::Context>>;

    /// Whether distance on `to` is measured from the opposite end when
    /// travelling out of `from`'s end into `to`.
    ///
    /// The default compares declared side labels: the joint is straight only
    /// when `to` starts on the face opposite `from`'s end.
    fn is_inverted(
        &self,
        from: SegmentRef<'_, Self::Context>,
        to: SegmentRef<'_, Self::Context>,
    ) -> bool {
        sides_inverted(from.segment, to.segment)
    }

    /// World transform of the placement at `context`.
    fn placement(&self, context: Self::Context) -> Option<Placement>;
}

/// `from.end.reverse() != to.start`, an exact comparison of side labels.
pub fn sides_inverted(from: &TrackSegment, to: &TrackSegment) -> bool {
    from.ends().end.reverse() != to.ends().start
}
