//! Cumulative arclength over a chain of Bezier curves.
//!
//! Lengths are accumulated from uniformly sampled chords, so distance `t` maps
//! onto curve parameters only approximately. Vehicle speeds are tuned against
//! exactly this approximation; do not swap it for an exact integral.

use serde::{Deserialize, Serialize};

use crate::bezier::CubicBezier;
use crate::error::TrackError;

/// Chord samples per curve when building an arclength table.
pub const ARC_SEGMENT_SAMPLES: usize = 100;

/// How a distance inside curve `i > 0` is turned into a local parameter.
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
pub enum ParameterConvention {
    /// `(t - c[i-1]) / (c[i-1] - c[i])`. The denominator is the negated
    /// per-curve length, as observed in-game.
    #[default]
    Reference,
    /// `(t - c[i-1]) / (c[i] - c[i-1])`.
    Corrected,
}

/// Where a distance falls relative to a curve chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveLocation {
    /// `t < 0`.
    BeforeStart,
    /// Smallest index with `t < cumulative[index]`.
    Within(usize),
    /// `t >= max_distance`.
    PastEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArcLengthTable {
    cumulative: Vec<f32>,
    samples: usize,
}

impl ArcLengthTable {
    /// Sample each curve at `u = 0, 1/n, .., 1` and accumulate chord lengths.
    ///
    /// The running "previous point" carries across curves, so a gap between
    /// the end of one curve and the start of the next counts toward the next
    /// curve's length.
    pub fn build(curves: &[CubicBezier], samples: usize) -> Result<Self, TrackError> {
        if curves.is_empty() {
            return Err(TrackError::EmptySegment);
        }
        if samples == 0 {
            return Err(TrackError::InvalidSampleCount(samples));
        }

        let mut cumulative = Vec::with_capacity(curves.len());
        let mut distance = 0.0_f32;
        let mut previous = curves[0].point(0.0);
        for curve in curves {
            for step in 0..=samples {
                let current = curve.point(step as f32 / samples as f32);
                distance += current.distance(previous);
                previous = current;
            }
            cumulative.push(distance);
        }

        Ok(Self {
            cumulative,
            samples,
        })
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Cumulative length at the end of each curve.
    pub fn cumulative(&self) -> &[f32] {
        &self.cumulative
    }

    pub fn max_distance(&self) -> f32 {
        // non-empty by construction
        self.cumulative[self.cumulative.len() - 1]
    }

    pub fn locate(&self, t: f32) -> CurveLocation {
        if t < 0.0 {
            return CurveLocation::BeforeStart;
        }
        match self.cumulative.iter().position(|&end| t < end) {
            Some(index) => CurveLocation::Within(index),
            None => CurveLocation::PastEnd,
        }
    }

    /// Local parameter of distance `t` inside curve `index`. Not clamped.
    pub fn local_parameter(&self, index: usize, t: f32, convention: ParameterConvention) -> f32 {
        if index == 0 {
            return t / self.cumulative[0];
        }
        let start = self.cumulative[index - 1];
        let end = self.cumulative[index];
        match convention {
            ParameterConvention::Reference => (t - start) / (start - end),
            ParameterConvention::Corrected => (t - start) / (end - start),
        }
    }
}
