use std::fmt;

/// Construction-time failures. Runtime topology gaps are `None`, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// A segment needs at least one curve to build its arclength table.
    EmptySegment,
    /// Arclength sampling needs at least one subdivision per curve.
    InvalidSampleCount(usize),
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::EmptySegment => write!(f, "track segment has no curves"),
            TrackError::InvalidSampleCount(n) => {
                write!(f, "invalid arclength sample count: {n} (need at least 1)")
            }
        }
    }
}

impl std::error::Error for TrackError {}
