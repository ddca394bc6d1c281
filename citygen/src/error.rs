use crate::model::{Point, PointId, SegmentId};
use crate::tasks::TaskKind;
use thiserror::Error;

/// Geometry the kernel cannot work with. Callers can substitute a defined
/// fallback (see [`crate::geometry::math::normalize_or_zero`]).
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum Degenerate {
    #[error("vector is too short to normalize")]
    ZeroLength,
    #[error("envelope width must be positive and finite, got {0}")]
    InvalidWidth(f64),
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(#[from] Degenerate),

    #[error("no path from ({}, {}) to ({}, {})", .from.x, .from.y, .to.x, .to.y)]
    NoPathFound { from: Point, to: Point },

    #[error("point {0} is not part of the graph")]
    UnknownPoint(PointId),

    #[error("segment {0} is not part of the graph")]
    UnknownSegment(SegmentId),

    #[error("{phase} worker for partition {partition} failed: {message}")]
    WorkerFailure {
        phase: &'static str,
        partition: usize,
        message: String,
    },

    #[error("malformed document at {context}: {message}")]
    MalformedDocument { context: String, message: String },

    #[error("invalid configuration for '{param}': {message}")]
    InvalidConfig {
        param: &'static str,
        message: String,
    },

    #[error("{0} generation is already in flight")]
    Busy(TaskKind),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedDocument {
            context: context.into(),
            message: message.into(),
        }
    }

    pub(crate) fn config(param: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            param,
            message: message.into(),
        }
    }
}
