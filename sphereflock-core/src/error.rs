//! Configuration errors.
//!
//! Every check here runs once, when a world, database or flock is built.
//! Nothing in the per-frame update path can fail.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// World radius must be finite and strictly positive.
    #[error("world radius must be a positive finite number, got {0}")]
    WorldRadius(f32),

    /// The largest of the three behavior radii must be positive, otherwise
    /// no neighbor could ever be found.
    #[error("largest flocking radius must be a positive finite number, got {0}")]
    NeighborRadius(f32),

    /// A behavior's radius, cone cosine or weight is NaN or infinite.
    #[error("{0} radius, angle and weight must all be finite")]
    NonFiniteBehavior(&'static str),

    #[error("obstacle lookahead time must be a positive finite number, got {0}")]
    LookaheadTime(f32),

    #[error("proximity grid dimensions must be positive on every axis")]
    GridDimensions,

    #[error("proximity grid divisions must be at least 1 on every axis and at most {max} bins in total", max = crate::proximity::MAX_GRID_BINS)]
    GridDivisions,
}

pub(crate) fn positive_finite(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
