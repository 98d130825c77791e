//! Error types for integration.

use thiserror::Error;

/// Result alias for everything in this crate.
pub type Result<T> = std::result::Result<T, DynError>;

/// Problems with a time grid passed to a trajectory driver.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum GridError {
    /// Fewer than two time points.
    #[error("need at least 2 time points, got {0}")]
    TooShort(usize),
    /// A time point is NaN or infinite.
    #[error("time point {index} is not finite: {value}")]
    NonFinite { index: usize, value: f64 },
    /// `t[index] <= t[index - 1]`.
    #[error("time points must be strictly increasing: t[{index}] = {next} follows {prev}")]
    NotIncreasing { index: usize, prev: f64, next: f64 },
}

/// Returned by all fallible operations.
#[derive(Debug, Error)]
pub enum DynError {
    /// The operator is not square or does not match the state's dimension.
    #[error("shape mismatch: operator has shape {operator:?}, state has shape {state:?}")]
    ShapeMismatch { operator: Vec<usize>, state: Vec<usize> },

    /// Step size is non-positive or non-finite.
    #[error("invalid step size {0}: must be positive and finite")]
    InvalidStep(f64),

    #[error("invalid time grid: {0}")]
    InvalidTimeGrid(#[from] GridError),

    /// States in a trajectory could not be stacked into a single array.
    #[error("could not stack trajectory: {0}")]
    Stack(#[from] ndarray::ShapeError),

    #[error("malformed configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
