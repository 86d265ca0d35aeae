//! Error types for table construction.

use thiserror::Error;

/// Rejected configuration parameters.
///
/// Returned by the fallible constructors; the only recovery is calling
/// again with valid parameters.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// The requested overall capacity was zero.
    #[error("initial capacity must be positive")]
    ZeroCapacity,

    /// The load-gap parameter was outside the open interval (0, 1).
    #[error("delta must be in (0, 1), got {0}")]
    DeltaOutOfRange(f64),
}
