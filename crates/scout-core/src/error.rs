//! Error types for the planning core.

use thiserror::Error;

/// Failures while deriving an altitude recommendation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TerrainError {
    /// The elevation source was unreachable or returned no samples.
    /// The pending waypoint placement must be abandoned.
    #[error("terrain elevation data unavailable")]
    DataUnavailable,
}
