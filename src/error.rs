//! Error type for configuration and graph loading.
//!
//! The selection core itself is infallible on well-formed input; only the
//! edges of the crate (config validation, edge-list parsing) return errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PmcError {
    /// At least one Monte-Carlo round is required.
    #[error("rounds must be at least 1")]
    ZeroRounds,

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: probability {value} is outside [0, 1]")]
    InvalidProbability { line: usize, value: f64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
