//! Error types for the Tumble engine.
//!
//! All crates return `TumbleResult<T>` from fallible operations.
//! Contract violations (mutating a locked space, zero-mass bodies)
//! are panics, not errors — see the crate-level docs of `tumble-dynamics`.

use thiserror::Error;

/// Unified error type for the Tumble engine.
#[derive(Debug, Error)]
pub enum TumbleError {
    /// Shape geometry is degenerate or inconsistent.
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Body parameter is out of valid range.
    #[error("Invalid body parameter: {0}")]
    InvalidBody(String),

    /// Constraint definition is degenerate.
    #[error("Invalid constraint: {0}")]
    InvalidConstraint(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, TumbleError>`.
pub type TumbleResult<T> = Result<T, TumbleError>;
