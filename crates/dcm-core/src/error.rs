//! Base error type for the `dcm-*` crates.
//!
//! Sub-crates define their own error enums for their own fault domains and
//! keep them separate; `CoreError` only covers the primitives in this crate.

use thiserror::Error;

/// Errors raised by core primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("coefficient index {index} exceeds max parameter {max}")]
    CoefficientOutOfRange { index: usize, max: usize },
}

/// Shorthand result type for `dcm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
