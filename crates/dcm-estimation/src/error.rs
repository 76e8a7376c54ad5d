//! Error types for dcm-estimation.

use thiserror::Error;

/// Errors that can occur while recording or writing an estimation dataset.
#[derive(Debug, Error)]
pub enum EstimationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "parquet")]
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "parquet")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// An observation from one model reached a recorder built for another.
    /// Column positions are model-specific, so mixing them would silently
    /// scramble the dataset.
    #[error("observation for model {got} fed to a recorder for {expected}")]
    ModelMismatch { expected: String, got: String },

    #[error("recorder already finished")]
    Finished,
}

/// Alias for `Result<T, EstimationError>`.
pub type EstimationResult<T> = Result<T, EstimationError>;
