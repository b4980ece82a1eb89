//! Error types for preprocessing transforms.

use thiserror::Error;

/// Result type for preprocessing operations.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Errors that can occur while transforming a panel.
#[derive(Debug, Error)]
pub enum PrepError {
    /// A key or value column is not present in the input frame
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A column has a dtype the transform cannot operate on
    #[error("Type mismatch in column {column}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Name of the offending column
        column: String,
        /// Description of the accepted dtypes
        expected: &'static str,
        /// The dtype actually found
        found: String,
    },

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
