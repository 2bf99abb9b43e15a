//! Error types for format conversion.

use thiserror::Error;

/// Error type for conversion operations.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// No conversion path exists between the two formats.
    #[error("unsupported conversion: {0}")]
    Unsupported(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Underlying buffer error.
    #[error(transparent)]
    Core(#[from] tex_core::Error),
}

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
