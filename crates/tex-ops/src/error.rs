//! Error types for texture operations.

use thiserror::Error;

/// Error type for texture operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Buffers have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Operation not supported for this format.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Underlying buffer error.
    #[error(transparent)]
    Core(#[from] tex_core::Error),

    /// Underlying conversion error.
    #[error(transparent)]
    Convert(#[from] tex_convert::ConvertError),
}

/// Result type for texture operations.
pub type OpsResult<T> = Result<T, OpsError>;
