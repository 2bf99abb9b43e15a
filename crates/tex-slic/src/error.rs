//! Error types for superpixel segmentation.

use thiserror::Error;

/// Error type for superpixel segmentation.
#[derive(Error, Debug)]
pub enum SlicError {
    /// Input buffer has the wrong format or geometry.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invalid segmentation parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Underlying buffer error.
    #[error(transparent)]
    Core(#[from] tex_core::Error),
}

/// Result type for superpixel segmentation.
pub type SlicResult<T> = Result<T, SlicError>;
