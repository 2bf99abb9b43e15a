//! Error types for container serialization.

use thiserror::Error;

/// Error type for container serialization.
#[derive(Error, Debug)]
pub enum IoError {
    /// Underlying file or stream error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The header magic matched neither byte order.
    #[error("bad magic 0x{0:08X}")]
    BadMagic(u32),

    /// Truncated, oversized or otherwise malformed container data.
    #[error("malformed container: {0}")]
    Malformed(String),

    /// The header names an unknown element or layout code.
    #[error("unknown format code: {0}")]
    UnknownFormat(String),

    /// Underlying buffer error.
    #[error(transparent)]
    Core(#[from] tex_core::Error),
}

/// Result type for container serialization.
pub type IoResult<T> = Result<T, IoError>;
