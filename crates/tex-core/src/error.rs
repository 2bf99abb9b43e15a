//! Error types for tex-core operations.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failure modes shared by all texture
//! operations:
//! - Buffer geometry (bounds checking, stride validation)
//! - Format catalog lookups (unsupported element/layout pairs)
//! - Payload sizing (raw byte slices that do not match the allocation)
//!
//! Higher-level crates (tex-convert, tex-ops, tex-slic, tex-io) define their
//! own error enums and wrap this one with `#[from]`.
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation
//!
//! # Used By
//!
//! - [`crate::buffer::PixelBuffer`] - Construction and pixel access
//! - `tex-convert` - Conversion dispatch
//! - `tex-io` - Container parsing

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing or accessing texture buffers.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel coordinates are outside the logical image bounds.
    #[error("pixel ({x}, {y}) out of bounds for image {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was accessed
        x: u32,
        /// Y coordinate that was accessed
        y: u32,
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Width or height does not fit the allocated stride/vstride,
    /// or a dimension is zero.
    #[error("invalid dimensions: {width}x{height} in {stride}x{vstride} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Allocated stride
        stride: u32,
        /// Allocated vstride
        vstride: u32,
        /// Reason why the geometry is invalid
        reason: String,
    },

    /// The element type and channel layout do not form a catalog entry.
    #[error("unsupported format: {format}")]
    UnsupportedFormat {
        /// Format description
        format: String,
    },

    /// A raw byte payload does not match the buffer allocation size.
    #[error("payload size mismatch: expected {expected} bytes, got {got}")]
    SizeMismatch {
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        got: usize,
    },
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(
        width: u32,
        height: u32,
        stride: u32,
        vstride: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            stride,
            vstride,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates an [`Error::SizeMismatch`] error.
    #[inline]
    pub fn size_mismatch(expected: usize, got: usize) -> Self {
        Self::SizeMismatch { expected, got }
    }

    /// Returns `true` if this is a bounds error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }

    /// Returns `true` if this is a format error.
    #[inline]
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::UnsupportedFormat { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds() {
        let err = Error::out_of_bounds(100, 50, 80, 60);
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("80x60"));
        assert!(err.is_bounds_error());
    }

    #[test]
    fn test_unsupported_format() {
        let err = Error::unsupported_format("I16/Rgba");
        assert!(err.to_string().contains("I16/Rgba"));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_size_mismatch() {
        let err = Error::size_mismatch(256, 255);
        let msg = err.to_string();
        assert!(msg.contains("256"));
        assert!(msg.contains("255"));
    }
}
