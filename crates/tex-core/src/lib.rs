//! # tex-core
//!
//! Core types for stride-padded texture buffers.
//!
//! This crate provides the foundational types used throughout the tex-rs
//! workspace:
//!
//! - [`ElementType`], [`ChannelLayout`], [`PixelFormat`] - The pixel format
//!   catalog (validated element/layout pairs with defined bytes-per-pixel)
//! - [`PixelBuffer`] - Owned pixel storage with logical width/height inside
//!   an allocated stride/vstride, plus bounds-checked pixel accessors
//! - [`Error`], [`Result`] - Shared error taxonomy
//!
//! ## Crate Structure
//!
//! This crate is the foundation of tex-rs and has no internal dependencies.
//! All other tex-rs crates depend on `tex-core`:
//!
//! ```text
//! tex-core (this crate)
//!    ^
//!    |
//!    +-- tex-convert (format conversions)
//!    +-- tex-ops (convolution, scaling, sampling, geometry)
//!    +-- tex-slic (superpixel segmentation)
//!    +-- tex-io (container format)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod format;

// Re-exports for convenience
pub use buffer::*;
pub use error::*;
pub use format::*;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use tex_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::PixelBuffer;
    pub use crate::error::{Error, Result};
    pub use crate::format::{
        ChannelLayout, ElementType, PixelFormat, F32_LUMINANCE, F32_RGBA, U8_LUMINANCE, U8_RGB,
        U8_RGBA,
    };
}
