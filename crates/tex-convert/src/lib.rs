//! # tex-convert
//!
//! Pixel format conversions for tex-rs buffers.
//!
//! All conversions route through a byte RGBA hub, so any catalog format can
//! reach any other in at most two kernel passes:
//!
//! - [`convert`] / [`convert_copy`] - General conversion between catalog
//!   formats (packed 16-bit encodings, channel layout changes, float unit
//!   range)
//! - [`convert_range`] / [`convert_range_copy`] - Byte/float remaps over an
//!   explicit value range
//! - [`rgb_to_lab`] - CIE-Lab plane decomposition
//! - [`grayscale_f32`], [`channel_f32`] - Float luminance reductions
//!
//! # Example
//!
//! ```
//! use tex_core::{ChannelLayout, ElementType, PixelBuffer, PixelFormat};
//! use tex_convert::convert_copy;
//!
//! let rgba = PixelBuffer::new(4, 4, 4, 4, tex_core::U8_RGBA)?;
//! let packed = convert_copy(
//!     &rgba,
//!     PixelFormat::new(ElementType::P565, ChannelLayout::Rgb)?,
//! )?;
//! assert_eq!(packed.bytes_per_pixel(), 2);
//! # Ok::<(), tex_convert::ConvertError>(())
//! ```

#![warn(missing_docs)]

mod channel;
mod convert;
mod error;
mod hub;
mod lab;

pub use channel::{channel_f32, grayscale_f32};
pub use convert::{convert, convert_copy, convert_range, convert_range_copy};
pub use error::{ConvertError, ConvertResult};
pub use lab::rgb_to_lab;
