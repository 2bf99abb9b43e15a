//! # tex-slic
//!
//! SLIC superpixel segmentation over tex-rs float buffers.
//!
//! The segmenter clusters a float RGBA image into an `s x s` superpixel
//! grid. Seeding happens once at construction; the caller drives the
//! iteration explicitly:
//!
//! ```no_run
//! use tex_core::PixelBuffer;
//! use tex_slic::{SlicParams, SlicSegmenter};
//!
//! let input = PixelBuffer::new(256, 256, 256, 256, tex_core::F32_RGBA)?;
//! let params = SlicParams {
//!     superpixel_size: 16,
//!     compactness: 10.0,
//!     outlier_threshold: 0.0,
//!     gradient_neighborhood: 3,
//!     recenter: true,
//! };
//! let mut slic = SlicSegmenter::new(input, params)?;
//! for step in 0..10 {
//!     slic.step(step)?;
//! }
//! let segmented = slic.render(slic.mean())?;
//! # Ok::<(), tex_slic::SlicError>(())
//! ```

#![warn(missing_docs)]

mod error;
mod slic;

pub use error::{SlicError, SlicResult};
pub use slic::{SlicParams, SlicSegmenter};
