//! # tex-ops
//!
//! Image-space operations over tex-rs pixel buffers.
//!
//! ```text
//! tex-ops
//!  ├── convolve   separable convolution, gaussian blur
//!  ├── scale      box downscale, lanczos3, resize, mip chains
//!  ├── sample     bilinear and bicubic point sampling
//!  ├── geom       crop, pad, rotate, flip, blit, fill
//!  ├── line       clipped line drawing and profile sampling
//!  └── outline    glyph outline dilation
//! ```
//!
//! Most operations come in `_copy` and in-place pairs; the in-place form
//! rebuilds the buffer and swaps it into the handle, leaving the input
//! untouched on failure.

#![warn(missing_docs)]

mod convolve;
mod error;
mod geom;
mod line;
mod outline;
mod sample;
mod scale;

pub use convolve::{
    convolve, gaussian_blur, gaussian_blur_copy, gaussian_coefficients, MAX_BLUR_SIZE,
    MAX_MASK_SIZE,
};
pub use error::{OpsError, OpsResult};
pub use geom::{
    blit, crop, crop_copy, fill, flip_vertical, flip_vertical_copy, pad, pad_copy, rotate180,
    rotate180_copy, rotate270, rotate270_copy, rotate90, rotate90_copy,
};
pub use line::{draw_line, draw_line_f32, sample_line, LineSample};
pub use outline::outline;
pub use sample::{sample_bicubic, sample_bilinear};
pub use scale::{build_mip_chain, downscale_box, lanczos3, resize};
