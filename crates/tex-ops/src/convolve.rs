//! Separable convolution over float buffers.
//!
//! # Overview
//!
//! [`convolve`] applies a `mask_w x mask_h` kernel to a float source and
//! writes a decimated float destination. The stride pair decimates: a
//! destination pixel is produced every `stride_x`/`stride_y` source pixels,
//! so `src.width == stride_x * dst.width` must hold (and likewise for
//! height). Reads outside the source clamp to the nearest edge pixel.
//!
//! The kernel center sits at `(mask_dim - stride_dim) / 2`:
//!
//! ```text
//! 1) edge detect: stride_x=1, mask_w=3
//!    +---+---+---+
//!    | 0 | 1 | 2 |
//!    +---+---+---+
//!    |   | C |   |
//!    +---+---+---+
//!
//! 2) box downsample: stride_x=2, mask_w=2
//!    +---+---+
//!    | 0 | 1 |
//!    +---+---+
//!    | C |   |
//!    +---+---+
//! ```
//!
//! [`gaussian_blur`] builds a normalized Gaussian mask and runs a
//! horizontal pass followed by a vertical pass over byte RGBA input.

use tracing::debug;

use tex_core::{ElementType, PixelBuffer};
use tex_convert::{convert_range, convert_range_copy};

use crate::error::{OpsError, OpsResult};

/// Largest supported kernel dimension in taps.
pub const MAX_MASK_SIZE: usize = 257;

/// Largest supported Gaussian blur size.
pub const MAX_BLUR_SIZE: usize = 7;

/// Convolves a float source into a float destination, decimating by the
/// stride pair.
pub fn convolve(
    src: &PixelBuffer,
    dst: &mut PixelBuffer,
    mask_w: usize,
    mask_h: usize,
    stride_x: u32,
    stride_y: u32,
    mask: &[f32],
) -> OpsResult<()> {
    if src.element() != ElementType::F32 || dst.element() != ElementType::F32 {
        return Err(OpsError::Unsupported(
            "convolution requires float buffers".into(),
        ));
    }
    if src.channels() != dst.channels() {
        return Err(OpsError::SizeMismatch(format!(
            "channel counts {} vs {}",
            src.channels(),
            dst.channels()
        )));
    }
    if stride_x == 0
        || stride_y == 0
        || src.width() != stride_x * dst.width()
        || src.height() != stride_y * dst.height()
    {
        return Err(OpsError::InvalidDimensions(format!(
            "{}x{} does not decimate to {}x{} by {}x{}",
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
            stride_x,
            stride_y
        )));
    }
    if mask_w == 0 || mask_h == 0 || mask.len() != mask_w * mask_h {
        return Err(OpsError::InvalidParameter(format!(
            "mask length {} for {}x{} kernel",
            mask.len(),
            mask_w,
            mask_h
        )));
    }
    if mask_w > MAX_MASK_SIZE || mask_h > MAX_MASK_SIZE {
        return Err(OpsError::InvalidParameter(format!(
            "kernel {mask_w}x{mask_h} exceeds {MAX_MASK_SIZE} taps"
        )));
    }

    // kernel center offset
    let cm = (mask_h as i64 - stride_y as i64) / 2;
    let cn = (mask_w as i64 - stride_x as i64) / 2;

    let channels = src.channels() as usize;
    let w = src.width() as i64;
    let h = src.height() as i64;
    let mut i = 0i64;
    while i < h {
        let mut j = 0i64;
        while j < w {
            let mut f = [0.0f32; 4];
            for m in 0..mask_h as i64 {
                for n in 0..mask_w as i64 {
                    let pixel = src.clamped_pixel_f32(j + n - cn, i + m - cm)?;
                    let coef = mask[(m as usize) * mask_w + n as usize];
                    for c in 0..channels {
                        f[c] += coef * pixel[c];
                    }
                }
            }
            dst.set_pixel_f32(
                (j / stride_x as i64) as u32,
                (i / stride_y as i64) as u32,
                f,
            )?;
            j += stride_x as i64;
        }
        i += stride_y as i64;
    }
    Ok(())
}

fn gaussian_pdf(sigma: f32, mu: f32, x: f32) -> f32 {
    let a = 1.0 / (sigma * (2.0 * std::f32::consts::PI).sqrt());
    let b = -((x - mu) * (x - mu)) / (2.0 * sigma * sigma);
    a * b.exp()
}

/// Builds normalized Gaussian coefficients for an odd kernel size.
pub fn gaussian_coefficients(sigma: f32, mu: f32, size: usize) -> OpsResult<Vec<f32>> {
    if size == 0 || size % 2 == 0 {
        return Err(OpsError::InvalidParameter(format!(
            "gaussian size {size} must be odd"
        )));
    }

    let w = (size / 2) as i64;
    let mut coefficients = Vec::with_capacity(size);
    let mut sum = 0.0f32;
    for i in 0..size as i64 {
        let c = gaussian_pdf(sigma, mu, (i - w) as f32);
        coefficients.push(c);
        sum += c;
    }

    // scale so the coefficients sum to one
    for c in &mut coefficients {
        *c /= sum;
    }
    Ok(coefficients)
}

/// Gaussian-blurs a byte RGBA buffer, non-destructively.
pub fn gaussian_blur_copy(
    src: &PixelBuffer,
    sigma: f32,
    mu: f32,
    size: usize,
) -> OpsResult<PixelBuffer> {
    if src.format() != tex_core::U8_RGBA {
        return Err(OpsError::Unsupported(format!(
            "{:?}/{:?} (byte RGBA required)",
            src.element(),
            src.layout()
        )));
    }
    if size > MAX_BLUR_SIZE {
        return Err(OpsError::InvalidParameter(format!(
            "blur size {size} exceeds {MAX_BLUR_SIZE}"
        )));
    }
    debug!(sigma, size, "gaussian blur");

    let mask = gaussian_coefficients(sigma, mu, size)?;

    let mut tex = convert_range_copy(src, 0.0, 1.0, tex_core::F32_RGBA)?;
    let mut conv = PixelBuffer::new(
        tex.width(),
        tex.height(),
        tex.stride(),
        tex.vstride(),
        tex_core::F32_RGBA,
    )?;

    convolve(&tex, &mut conv, size, 1, 1, 1, &mask)?;
    convolve(&conv, &mut tex, 1, size, 1, 1, &mask)?;

    convert_range(&mut tex, 0.0, 1.0, tex_core::U8_RGBA)?;
    Ok(tex)
}

/// In-place variant of [`gaussian_blur_copy`].
pub fn gaussian_blur(buf: &mut PixelBuffer, sigma: f32, mu: f32, size: usize) -> OpsResult<()> {
    *buf = gaussian_blur_copy(buf, sigma, mu, size)?;
    Ok(())
}
