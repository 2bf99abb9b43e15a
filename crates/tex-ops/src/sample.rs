//! Subpixel sampling.
//!
//! Both samplers take normalized coordinates in `[0, 1]` mapped over
//! `(width - 1, height - 1)`, so `(0, 0)` is the first pixel center and
//! `(1, 1)` the last.
//!
//! - [`sample_bilinear`] interpolates the 2x2 neighborhood, rounding each
//!   channel to the nearest byte. Samples whose neighborhood would cross
//!   the right or bottom edge snap to the nearest pixel.
//! - [`sample_bicubic`] interpolates a 4x4 neighborhood with the
//!   Catmull-Rom kernel and falls back to bilinear wherever the window
//!   would leave the image.

use tex_core::{ChannelLayout, ElementType, PixelBuffer};

use crate::error::{OpsError, OpsResult};

fn check_sampleable(src: &PixelBuffer) -> OpsResult<()> {
    let ok = src.element() == ElementType::U8
        && matches!(
            src.layout(),
            ChannelLayout::Rgb | ChannelLayout::Rgba | ChannelLayout::Luminance
        );
    if ok {
        Ok(())
    } else {
        Err(OpsError::Unsupported(format!(
            "{:?}/{:?} (byte luminance, RGB or RGBA required)",
            src.element(),
            src.layout()
        )))
    }
}

#[inline]
fn raw(src: &PixelBuffer, x: u32, y: u32, c: usize) -> f32 {
    let bpp = src.bytes_per_pixel();
    src.bytes()[bpp * (y as usize * src.stride() as usize + x as usize) + c] as f32
}

fn assemble(src: &PixelBuffer, channels: &[u8; 4]) -> [u8; 4] {
    match src.layout() {
        ChannelLayout::Rgb => [channels[0], channels[1], channels[2], 0xFF],
        ChannelLayout::Rgba => *channels,
        _ => [channels[0], channels[0], channels[0], 0xFF],
    }
}

/// Samples a byte buffer bilinearly at normalized `(u, v)`.
pub fn sample_bilinear(src: &PixelBuffer, u: f32, v: f32) -> OpsResult<[u8; 4]> {
    check_sampleable(src)?;
    if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
        return Err(OpsError::InvalidParameter(format!(
            "sample coordinates ({u}, {v}) outside the unit square"
        )));
    }

    let x = u * (src.width() - 1) as f32;
    let y = v * (src.height() - 1) as f32;
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;

    // neighborhood crosses the far edge, snap to the pixel itself
    if x0 + 1 >= src.width() || y0 + 1 >= src.height() {
        return Ok(src.pixel(x0, y0)?);
    }

    let s = x - x0 as f32;
    let t = y - y0 as f32;
    let mut channels = [0u8; 4];
    for c in 0..src.bytes_per_pixel() {
        let p00 = raw(src, x0, y0, c);
        let p01 = raw(src, x0 + 1, y0, c);
        let p10 = raw(src, x0, y0 + 1, c);
        let p11 = raw(src, x0 + 1, y0 + 1, c);
        let f = p00 * (1.0 - s) * (1.0 - t)
            + p01 * s * (1.0 - t)
            + p10 * (1.0 - s) * t
            + p11 * s * t;
        channels[c] = (f + 0.5) as u8;
    }
    Ok(assemble(src, &channels))
}

/// Catmull-Rom interpolation of four taps at offset `s` in `[0, 1]` from
/// the second tap.
#[inline]
fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, s: f32) -> f32 {
    p1 + 0.5
        * s
        * (p2 - p0
            + s * (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3 + s * (3.0 * (p1 - p2) + p3 - p0)))
}

/// Samples a byte RGBA buffer bicubically at normalized `(u, v)`.
///
/// Near the borders, where the 4x4 window would leave the image, the
/// sample degrades to [`sample_bilinear`].
pub fn sample_bicubic(src: &PixelBuffer, u: f32, v: f32) -> OpsResult<[u8; 4]> {
    if src.format() != tex_core::U8_RGBA {
        return Err(OpsError::Unsupported(format!(
            "{:?}/{:?} (byte RGBA required)",
            src.element(),
            src.layout()
        )));
    }
    if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
        return Err(OpsError::InvalidParameter(format!(
            "sample coordinates ({u}, {v}) outside the unit square"
        )));
    }

    let x = u * (src.width() - 1) as f32;
    let y = v * (src.height() - 1) as f32;
    let x1 = x.floor() as i64;
    let y1 = y.floor() as i64;

    if x1 < 1
        || y1 < 1
        || x1 + 2 >= src.width() as i64
        || y1 + 2 >= src.height() as i64
    {
        return sample_bilinear(src, u, v);
    }

    let s = x - x1 as f32;
    let t = y - y1 as f32;
    let (x1, y1) = (x1 as u32, y1 as u32);
    let mut channels = [0u8; 4];
    for c in 0..4 {
        // four horizontal passes, then one vertical over their results
        let mut rows = [0.0f32; 4];
        for (m, row) in rows.iter_mut().enumerate() {
            let yy = y1 - 1 + m as u32;
            *row = catmull_rom(
                raw(src, x1 - 1, yy, c),
                raw(src, x1, yy, c),
                raw(src, x1 + 1, yy, c),
                raw(src, x1 + 2, yy, c),
                s,
            );
        }
        let f = catmull_rom(rows[0], rows[1], rows[2], rows[3], t);
        channels[c] = f.clamp(0.0, 255.0) as u8;
    }
    Ok(channels)
}
