//! Geometric transforms.
//!
//! # Overview
//!
//! Rectangular and whole-buffer rearrangements:
//!
//! - [`crop_copy`]/[`crop`] cut an inclusive rectangle into a tight buffer
//! - [`pad_copy`]/[`pad`] grow stride/vstride to the next power of two
//! - [`rotate90_copy`]/[`rotate180_copy`]/[`rotate270_copy`] turn square
//!   byte buffers (plus in-place variants)
//! - [`flip_vertical_copy`]/[`flip_vertical`] mirror rows
//! - [`blit`] copies a rectangle between two same-format buffers
//! - [`fill`] paints a clipped solid rectangle into byte RGBA
//!
//! Row-oriented ops move raw bytes and work for every catalog format; the
//! rotations go through the RGBA pixel accessors and are limited to byte
//! luminance, RGB and RGBA.

use tex_core::PixelBuffer;

use crate::error::{OpsError, OpsResult};

/// Cuts the inclusive rectangle `(top, left)..=(bottom, right)` into a new
/// tight buffer.
pub fn crop_copy(
    src: &PixelBuffer,
    top: u32,
    left: u32,
    bottom: u32,
    right: u32,
) -> OpsResult<PixelBuffer> {
    if top > bottom || left > right || right >= src.width() || bottom >= src.height() {
        return Err(OpsError::InvalidParameter(format!(
            "crop rect top={top} left={left} bottom={bottom} right={right} \
             in {}x{}",
            src.width(),
            src.height()
        )));
    }

    let width = right - left + 1;
    let height = bottom - top + 1;
    let mut dst = PixelBuffer::new(width, height, width, height, src.format())?;

    let bpp = src.bytes_per_pixel();
    let row = bpp * width as usize;
    for y in 0..height as usize {
        let so = bpp * ((y + top as usize) * src.stride() as usize + left as usize);
        let d = y * row;
        dst.bytes_mut()[d..d + row].copy_from_slice(&src.bytes()[so..so + row]);
    }
    Ok(dst)
}

/// In-place variant of [`crop_copy`].
pub fn crop(buf: &mut PixelBuffer, top: u32, left: u32, bottom: u32, right: u32) -> OpsResult<()> {
    *buf = crop_copy(buf, top, left, bottom, right)?;
    Ok(())
}

/// Pads stride and vstride up to the next power of two.
///
/// An already power-of-two buffer copies through unchanged. The logical
/// image stays in the top-left corner and the padding is zero.
pub fn pad_copy(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    let pot_stride = src.stride().next_power_of_two();
    let pot_vstride = src.vstride().next_power_of_two();
    if pot_stride == src.stride() && pot_vstride == src.vstride() {
        return Ok(src.clone());
    }

    let mut dst = PixelBuffer::new(
        src.width(),
        src.height(),
        pot_stride,
        pot_vstride,
        src.format(),
    )?;

    let bpp = src.bytes_per_pixel();
    let row = bpp * src.width() as usize;
    for y in 0..src.height() as usize {
        let so = bpp * y * src.stride() as usize;
        let d = bpp * y * pot_stride as usize;
        dst.bytes_mut()[d..d + row].copy_from_slice(&src.bytes()[so..so + row]);
    }
    Ok(dst)
}

/// In-place variant of [`pad_copy`].
pub fn pad(buf: &mut PixelBuffer) -> OpsResult<()> {
    if buf.stride().is_power_of_two() && buf.vstride().is_power_of_two() {
        return Ok(());
    }
    *buf = pad_copy(buf)?;
    Ok(())
}

fn check_square(src: &PixelBuffer) -> OpsResult<u32> {
    if src.width() == src.height() {
        Ok(src.width())
    } else {
        Err(OpsError::InvalidDimensions(format!(
            "{}x{} (rotation requires a square buffer)",
            src.width(),
            src.height()
        )))
    }
}

fn rotate_with(
    src: &PixelBuffer,
    map: impl Fn(u32, u32, u32) -> (u32, u32),
) -> OpsResult<PixelBuffer> {
    let w = check_square(src)?;
    let mut dst = PixelBuffer::new(
        src.width(),
        src.height(),
        src.stride(),
        src.vstride(),
        src.format(),
    )?;
    for y in 0..src.height() {
        for x in 0..src.width() {
            let pixel = src.pixel(x, y)?;
            let (dx, dy) = map(x, y, w);
            dst.set_pixel(dx, dy, pixel)?;
        }
    }
    Ok(dst)
}

/// Rotates a square byte buffer a quarter turn clockwise.
pub fn rotate90_copy(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    rotate_with(src, |x, y, w| (w - 1 - y, x))
}

/// Rotates a square byte buffer a half turn.
pub fn rotate180_copy(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    rotate_with(src, |x, y, w| (w - 1 - x, w - 1 - y))
}

/// Rotates a square byte buffer a quarter turn counterclockwise.
pub fn rotate270_copy(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    rotate_with(src, |x, y, w| (y, w - 1 - x))
}

/// In-place variant of [`rotate90_copy`].
pub fn rotate90(buf: &mut PixelBuffer) -> OpsResult<()> {
    *buf = rotate90_copy(buf)?;
    Ok(())
}

/// In-place variant of [`rotate180_copy`].
pub fn rotate180(buf: &mut PixelBuffer) -> OpsResult<()> {
    *buf = rotate180_copy(buf)?;
    Ok(())
}

/// In-place variant of [`rotate270_copy`].
pub fn rotate270(buf: &mut PixelBuffer) -> OpsResult<()> {
    *buf = rotate270_copy(buf)?;
    Ok(())
}

/// Mirrors rows top-to-bottom, keeping format and padding.
pub fn flip_vertical_copy(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    let mut dst = PixelBuffer::new(
        src.width(),
        src.height(),
        src.stride(),
        src.vstride(),
        src.format(),
    )?;

    let bpp = src.bytes_per_pixel();
    let row = bpp * src.width() as usize;
    let stride = bpp * src.stride() as usize;
    let height = src.height() as usize;
    for y in 0..height {
        let so = y * stride;
        let d = (height - 1 - y) * stride;
        dst.bytes_mut()[d..d + row].copy_from_slice(&src.bytes()[so..so + row]);
    }
    Ok(dst)
}

/// In-place variant of [`flip_vertical_copy`].
pub fn flip_vertical(buf: &mut PixelBuffer) -> OpsResult<()> {
    *buf = flip_vertical_copy(buf)?;
    Ok(())
}

/// Copies a `width x height` rectangle from `(xs, ys)` in `src` to
/// `(xd, yd)` in `dst`.
///
/// Both buffers must share a format and the rectangle must lie inside both
/// logical images.
pub fn blit(
    src: &PixelBuffer,
    dst: &mut PixelBuffer,
    width: u32,
    height: u32,
    xs: u32,
    ys: u32,
    xd: u32,
    yd: u32,
) -> OpsResult<()> {
    if src.format() != dst.format() {
        return Err(OpsError::Unsupported(format!(
            "blit between {:?}/{:?} and {:?}/{:?}",
            src.element(),
            src.layout(),
            dst.element(),
            dst.layout()
        )));
    }
    if width == 0
        || height == 0
        || xs + width > src.width()
        || ys + height > src.height()
        || xd + width > dst.width()
        || yd + height > dst.height()
    {
        return Err(OpsError::InvalidParameter(format!(
            "blit rect {width}x{height} at src ({xs}, {ys}) dst ({xd}, {yd})"
        )));
    }

    let bpp = src.bytes_per_pixel();
    let bytes = bpp * width as usize;
    for i in 0..height as usize {
        let so = bpp * ((ys as usize + i) * src.stride() as usize + xs as usize);
        let d = bpp * ((yd as usize + i) * dst.stride() as usize + xd as usize);
        dst.bytes_mut()[d..d + bytes].copy_from_slice(&src.bytes()[so..so + bytes]);
    }
    Ok(())
}

/// Fills a clipped solid rectangle in a byte RGBA buffer.
///
/// `color` is packed `0xRRGGBBAA`. Empty or fully offscreen rectangles are
/// silently ignored.
pub fn fill(
    buf: &mut PixelBuffer,
    top: i32,
    left: i32,
    width: i32,
    height: i32,
    color: u32,
) -> OpsResult<()> {
    if buf.format() != tex_core::U8_RGBA {
        return Err(OpsError::Unsupported(format!(
            "{:?}/{:?} (byte RGBA required)",
            buf.element(),
            buf.layout()
        )));
    }
    if width <= 0 || height <= 0 {
        return Ok(());
    }

    let bottom = top + height - 1;
    let right = left + width - 1;
    if top >= buf.height() as i32 || left >= buf.width() as i32 || bottom < 0 || right < 0 {
        return Ok(());
    }

    let top = top.max(0) as u32;
    let left = left.max(0) as u32;
    let bottom = bottom.min(buf.height() as i32 - 1) as u32;
    let right = right.min(buf.width() as i32 - 1) as u32;

    let pixel = [
        ((color >> 24) & 0xFF) as u8,
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
    ];
    for y in top..=bottom {
        for x in left..=right {
            buf.set_pixel(x, y, pixel)?;
        }
    }
    Ok(())
}
