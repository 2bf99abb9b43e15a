//! Glyph outline dilation.
//!
//! # Overview
//!
//! [`outline`] grows a single-channel byte image into a two-channel
//! luminance-alpha buffer whose second channel carries a dilated halo,
//! used for outlined text rendering. The source is copied into the first
//! channel with a border of `size / 2` pixels, then every output pixel
//! scans the perimeter of its `size x size` mask window (interior taps
//! are skipped) and keeps the source value with the highest weighted
//! response.
//!
//! The masks are fixed circular falloff tables for sizes 3, 5, 7, 9
//! and 11.

use tex_core::{ChannelLayout, ElementType, PixelBuffer, PixelFormat};

use crate::error::{OpsError, OpsResult};

const OUTLINE3: [f32; 9] = [
    0.5, 1.0, 0.5, //
    1.0, 1.0, 1.0, //
    0.5, 1.0, 0.5,
];

const OUTLINE5: [f32; 25] = [
    0.19, 0.75, 1.00, 0.75, 0.19, //
    0.75, 1.00, 1.00, 1.00, 0.75, //
    1.00, 1.00, 1.00, 1.00, 1.00, //
    0.75, 1.00, 1.00, 1.00, 0.75, //
    0.19, 0.75, 1.00, 0.75, 0.19,
];

const OUTLINE7: [f32; 49] = [
    0.00, 0.31, 0.88, 1.00, 0.88, 0.31, 0.00, //
    0.31, 1.00, 1.00, 1.00, 1.00, 1.00, 0.31, //
    0.88, 1.00, 1.00, 1.00, 1.00, 1.00, 0.88, //
    1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, //
    0.88, 1.00, 1.00, 1.00, 1.00, 1.00, 0.88, //
    0.31, 1.00, 1.00, 1.00, 1.00, 1.00, 0.31, //
    0.00, 0.31, 0.88, 1.00, 0.88, 0.31, 0.00,
];

const OUTLINE9: [f32; 81] = [
    0.00, 0.06, 0.50, 0.88, 1.00, 0.88, 0.50, 0.06, 0.00, //
    0.06, 0.81, 1.00, 1.00, 1.00, 1.00, 1.00, 0.81, 0.06, //
    0.50, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 0.50, //
    0.88, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 0.88, //
    1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, //
    0.88, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 0.88, //
    0.50, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 0.50, //
    0.06, 0.81, 1.00, 1.00, 1.00, 1.00, 1.00, 0.81, 0.06, //
    0.00, 0.06, 0.50, 0.88, 1.00, 0.88, 0.50, 0.06, 0.00,
];

const OUTLINE11: [f32; 121] = [
    0.00, 0.00, 0.13, 0.63, 0.88, 1.00, 0.88, 0.63, 0.13, 0.00, 0.00, //
    0.00, 0.38, 0.94, 1.00, 1.00, 1.00, 1.00, 1.00, 0.94, 0.38, 0.00, //
    0.13, 0.94, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 0.94, 0.13, //
    0.63, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 0.63, //
    0.88, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 0.88, //
    1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, //
    0.88, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 0.88, //
    0.63, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 0.63, //
    0.13, 0.94, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 0.94, 0.13, //
    0.00, 0.38, 0.94, 1.00, 1.00, 1.00, 1.00, 1.00, 0.94, 0.38, 0.00, //
    0.00, 0.00, 0.13, 0.63, 0.88, 1.00, 0.88, 0.63, 0.13, 0.00, 0.00,
];

fn outline_mask(size: usize) -> Option<&'static [f32]> {
    match size {
        3 => Some(&OUTLINE3),
        5 => Some(&OUTLINE5),
        7 => Some(&OUTLINE7),
        9 => Some(&OUTLINE9),
        11 => Some(&OUTLINE11),
        _ => None,
    }
}

/// Scans the clipped window perimeter at `(i, j)` and stores the winning
/// source value in the second channel.
fn sample_outline(tex: &mut PixelBuffer, i: i64, j: i64, mask: &[f32], size: usize) {
    let off = (size / 2) as i64;
    let stride = tex.stride() as usize;

    // clip the mask window to the buffer
    let mut m0 = 0i64;
    let mut m1 = size as i64 - 1;
    let mut n0 = 0i64;
    let mut n1 = size as i64 - 1;
    let b = tex.height() as i64 - 1;
    let r = tex.width() as i64 - 1;
    if i - off < 0 {
        m0 = off - i;
    }
    if j - off < 0 {
        n0 = off - j;
    }
    if i + off > b {
        m1 -= (i + off) - b;
    }
    if j + off > r {
        n1 -= (j + off) - r;
    }

    let mut max = 0.0f32;
    let mut val = 0u8;
    let mut consider = |m: i64, n: i64, tex: &PixelBuffer| {
        let idx = 2 * ((i + m - off) as usize * stride + (j + n - off) as usize);
        let o = mask[m as usize * size + n as usize];
        let v = tex.bytes()[idx];
        let f = o * v as f32;
        if f > max {
            max = f;
            val = v;
        }
    };

    // left and right window columns, then the top and bottom rows
    for m in (m0 + 1)..m1 {
        consider(m, n0, tex);
        consider(m, n1, tex);
    }
    for n in n0..=n1 {
        consider(m0, n, tex);
        consider(m1, n, tex);
    }

    let idx = 2 * (i as usize * stride + j as usize);
    tex.bytes_mut()[idx + 1] = val;
}

/// Dilates a single-channel byte image into a luminance-alpha outline
/// buffer.
///
/// The source must be byte alpha, luminance or Lab lightness; `size` is
/// one of 3, 5, 7, 9 or 11. The result grows by `size / 2` on every side,
/// rounded up to even dimensions, with the base image in the first
/// channel and the dilated halo in the second.
pub fn outline(src: &PixelBuffer, size: usize) -> OpsResult<PixelBuffer> {
    let Some(mask) = outline_mask(size) else {
        return Err(OpsError::InvalidParameter(format!("outline size {size}")));
    };

    let ok = src.element() == ElementType::U8
        && matches!(
            src.layout(),
            ChannelLayout::Alpha | ChannelLayout::Luminance | ChannelLayout::LabL
        );
    if !ok {
        return Err(OpsError::Unsupported(format!(
            "{:?}/{:?} (byte alpha, luminance or Lab lightness required)",
            src.element(),
            src.layout()
        )));
    }

    let off = (size / 2) as u32;
    let w2 = src.width() + 2 * off;
    let h2 = src.height() + 2 * off;
    let w2r = w2 + w2 % 2;
    let h2r = h2 + h2 % 2;
    let la = PixelFormat::new(ElementType::U8, ChannelLayout::LuminanceAlpha)?;
    let mut tex = PixelBuffer::new(w2r, h2r, w2r, h2r, la)?;

    // copy the base into the first channel
    let stride = tex.stride() as usize;
    for i in 0..src.height() as usize {
        for j in 0..src.width() as usize {
            let v = src.bytes()[i * src.stride() as usize + j];
            let i2 = i + off as usize;
            let j2 = j + off as usize;
            tex.bytes_mut()[2 * (i2 * stride + j2)] = v;
        }
    }

    for i in 0..h2 as i64 {
        for j in 0..w2 as i64 {
            sample_outline(&mut tex, i, j, mask, size);
        }
    }
    Ok(tex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tex_core::U8_LUMINANCE;

    fn dot(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h, w, h, U8_LUMINANCE).unwrap();
        buf.set_pixel(w / 2, h / 2, [255, 0, 0, 0]).unwrap();
        buf
    }

    fn halo(buf: &PixelBuffer, x: u32, y: u32) -> u8 {
        buf.bytes()[2 * (y as usize * buf.stride() as usize + x as usize) + 1]
    }

    #[test]
    fn test_outline_geometry() {
        let src = dot(4, 4);
        let out = outline(&src, 3).unwrap();
        // 4 + 2*1 = 6, already even
        assert_eq!((out.width(), out.height()), (6, 6));
        assert_eq!(out.layout(), ChannelLayout::LuminanceAlpha);

        let src = dot(5, 5);
        let out = outline(&src, 5).unwrap();
        // 5 + 2*2 = 9, rounded up to 10
        assert_eq!((out.width(), out.height()), (10, 10));
    }

    #[test]
    fn test_outline_base_copied_with_offset() {
        let src = dot(4, 4);
        let out = outline(&src, 3).unwrap();
        let base = out.bytes()[2 * (3 * out.stride() as usize + 3)];
        assert_eq!(base, 255);
    }

    #[test]
    fn test_outline_halo_extends_past_base() {
        let src = dot(5, 5);
        let out = outline(&src, 3).unwrap();
        // dot lands at (3, 3) after the offset; full-weight perimeter taps
        // one pixel away pick it up
        assert_eq!(halo(&out, 2, 3), 255);
        assert_eq!(halo(&out, 4, 3), 255);
        assert_eq!(halo(&out, 3, 2), 255);
        assert_eq!(halo(&out, 3, 4), 255);
        // the window center itself is never scanned
        assert_eq!(halo(&out, 3, 3), 0);
        // two pixels out is beyond the 3x3 mask
        assert_eq!(halo(&out, 3, 5), 0);
    }

    #[test]
    fn test_outline_validation() {
        let src = dot(4, 4);
        assert!(outline(&src, 4).is_err());
        assert!(outline(&src, 13).is_err());

        let rgba = PixelBuffer::new(4, 4, 4, 4, tex_core::U8_RGBA).unwrap();
        assert!(outline(&rgba, 3).is_err());
    }
}
