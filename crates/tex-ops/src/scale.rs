//! Downscaling and resizing.
//!
//! # Overview
//!
//! Two downscale paths with different quality/cost trade-offs:
//!
//! - [`downscale_box`] halves each even dimension by averaging byte
//!   channels. Packed 16-bit buffers round-trip through their byte
//!   equivalent. This is the fast path for building mip chains.
//! - [`lanczos3`] decimates byte RGBA by a power-of-two factor with a
//!   windowed-sinc kernel, producing a whole mip level in one call.
//!
//! [`resize`] stretches byte RGB/RGBA to an arbitrary size with bilinear
//! sampling, and [`build_mip_chain`] stacks box-filter levels.

use tracing::debug;

use tex_core::{ChannelLayout, ElementType, PixelBuffer, PixelFormat};
use tex_convert::{convert_copy, convert_range, convert_range_copy};

use crate::convolve::{convolve, MAX_MASK_SIZE};
use crate::error::{OpsError, OpsResult};
use crate::sample::sample_bilinear;

fn raw(src: &PixelBuffer, x: u32, y: u32, c: usize) -> f32 {
    let bpp = src.bytes_per_pixel();
    src.bytes()[bpp * (y as usize * src.stride() as usize + x as usize) + c] as f32
}

fn downscale_bytes(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    let (w, h) = (src.width(), src.height());
    let bpp = src.bytes_per_pixel();

    if w == 1 && h == 1 {
        return Ok(src.clone());
    }

    let (dw, dh) = (w.max(2) / 2, h.max(2) / 2);
    let mut dst = PixelBuffer::new(dw, dh, dw, dh, src.format())?;
    let dst_stride = dst.stride() as usize;

    if w == 1 {
        // single column, average vertical pairs
        for y in 0..dh {
            for c in 0..bpp {
                let avg = (raw(src, 0, 2 * y, c) + raw(src, 0, 2 * y + 1, c)) / 2.0;
                dst.bytes_mut()[bpp * (y as usize * dst_stride) + c] = avg as u8;
            }
        }
    } else if h == 1 {
        // single row, average horizontal pairs
        for x in 0..dw {
            for c in 0..bpp {
                let avg = (raw(src, 2 * x, 0, c) + raw(src, 2 * x + 1, 0, c)) / 2.0;
                dst.bytes_mut()[bpp * x as usize + c] = avg as u8;
            }
        }
    } else {
        for y in 0..dh {
            for x in 0..dw {
                for c in 0..bpp {
                    let avg = (raw(src, 2 * x, 2 * y, c)
                        + raw(src, 2 * x + 1, 2 * y, c)
                        + raw(src, 2 * x, 2 * y + 1, c)
                        + raw(src, 2 * x + 1, 2 * y + 1, c))
                        / 4.0;
                    dst.bytes_mut()[bpp * (y as usize * dst_stride + x as usize) + c] = avg as u8;
                }
            }
        }
    }
    Ok(dst)
}

/// Halves both dimensions by averaging 2x2 blocks.
///
/// Each dimension must be 1 or even. A 1x1 source copies through, and a
/// single row/column averages pairs along its only axis. Packed 16-bit
/// buffers are unpacked to bytes, averaged, and re-packed.
pub fn downscale_box(src: &PixelBuffer) -> OpsResult<PixelBuffer> {
    let (w, h) = (src.width(), src.height());
    if (w != 1 && w % 2 != 0) || (h != 1 && h % 2 != 0) {
        return Err(OpsError::InvalidDimensions(format!(
            "{w}x{h} (each dimension must be 1 or even)"
        )));
    }

    match src.element() {
        ElementType::U8 => downscale_bytes(src),
        ElementType::P4444 | ElementType::P5551 => {
            let bytes = convert_copy(src, tex_core::U8_RGBA)?;
            let half = downscale_bytes(&bytes)?;
            Ok(convert_copy(&half, src.format())?)
        }
        ElementType::P565 => {
            let bytes = convert_copy(src, tex_core::U8_RGB)?;
            let half = downscale_bytes(&bytes)?;
            Ok(convert_copy(&half, src.format())?)
        }
        _ => Err(OpsError::Unsupported(format!(
            "{:?} element (byte or packed required)",
            src.element()
        ))),
    }
}

fn lanczos3_kernel(x: f32) -> f32 {
    if x.abs() >= 3.0 {
        return 0.0;
    }
    let sinc = |t: f32| if t == 0.0 { 1.0 } else { t.sin() / t };
    let px = std::f32::consts::PI * x;
    sinc(px) * sinc(px / 3.0)
}

/// Decimates a byte RGBA buffer by `2^level` with a Lanczos-3 kernel.
///
/// Both dimensions must be divisible by the scale. The kernel is applied
/// separably, horizontal pass first.
pub fn lanczos3(src: &PixelBuffer, level: u32) -> OpsResult<PixelBuffer> {
    if src.format() != tex_core::U8_RGBA {
        return Err(OpsError::Unsupported(format!(
            "{:?}/{:?} (byte RGBA required)",
            src.element(),
            src.layout()
        )));
    }

    let scale = 1u32 << level;
    if src.width() % scale != 0 || src.height() % scale != 0 {
        return Err(OpsError::InvalidDimensions(format!(
            "{}x{} not divisible by {scale}",
            src.width(),
            src.height()
        )));
    }

    let n = (scale as f32 * 3.0 + 0.01) as usize;
    let size = 2 * n;
    if size >= MAX_MASK_SIZE {
        return Err(OpsError::InvalidParameter(format!(
            "level {level} needs a {size}-tap kernel"
        )));
    }
    debug!(level, scale, taps = size, "lanczos3 decimation");

    // symmetric windowed-sinc taps, filled from the outside in
    let step = 1.0 / scale as f32;
    let mut mask = vec![0.0f32; size];
    let mut x = 3.0 - step / 2.0;
    for i in 0..n {
        let y = lanczos3_kernel(x) / scale as f32;
        mask[i] = y;
        mask[size - 1 - i] = y;
        x -= step;
    }

    let (dw, dh) = (src.width() / scale, src.height() / scale);
    let tex = convert_range_copy(src, 0.0, 1.0, tex_core::F32_RGBA)?;
    let mut conv = PixelBuffer::new(dw, src.height(), dw, src.height(), tex_core::F32_RGBA)?;
    let mut out = PixelBuffer::new(dw, dh, dw, dh, tex_core::F32_RGBA)?;

    convolve(&tex, &mut conv, size, 1, scale, 1, &mask)?;
    convolve(&conv, &mut out, 1, size, 1, scale, &mask)?;

    convert_range(&mut out, 0.0, 1.0, tex_core::U8_RGBA)?;
    Ok(out)
}

/// Stretches a byte RGB/RGBA buffer to `width x height` with bilinear
/// sampling.
pub fn resize(src: &PixelBuffer, width: u32, height: u32) -> OpsResult<PixelBuffer> {
    if src.element() != ElementType::U8
        || !matches!(src.layout(), ChannelLayout::Rgb | ChannelLayout::Rgba)
    {
        return Err(OpsError::Unsupported(format!(
            "{:?}/{:?} (byte RGB or RGBA required)",
            src.element(),
            src.layout()
        )));
    }
    if width == 0 || height == 0 {
        return Err(OpsError::InvalidDimensions(format!("{width}x{height}")));
    }

    let mut dst = PixelBuffer::new(width, height, width, height, src.format())?;
    for i in 0..height {
        let v = (i + 1) as f32 / (height + 1) as f32;
        for j in 0..width {
            let u = (j + 1) as f32 / (width + 1) as f32;
            let pixel = sample_bilinear(src, u, v)?;
            dst.set_pixel(j, i, pixel)?;
        }
    }
    Ok(dst)
}

/// Builds a mip chain with the box filter.
///
/// Level 0 is the input itself; every further level halves the previous
/// one. An odd intermediate dimension fails the whole chain.
pub fn build_mip_chain(buf: PixelBuffer, levels: u32) -> OpsResult<Vec<PixelBuffer>> {
    if levels == 0 {
        return Err(OpsError::InvalidParameter("zero mip levels".into()));
    }

    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(buf);
    for _ in 1..levels {
        let next = downscale_box(chain.last().unwrap())?;
        chain.push(next);
    }
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tex_core::{U8_LUMINANCE, U8_RGBA};

    fn checker(w: u32, h: u32, a: u8, b: u8) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h, w, h, U8_LUMINANCE).unwrap();
        for y in 0..h {
            for x in 0..w {
                let v = if (x + y) % 2 == 0 { a } else { b };
                buf.set_pixel(x, y, [v, 0, 0, 0]).unwrap();
            }
        }
        buf
    }

    #[test]
    fn test_box_checkerboard_average() {
        // every 2x2 block holds two of each value
        let src = checker(4, 4, 100, 200);
        let half = downscale_box(&src).unwrap();
        assert_eq!(half.width(), 2);
        assert_eq!(half.height(), 2);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(half.pixel(x, y).unwrap()[0], 150);
            }
        }
    }

    #[test]
    fn test_box_truncates_average() {
        let mut src = PixelBuffer::new(2, 2, 2, 2, U8_LUMINANCE).unwrap();
        for (i, v) in [0u8, 1, 1, 1].iter().enumerate() {
            src.set_pixel(i as u32 % 2, i as u32 / 2, [*v, 0, 0, 0])
                .unwrap();
        }
        let half = downscale_box(&src).unwrap();
        // 3/4 truncates to zero
        assert_eq!(half.pixel(0, 0).unwrap()[0], 0);
    }

    #[test]
    fn test_box_single_row_and_column() {
        let mut row = PixelBuffer::new(4, 1, 4, 1, U8_LUMINANCE).unwrap();
        for x in 0..4 {
            row.set_pixel(x, 0, [(x * 10) as u8, 0, 0, 0]).unwrap();
        }
        let half = downscale_box(&row).unwrap();
        assert_eq!((half.width(), half.height()), (2, 1));
        assert_eq!(half.pixel(0, 0).unwrap()[0], 5);
        assert_eq!(half.pixel(1, 0).unwrap()[0], 25);

        let one = PixelBuffer::new(1, 1, 1, 1, U8_LUMINANCE).unwrap();
        let copy = downscale_box(&one).unwrap();
        assert_eq!((copy.width(), copy.height()), (1, 1));
    }

    #[test]
    fn test_box_rejects_odd_dimensions() {
        let src = PixelBuffer::new(3, 4, 3, 4, U8_LUMINANCE).unwrap();
        assert!(downscale_box(&src).is_err());
    }

    #[test]
    fn test_box_packed_round_trip() {
        use tex_core::{ChannelLayout, ElementType, PixelFormat};
        let p565 = PixelFormat::new(ElementType::P565, ChannelLayout::Rgb).unwrap();
        let mut rgba = PixelBuffer::new(2, 2, 2, 2, U8_RGBA).unwrap();
        for y in 0..2 {
            for x in 0..2 {
                rgba.set_pixel(x, y, [128, 64, 32, 255]).unwrap();
            }
        }
        let packed = convert_copy(&rgba, p565).unwrap();
        let half = downscale_box(&packed).unwrap();
        assert_eq!(half.format(), p565);
        assert_eq!((half.width(), half.height()), (1, 1));
    }

    #[test]
    fn test_lanczos3_constant_image() {
        let mut src = PixelBuffer::new(8, 8, 8, 8, U8_RGBA).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                src.set_pixel(x, y, [120, 120, 120, 255]).unwrap();
            }
        }
        let half = lanczos3(&src, 1).unwrap();
        assert_eq!((half.width(), half.height()), (4, 4));
        let p = half.pixel(2, 2).unwrap();
        assert!((p[0] as i32 - 120).abs() <= 1);
    }

    #[test]
    fn test_lanczos3_level_zero_keeps_size() {
        let src = PixelBuffer::new(4, 4, 4, 4, U8_RGBA).unwrap();
        let same = lanczos3(&src, 0).unwrap();
        assert_eq!((same.width(), same.height()), (4, 4));
    }

    #[test]
    fn test_lanczos3_validation() {
        let src = PixelBuffer::new(6, 6, 6, 6, U8_RGBA).unwrap();
        assert!(lanczos3(&src, 2).is_err()); // 6 % 4 != 0

        let lum = PixelBuffer::new(8, 8, 8, 8, U8_LUMINANCE).unwrap();
        assert!(lanczos3(&lum, 1).is_err());
    }

    #[test]
    fn test_resize_constant_image() {
        let mut src = PixelBuffer::new(4, 4, 4, 4, U8_RGBA).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                src.set_pixel(x, y, [10, 20, 30, 255]).unwrap();
            }
        }
        let big = resize(&src, 7, 5).unwrap();
        assert_eq!((big.width(), big.height()), (7, 5));
        assert_eq!(big.pixel(3, 2).unwrap(), [10, 20, 30, 255]);
    }

    #[test]
    fn test_mip_chain_sizes() {
        let src = PixelBuffer::new(8, 4, 8, 4, U8_RGBA).unwrap();
        let levels = build_mip_chain(src, 4).unwrap();
        let sizes: Vec<_> = levels.iter().map(|l| (l.width(), l.height())).collect();
        assert_eq!(sizes, vec![(8, 4), (4, 2), (2, 1), (1, 1)]);

        // 6 halves to 3, which the box filter rejects
        let odd = PixelBuffer::new(6, 4, 6, 4, U8_RGBA).unwrap();
        assert!(build_mip_chain(odd, 3).is_err());
    }
}
