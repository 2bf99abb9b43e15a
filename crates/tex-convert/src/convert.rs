//! Conversion dispatch.
//!
//! # Overview
//!
//! [`convert_copy`] routes any catalog format to any other through the byte
//! RGBA hub: the source is expanded to byte RGBA, then packed into the
//! requested format. Float sources and destinations map through the unit
//! range. Signed 16-bit luminance is a storage-only format and admits no
//! conversions in either direction.
//!
//! [`convert`] is the in-place variant. Reinterpreting among the one-byte
//! layouts (luminance, alpha, Lab lightness) just retags the buffer;
//! everything else builds the converted buffer and swaps it into the handle,
//! leaving the original untouched on failure.
//!
//! [`convert_range_copy`]/[`convert_range`] are the explicit-range remaps
//! between byte and float buffers. The byte-to-float direction computes
//! `(max - min) * v / 255 - min`; the remap only round-trips when `min`
//! is zero.

use tex_core::{ChannelLayout, ElementType, PixelBuffer, PixelFormat};

use crate::error::{ConvertError, ConvertResult};
use crate::hub;

fn expand_to_hub(src: &PixelBuffer) -> ConvertResult<Option<PixelBuffer>> {
    use ChannelLayout as L;
    use ElementType as E;

    match (src.element(), src.layout()) {
        // already byte RGBA
        (E::U8, L::Rgba) => Ok(None),
        (E::P4444, L::Rgba) => Ok(Some(hub::expand_4444(src)?)),
        (E::P565, L::Rgb) => Ok(Some(hub::expand_565(src)?)),
        (E::P5551, L::Rgba) => Ok(Some(hub::expand_5551(src)?)),
        (E::U8, L::Rgb) => Ok(Some(hub::expand_rgb(src)?)),
        (E::U8, L::Luminance) => Ok(Some(hub::expand_luminance(src)?)),
        (E::U8, L::Alpha) => Ok(Some(hub::expand_alpha(src)?)),
        (E::U8, L::LuminanceAlpha) => Ok(Some(hub::expand_luminance_alpha(src)?)),
        (E::U8, L::Bgra) => Ok(Some(hub::swizzle_rb(src, L::Rgba)?)),
        (E::F32, L::Luminance) => Ok(Some(hub::expand_f32_luminance(src, 0.0, 1.0)?)),
        (E::F32, L::Rgba) => Ok(Some(hub::expand_f32_rgba(src, 0.0, 1.0)?)),
        _ => Err(ConvertError::Unsupported(format!(
            "{:?}/{:?} cannot expand to byte RGBA",
            src.element(),
            src.layout()
        ))),
    }
}

fn pack_from_hub(hub: &PixelBuffer, format: PixelFormat) -> ConvertResult<Option<PixelBuffer>> {
    use ChannelLayout as L;
    use ElementType as E;

    match (format.element(), format.layout()) {
        (E::U8, L::Rgba) => Ok(None),
        (E::P4444, L::Rgba) => Ok(Some(hub::pack_4444(hub)?)),
        (E::P565, L::Rgb) => Ok(Some(hub::pack_565(hub)?)),
        (E::P5551, L::Rgba) => Ok(Some(hub::pack_5551(hub)?)),
        (E::U8, L::Rgb) => Ok(Some(hub::pack_rgb(hub)?)),
        (E::U8, L::Luminance) => Ok(Some(hub::pack_luminance(hub)?)),
        (E::U8, L::LabL) => Ok(Some(hub::pack_lab_l(hub)?)),
        (E::U8, L::Alpha) => Ok(Some(hub::pack_alpha(hub)?)),
        (E::U8, L::LuminanceAlpha) => Ok(Some(hub::pack_luminance_alpha(hub)?)),
        (E::U8, L::Bgra) => Ok(Some(hub::swizzle_rb(hub, L::Bgra)?)),
        (E::F32, L::Luminance) => Ok(Some(hub::pack_f32_luminance(hub)?)),
        (E::F32, L::Rgba) => Ok(Some(hub::pack_f32_rgba(hub, 0.0, 1.0)?)),
        _ => Err(ConvertError::Unsupported(format!(
            "byte RGBA cannot pack to {:?}/{:?}",
            format.element(),
            format.layout()
        ))),
    }
}

/// Converts a buffer into the requested format, non-destructively.
///
/// A same-format request yields a plain deep copy.
pub fn convert_copy(src: &PixelBuffer, format: PixelFormat) -> ConvertResult<PixelBuffer> {
    // prevents the hub round-trip for byte RGBA to byte RGBA
    if src.format() == format {
        return Ok(src.clone());
    }

    let expanded = expand_to_hub(src)?;
    let hub = expanded.as_ref().unwrap_or(src);

    match pack_from_hub(hub, format)? {
        Some(packed) => Ok(packed),
        // destination is byte RGBA; the expansion is the result
        None => Ok(expanded.unwrap_or_else(|| src.clone())),
    }
}

/// Converts a buffer into the requested format in place.
///
/// Reinterpreting among the one-byte layouts retags without touching the
/// payload. On failure the buffer is left unchanged.
pub fn convert(buf: &mut PixelBuffer, format: PixelFormat) -> ConvertResult<()> {
    if buf.format() == format {
        return Ok(());
    }

    let one_byte = |l: ChannelLayout| {
        matches!(
            l,
            ChannelLayout::Alpha | ChannelLayout::Luminance | ChannelLayout::LabL
        )
    };
    if format.element() == ElementType::U8
        && buf.element() == ElementType::U8
        && one_byte(format.layout())
        && one_byte(buf.layout())
    {
        buf.set_layout(format.layout())?;
        return Ok(());
    }

    *buf = convert_copy(buf, format)?;
    Ok(())
}

/// Remaps between byte and float buffers over an explicit value range,
/// non-destructively.
///
/// Supported pairs: float RGBA to byte RGBA, float luminance to byte RGBA,
/// float luminance to byte luminance, byte luminance to float luminance and
/// byte RGBA to float RGBA.
pub fn convert_range_copy(
    src: &PixelBuffer,
    min: f32,
    max: f32,
    format: PixelFormat,
) -> ConvertResult<PixelBuffer> {
    use ChannelLayout as L;
    use ElementType as E;

    let from = (src.element(), src.layout());
    let to = (format.element(), format.layout());
    match (from, to) {
        ((E::F32, L::Rgba), (E::U8, L::Rgba)) => hub::expand_f32_rgba(src, min, max),
        ((E::F32, L::Luminance), (E::U8, L::Rgba)) => hub::expand_f32_luminance(src, min, max),
        ((E::F32, L::Luminance), (E::U8, L::Luminance)) => {
            hub::pack_u8_luminance_range(src, min, max)
        }
        ((E::U8, L::Luminance), (E::F32, L::Luminance)) => {
            hub::pack_f32_luminance_range(src, min, max)
        }
        ((E::U8, L::Rgba), (E::F32, L::Rgba)) => hub::pack_f32_rgba(src, min, max),
        _ => Err(ConvertError::Unsupported(format!(
            "range remap {:?}/{:?} to {:?}/{:?}",
            src.element(),
            src.layout(),
            format.element(),
            format.layout()
        ))),
    }
}

/// In-place variant of [`convert_range_copy`].
///
/// A same-format request is a no-op success.
pub fn convert_range(
    buf: &mut PixelBuffer,
    min: f32,
    max: f32,
    format: PixelFormat,
) -> ConvertResult<()> {
    if buf.format() == format {
        return Ok(());
    }

    *buf = convert_range_copy(buf, min, max, format)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tex_core::{F32_RGBA, U8_LUMINANCE, U8_RGB, U8_RGBA};

    fn fmt(element: ElementType, layout: ChannelLayout) -> PixelFormat {
        PixelFormat::new(element, layout).unwrap()
    }

    fn rgba_buffer(pixels: &[[u8; 4]]) -> PixelBuffer {
        let n = pixels.len() as u32;
        let mut buf = PixelBuffer::new(n, 1, n, 1, U8_RGBA).unwrap();
        for (x, p) in pixels.iter().enumerate() {
            buf.set_pixel(x as u32, 0, *p).unwrap();
        }
        buf
    }

    #[test]
    fn test_rgb_round_trip() {
        let src = rgba_buffer(&[[10, 20, 30, 255], [200, 100, 50, 255]]);
        let rgb = convert_copy(&src, U8_RGB).unwrap();
        assert_eq!(rgb.bytes(), &[10, 20, 30, 200, 100, 50]);
        let back = convert_copy(&rgb, U8_RGBA).unwrap();
        assert_eq!(back.bytes(), src.bytes());
    }

    #[test]
    fn test_4444_round_trip_exact_for_nibble_values() {
        // 0x11 and 0xEE survive the 4-bit quantization exactly
        let src = rgba_buffer(&[[0x11, 0xEE, 0x11, 0xEE]]);
        let packed = convert_copy(&src, fmt(ElementType::P4444, ChannelLayout::Rgba)).unwrap();
        let back = convert_copy(&packed, U8_RGBA).unwrap();
        assert_eq!(back.bytes(), src.bytes());
    }

    #[test]
    fn test_565_quantization_error_bounds() {
        let src = rgba_buffer(&[[37, 91, 143, 255], [255, 255, 255, 255], [0, 0, 0, 0]]);
        let packed = convert_copy(&src, fmt(ElementType::P565, ChannelLayout::Rgb)).unwrap();
        let back = convert_copy(&packed, U8_RGBA).unwrap();
        for (s, d) in src.bytes().chunks_exact(4).zip(back.bytes().chunks_exact(4)) {
            // 5-bit channels within 8, 6-bit within 4
            assert!((s[0] as i32 - d[0] as i32).abs() <= 8);
            assert!((s[1] as i32 - d[1] as i32).abs() <= 4);
            assert!((s[2] as i32 - d[2] as i32).abs() <= 8);
            assert_eq!(d[3], 255);
        }
    }

    #[test]
    fn test_5551_alpha_threshold() {
        let src = rgba_buffer(&[[0, 0, 0, 127], [0, 0, 0, 128]]);
        let packed = convert_copy(&src, fmt(ElementType::P5551, ChannelLayout::Rgba)).unwrap();
        let back = convert_copy(&packed, U8_RGBA).unwrap();
        assert_eq!(back.pixel(0, 0).unwrap()[3], 0);
        assert_eq!(back.pixel(1, 0).unwrap()[3], 255);
    }

    #[test]
    fn test_bgra_swizzle() {
        let src = rgba_buffer(&[[1, 2, 3, 4]]);
        let bgra = convert_copy(&src, fmt(ElementType::U8, ChannelLayout::Bgra)).unwrap();
        assert_eq!(bgra.bytes(), &[3, 2, 1, 4]);
        let back = convert_copy(&bgra, U8_RGBA).unwrap();
        assert_eq!(back.bytes(), src.bytes());
    }

    #[test]
    fn test_luminance_is_integer_mean() {
        let src = rgba_buffer(&[[10, 20, 31, 255]]);
        let lum = convert_copy(&src, U8_LUMINANCE).unwrap();
        assert_eq!(lum.bytes()[0], 20); // (10+20+31)/3 truncated
    }

    #[test]
    fn test_one_byte_reinterpret_keeps_bytes() {
        let mut buf = PixelBuffer::new(2, 1, 2, 1, U8_LUMINANCE).unwrap();
        buf.set_pixel(0, 0, [42, 0, 0, 0]).unwrap();
        let before = buf.bytes().to_vec();
        convert(&mut buf, fmt(ElementType::U8, ChannelLayout::Alpha)).unwrap();
        assert_eq!(buf.layout(), ChannelLayout::Alpha);
        assert_eq!(buf.bytes(), &before[..]);
    }

    #[test]
    fn test_i16_admits_no_conversions() {
        let i16_lum = fmt(ElementType::I16, ChannelLayout::Luminance);
        let buf = PixelBuffer::new(2, 2, 2, 2, i16_lum).unwrap();
        assert!(convert_copy(&buf, U8_RGBA).is_err());

        let rgba = rgba_buffer(&[[0, 0, 0, 0]]);
        assert!(convert_copy(&rgba, i16_lum).is_err());
    }

    #[test]
    fn test_size_invariant() {
        let src = rgba_buffer(&[[1, 2, 3, 4], [5, 6, 7, 8]]);
        for format in [
            U8_RGB,
            U8_LUMINANCE,
            fmt(ElementType::P565, ChannelLayout::Rgb),
            fmt(ElementType::U8, ChannelLayout::LuminanceAlpha),
            F32_RGBA,
        ] {
            let dst = convert_copy(&src, format).unwrap();
            assert_eq!(dst.width(), src.width());
            assert_eq!(dst.height(), src.height());
            assert_eq!(dst.stride(), src.stride());
            assert_eq!(dst.vstride(), src.vstride());
        }
    }

    #[test]
    fn test_range_remap_zero_min_round_trip() {
        let mut buf = rgba_buffer(&[[0, 51, 204, 255]]);
        let original = buf.bytes().to_vec();
        convert_range(&mut buf, 0.0, 1.0, F32_RGBA).unwrap();
        assert_eq!(buf.element(), ElementType::F32);
        convert_range(&mut buf, 0.0, 1.0, U8_RGBA).unwrap();
        assert_eq!(buf.bytes(), &original[..]);
    }

    #[test]
    fn test_range_remap_unsupported_pair() {
        let buf = rgba_buffer(&[[0, 0, 0, 0]]);
        assert!(convert_range_copy(&buf, 0.0, 1.0, U8_LUMINANCE).is_err());
    }

    #[test]
    fn test_failed_convert_leaves_buffer_untouched() {
        let mut buf = rgba_buffer(&[[9, 9, 9, 9]]);
        let before = buf.bytes().to_vec();
        let i16_lum = fmt(ElementType::I16, ChannelLayout::Luminance);
        assert!(convert(&mut buf, i16_lum).is_err());
        assert_eq!(buf.format(), tex_core::U8_RGBA);
        assert_eq!(buf.bytes(), &before[..]);
    }

    #[test]
    fn test_lab_l_white_and_black() {
        let src = rgba_buffer(&[[255, 255, 255, 255], [0, 0, 0, 255]]);
        let labl = convert_copy(&src, fmt(ElementType::U8, ChannelLayout::LabL)).unwrap();
        assert_eq!(labl.bytes()[0], 255); // L = 100 scales to 255
        assert_eq!(labl.bytes()[1], 0);
    }
}
