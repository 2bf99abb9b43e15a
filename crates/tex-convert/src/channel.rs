//! Channel extraction and grayscale reduction.

use tex_core::{ChannelLayout, ElementType, PixelBuffer};

use crate::error::{ConvertError, ConvertResult};

/// Averages a float RGBA buffer into a float luminance buffer.
///
/// All channels participate in the mean, alpha included.
pub fn grayscale_f32(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    if (src.element(), src.layout()) != (ElementType::F32, ChannelLayout::Rgba) {
        return Err(ConvertError::Unsupported(format!(
            "{:?}/{:?} (float RGBA required)",
            src.element(),
            src.layout()
        )));
    }

    let mut dst = PixelBuffer::new(
        src.width(),
        src.height(),
        src.stride(),
        src.vstride(),
        tex_core::F32_LUMINANCE,
    )?;

    let n = src.channels() as f32;
    for y in 0..src.height() {
        for x in 0..src.width() {
            let p = src.pixel_f32(x, y)?;
            let mean = (p[0] + p[1] + p[2] + p[3]) / n;
            dst.set_pixel_f32(x, y, [mean, 0.0, 0.0, 0.0])?;
        }
    }
    Ok(dst)
}

/// Extracts one channel into a float luminance buffer.
///
/// Byte sources remap values by `(max - min) * v / 255 + min`; float sources
/// copy the channel and ignore the range.
pub fn channel_f32(
    src: &PixelBuffer,
    channel: u32,
    min: f32,
    max: f32,
) -> ConvertResult<PixelBuffer> {
    if channel >= src.channels() {
        return Err(ConvertError::InvalidParameter(format!(
            "channel {channel} out of {} channels",
            src.channels()
        )));
    }

    let mut dst = PixelBuffer::new(
        src.width(),
        src.height(),
        src.stride(),
        src.vstride(),
        tex_core::F32_LUMINANCE,
    )?;

    let c = channel as usize;
    match src.element() {
        ElementType::F32 => {
            for y in 0..src.height() {
                for x in 0..src.width() {
                    let p = src.pixel_f32(x, y)?;
                    dst.set_pixel_f32(x, y, [p[c], 0.0, 0.0, 0.0])?;
                }
            }
        }
        ElementType::U8 => {
            for y in 0..src.height() {
                for x in 0..src.width() {
                    let p = src.pixel(x, y)?;
                    let f = (max - min) * p[c] as f32 / 255.0 + min;
                    dst.set_pixel_f32(x, y, [f, 0.0, 0.0, 0.0])?;
                }
            }
        }
        _ => {
            return Err(ConvertError::Unsupported(format!(
                "{:?} element (byte or float required)",
                src.element()
            )));
        }
    }
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tex_core::{F32_RGBA, U8_RGBA};

    #[test]
    fn test_grayscale_includes_alpha() {
        let mut src = PixelBuffer::new(1, 1, 1, 1, F32_RGBA).unwrap();
        src.set_pixel_f32(0, 0, [1.0, 1.0, 1.0, 0.0]).unwrap();
        let gray = grayscale_f32(&src).unwrap();
        assert_relative_eq!(gray.pixel_f32(0, 0).unwrap()[0], 0.75);
    }

    #[test]
    fn test_channel_byte_remap() {
        let mut src = PixelBuffer::new(1, 1, 1, 1, U8_RGBA).unwrap();
        src.set_pixel(0, 0, [255, 0, 0, 0]).unwrap();
        let r = channel_f32(&src, 0, -1.0, 1.0).unwrap();
        assert_relative_eq!(r.pixel_f32(0, 0).unwrap()[0], 1.0);
        let g = channel_f32(&src, 1, -1.0, 1.0).unwrap();
        assert_relative_eq!(g.pixel_f32(0, 0).unwrap()[0], -1.0);
    }

    #[test]
    fn test_channel_out_of_range() {
        let src = PixelBuffer::new(1, 1, 1, 1, tex_core::U8_LUMINANCE).unwrap();
        assert!(channel_f32(&src, 1, 0.0, 1.0).is_err());
    }
}
