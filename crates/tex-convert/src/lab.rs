//! CIE-Lab decomposition.
//!
//! Converts byte RGB/RGBA images into three float luminance planes holding
//! the Lab L, a and b components. The pipeline is sRGB linearization, the
//! D65 XYZ matrix and the Lab transfer function with the standard 0.008856
//! threshold.

use tex_core::{ChannelLayout, ElementType, PixelBuffer};

use crate::error::{ConvertError, ConvertResult};
use crate::hub::{lab_f, srgb_linearize};

/// Decomposes a byte RGB/RGBA buffer into Lab planes.
///
/// Returns `(l, a, b)` as float luminance buffers with the source geometry.
/// L is in `[0, 100]`, a and b are unbounded around zero.
pub fn rgb_to_lab(src: &PixelBuffer) -> ConvertResult<(PixelBuffer, PixelBuffer, PixelBuffer)> {
    let channels = match (src.element(), src.layout()) {
        (ElementType::U8, ChannelLayout::Rgba) => 4usize,
        (ElementType::U8, ChannelLayout::Rgb) => 3usize,
        _ => {
            return Err(ConvertError::Unsupported(format!(
                "{:?}/{:?} (byte RGB or RGBA required)",
                src.element(),
                src.layout()
            )));
        }
    };

    let new_plane = || {
        PixelBuffer::new(
            src.width(),
            src.height(),
            src.stride(),
            src.vstride(),
            tex_core::F32_LUMINANCE,
        )
    };
    let mut labl = new_plane()?;
    let mut laba = new_plane()?;
    let mut labb = new_plane()?;

    let stride = src.stride() as usize;
    for y in 0..src.height() {
        for x in 0..src.width() {
            let idx = y as usize * stride + x as usize;
            let p = &src.bytes()[channels * idx..channels * idx + 3];

            let r = srgb_linearize(p[0] as f32 / 255.0);
            let g = srgb_linearize(p[1] as f32 / 255.0);
            let b = srgb_linearize(p[2] as f32 / 255.0);

            let xx = lab_f((r * 0.4124 + g * 0.3576 + b * 0.1805) / 0.95047);
            let yy = lab_f((r * 0.2126 + g * 0.7152 + b * 0.0722) / 1.00000);
            let zz = lab_f((r * 0.0193 + g * 0.1192 + b * 0.9505) / 1.08883);

            labl.set_pixel_f32(x, y, [116.0 * yy - 16.0, 0.0, 0.0, 0.0])?;
            laba.set_pixel_f32(x, y, [500.0 * (xx - yy), 0.0, 0.0, 0.0])?;
            labb.set_pixel_f32(x, y, [200.0 * (yy - zz), 0.0, 0.0, 0.0])?;
        }
    }

    Ok((labl, laba, labb))
}
