//! Per-format conversion kernels.
//!
//! Every conversion routes through byte RGBA: an `expand_*` kernel unpacks
//! the source into byte RGBA and a `pack_*` kernel encodes byte RGBA into
//! the destination. Kernels run over the full padded allocation (stride by
//! vstride) so padding survives conversion, except the Lab lightness pack
//! which only touches the logical image.
//!
//! Packed encodings use small lookup tables to widen sub-byte channels, with
//! rounding on the widening side and truncation on the narrowing side.

use tex_core::{ChannelLayout, ElementType, PixelBuffer, PixelFormat};

use crate::error::ConvertResult;

fn table_1to8() -> [u8; 2] {
    let mut t = [0u8; 2];
    for (i, v) in t.iter_mut().enumerate() {
        *v = (i as f32 * 255.0 + 0.5) as u8;
    }
    t
}

fn table_4to8() -> [u8; 16] {
    let mut t = [0u8; 16];
    for (i, v) in t.iter_mut().enumerate() {
        *v = (i as f32 * 255.0 / 15.0 + 0.5) as u8;
    }
    t
}

fn table_5to8() -> [u8; 32] {
    let mut t = [0u8; 32];
    for (i, v) in t.iter_mut().enumerate() {
        *v = (i as f32 * 255.0 / 31.0 + 0.5) as u8;
    }
    t
}

fn table_6to8() -> [u8; 64] {
    let mut t = [0u8; 64];
    for (i, v) in t.iter_mut().enumerate() {
        *v = (i as f32 * 255.0 / 63.0 + 0.5) as u8;
    }
    t
}

fn hub_buffer(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    Ok(PixelBuffer::new(
        src.width(),
        src.height(),
        src.stride(),
        src.vstride(),
        tex_core::U8_RGBA,
    )?)
}

fn same_shape(src: &PixelBuffer, format: PixelFormat) -> ConvertResult<PixelBuffer> {
    Ok(PixelBuffer::new(
        src.width(),
        src.height(),
        src.stride(),
        src.vstride(),
        format,
    )?)
}

#[inline]
fn read_f32(bytes: &[u8]) -> f32 {
    f32::from_ne_bytes(bytes.try_into().unwrap())
}

/*
 * expand kernels: source format -> byte RGBA
 */

pub(crate) fn expand_4444(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let mut dst = hub_buffer(src)?;
    let t = table_4to8();
    for (s, d) in src
        .bytes()
        .chunks_exact(2)
        .zip(dst.bytes_mut().chunks_exact_mut(4))
    {
        d[0] = t[((s[1] >> 4) & 0xF) as usize];
        d[1] = t[(s[1] & 0xF) as usize];
        d[2] = t[((s[0] >> 4) & 0xF) as usize];
        d[3] = t[(s[0] & 0xF) as usize];
    }
    Ok(dst)
}

pub(crate) fn expand_565(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let mut dst = hub_buffer(src)?;
    let t5 = table_5to8();
    let t6 = table_6to8();
    for (s, d) in src
        .bytes()
        .chunks_exact(2)
        .zip(dst.bytes_mut().chunks_exact_mut(4))
    {
        let p = u16::from_le_bytes([s[0], s[1]]);
        d[0] = t5[((p >> 11) & 0x1F) as usize];
        d[1] = t6[((p >> 5) & 0x3F) as usize];
        d[2] = t5[(p & 0x1F) as usize];
        d[3] = 0xFF;
    }
    Ok(dst)
}

pub(crate) fn expand_5551(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let mut dst = hub_buffer(src)?;
    let t5 = table_5to8();
    let t1 = table_1to8();
    for (s, d) in src
        .bytes()
        .chunks_exact(2)
        .zip(dst.bytes_mut().chunks_exact_mut(4))
    {
        let p = u16::from_le_bytes([s[0], s[1]]);
        d[0] = t5[((p >> 11) & 0x1F) as usize];
        d[1] = t5[((p >> 6) & 0x1F) as usize];
        d[2] = t5[((p >> 1) & 0x1F) as usize];
        d[3] = t1[(p & 0x1) as usize];
    }
    Ok(dst)
}

pub(crate) fn expand_rgb(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let mut dst = hub_buffer(src)?;
    for (s, d) in src
        .bytes()
        .chunks_exact(3)
        .zip(dst.bytes_mut().chunks_exact_mut(4))
    {
        d[..3].copy_from_slice(s);
        d[3] = 0xFF;
    }
    Ok(dst)
}

pub(crate) fn expand_luminance(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let mut dst = hub_buffer(src)?;
    for (s, d) in src.bytes().iter().zip(dst.bytes_mut().chunks_exact_mut(4)) {
        d[0] = *s;
        d[1] = *s;
        d[2] = *s;
        d[3] = 0xFF;
    }
    Ok(dst)
}

pub(crate) fn expand_alpha(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let mut dst = hub_buffer(src)?;
    for (s, d) in src.bytes().iter().zip(dst.bytes_mut().chunks_exact_mut(4)) {
        d[0] = 0xFF;
        d[1] = 0xFF;
        d[2] = 0xFF;
        d[3] = *s;
    }
    Ok(dst)
}

pub(crate) fn expand_luminance_alpha(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let mut dst = hub_buffer(src)?;
    for (s, d) in src
        .bytes()
        .chunks_exact(2)
        .zip(dst.bytes_mut().chunks_exact_mut(4))
    {
        d[0] = s[0];
        d[1] = s[0];
        d[2] = s[0];
        d[3] = s[1];
    }
    Ok(dst)
}

pub(crate) fn expand_f32_luminance(
    src: &PixelBuffer,
    min: f32,
    max: f32,
) -> ConvertResult<PixelBuffer> {
    let mut dst = hub_buffer(src)?;
    for (s, d) in src
        .bytes()
        .chunks_exact(4)
        .zip(dst.bytes_mut().chunks_exact_mut(4))
    {
        let f = read_f32(s);
        let b = (255.0 * (f - min) / (max - min)).clamp(0.0, 255.0) as u8;
        d[0] = b;
        d[1] = b;
        d[2] = b;
        d[3] = 0xFF;
    }
    Ok(dst)
}

pub(crate) fn expand_f32_rgba(
    src: &PixelBuffer,
    min: f32,
    max: f32,
) -> ConvertResult<PixelBuffer> {
    let mut dst = hub_buffer(src)?;
    for (s, d) in src
        .bytes()
        .chunks_exact(16)
        .zip(dst.bytes_mut().chunks_exact_mut(4))
    {
        for c in 0..4 {
            let f = read_f32(&s[4 * c..4 * c + 4]);
            d[c] = (255.0 * (f - min) / (max - min)).clamp(0.0, 255.0) as u8;
        }
    }
    Ok(dst)
}

/// RGBA/BGRA swizzle, same bytes with r and b swapped.
pub(crate) fn swizzle_rb(src: &PixelBuffer, layout: ChannelLayout) -> ConvertResult<PixelBuffer> {
    let format = PixelFormat::new(ElementType::U8, layout)?;
    let mut dst = same_shape(src, format)?;
    for (s, d) in src
        .bytes()
        .chunks_exact(4)
        .zip(dst.bytes_mut().chunks_exact_mut(4))
    {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
        d[3] = s[3];
    }
    Ok(dst)
}

/*
 * pack kernels: byte RGBA -> destination format
 */

pub(crate) fn pack_4444(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let format = PixelFormat::new(ElementType::P4444, ChannelLayout::Rgba)?;
    let mut dst = same_shape(src, format)?;
    for (s, d) in src
        .bytes()
        .chunks_exact(4)
        .zip(dst.bytes_mut().chunks_exact_mut(2))
    {
        let r = (s[0] >> 4) & 0x0F;
        let g = (s[1] >> 4) & 0x0F;
        let b = (s[2] >> 4) & 0x0F;
        let a = (s[3] >> 4) & 0x0F;
        d[0] = a | (b << 4);
        d[1] = g | (r << 4);
    }
    Ok(dst)
}

pub(crate) fn pack_565(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let format = PixelFormat::new(ElementType::P565, ChannelLayout::Rgb)?;
    let mut dst = same_shape(src, format)?;
    for (s, d) in src
        .bytes()
        .chunks_exact(4)
        .zip(dst.bytes_mut().chunks_exact_mut(2))
    {
        let r = (s[0] >> 3) & 0x1F;
        let g = (s[1] >> 2) & 0x3F;
        let b = (s[2] >> 3) & 0x1F;

        // RGB from the most significant bit
        d[0] = b | ((g << 5) & 0xE0);
        d[1] = (g >> 3) | (r << 3);
    }
    Ok(dst)
}

pub(crate) fn pack_5551(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let format = PixelFormat::new(ElementType::P5551, ChannelLayout::Rgba)?;
    let mut dst = same_shape(src, format)?;
    for (s, d) in src
        .bytes()
        .chunks_exact(4)
        .zip(dst.bytes_mut().chunks_exact_mut(2))
    {
        let r = (s[0] >> 3) & 0x1F;
        let g = (s[1] >> 3) & 0x1F;
        let b = (s[2] >> 3) & 0x1F;
        let a = (s[3] >> 7) & 0x01;

        // RGBA from the most significant bit
        d[0] = a | ((b << 1) & 0x3E) | ((g << 6) & 0xC0);
        d[1] = (g >> 2) | ((r << 3) & 0xF8);
    }
    Ok(dst)
}

pub(crate) fn pack_rgb(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let mut dst = same_shape(src, tex_core::U8_RGB)?;
    for (s, d) in src
        .bytes()
        .chunks_exact(4)
        .zip(dst.bytes_mut().chunks_exact_mut(3))
    {
        d.copy_from_slice(&s[..3]);
    }
    Ok(dst)
}

pub(crate) fn pack_luminance(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let mut dst = same_shape(src, tex_core::U8_LUMINANCE)?;
    for (s, d) in src.bytes().chunks_exact(4).zip(dst.bytes_mut().iter_mut()) {
        let l = (s[0] as u32 + s[1] as u32 + s[2] as u32) / 3;
        *d = l.min(0xFF) as u8;
    }
    Ok(dst)
}

pub(crate) fn pack_alpha(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let format = PixelFormat::new(ElementType::U8, ChannelLayout::Alpha)?;
    let mut dst = same_shape(src, format)?;
    for (s, d) in src.bytes().chunks_exact(4).zip(dst.bytes_mut().iter_mut()) {
        *d = s[3];
    }
    Ok(dst)
}

pub(crate) fn pack_luminance_alpha(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let format = PixelFormat::new(ElementType::U8, ChannelLayout::LuminanceAlpha)?;
    let mut dst = same_shape(src, format)?;
    for (s, d) in src
        .bytes()
        .chunks_exact(4)
        .zip(dst.bytes_mut().chunks_exact_mut(2))
    {
        let l = (s[0] as u32 + s[1] as u32 + s[2] as u32) / 3;
        d[0] = l as u8;
        d[1] = s[3];
    }
    Ok(dst)
}

pub(crate) fn pack_lab_l(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let format = PixelFormat::new(ElementType::U8, ChannelLayout::LabL)?;
    let mut dst = same_shape(src, format)?;

    let stride = src.stride() as usize;
    for y in 0..src.height() as usize {
        for x in 0..src.width() as usize {
            let idx = y * stride + x;
            let s = &src.bytes()[4 * idx..4 * idx + 4];

            let yy = srgb_to_y(s[0], s[1], s[2]);
            let fy = lab_f(yy);
            let labl = ((255.0 / 100.0) * (116.0 * fy - 16.0)).clamp(0.0, 255.0);
            dst.bytes_mut()[idx] = labl as u8;
        }
    }
    Ok(dst)
}

pub(crate) fn pack_f32_luminance(src: &PixelBuffer) -> ConvertResult<PixelBuffer> {
    let mut dst = same_shape(src, tex_core::F32_LUMINANCE)?;
    for (s, d) in src
        .bytes()
        .chunks_exact(4)
        .zip(dst.bytes_mut().chunks_exact_mut(4))
    {
        // the red channel carries luminance
        let f = s[0] as f32 / 255.0;
        d.copy_from_slice(&f.to_ne_bytes());
    }
    Ok(dst)
}

pub(crate) fn pack_f32_rgba(src: &PixelBuffer, min: f32, max: f32) -> ConvertResult<PixelBuffer> {
    let mut dst = same_shape(src, tex_core::F32_RGBA)?;
    for (s, d) in src
        .bytes()
        .chunks_exact(4)
        .zip(dst.bytes_mut().chunks_exact_mut(16))
    {
        for c in 0..4 {
            // offset subtracts min; round-trips only when min is zero
            let f = (max - min) * s[c] as f32 / 255.0 - min;
            d[4 * c..4 * c + 4].copy_from_slice(&f.to_ne_bytes());
        }
    }
    Ok(dst)
}

pub(crate) fn pack_f32_luminance_range(
    src: &PixelBuffer,
    min: f32,
    max: f32,
) -> ConvertResult<PixelBuffer> {
    let mut dst = same_shape(src, tex_core::F32_LUMINANCE)?;
    for (s, d) in src.bytes().iter().zip(dst.bytes_mut().chunks_exact_mut(4)) {
        let f = (max - min) * *s as f32 / 255.0 - min;
        d.copy_from_slice(&f.to_ne_bytes());
    }
    Ok(dst)
}

pub(crate) fn pack_u8_luminance_range(
    src: &PixelBuffer,
    min: f32,
    max: f32,
) -> ConvertResult<PixelBuffer> {
    let mut dst = same_shape(src, tex_core::U8_LUMINANCE)?;
    for (s, d) in src.bytes().chunks_exact(4).zip(dst.bytes_mut().iter_mut()) {
        let f = read_f32(s);
        *d = (255.0 * (f - min) / (max - min)).clamp(0.0, 255.0) as u8;
    }
    Ok(dst)
}

/*
 * shared sRGB / Lab helpers
 */

/// Linearizes one sRGB channel.
pub(crate) fn srgb_linearize(c: f32) -> f32 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

/// Relative luminance of an sRGB byte triple.
pub(crate) fn srgb_to_y(r: u8, g: u8, b: u8) -> f32 {
    let r = srgb_linearize(r as f32 / 255.0);
    let g = srgb_linearize(g as f32 / 255.0);
    let b = srgb_linearize(b as f32 / 255.0);
    (r * 0.2126 + g * 0.7152 + b * 0.0722) / 1.00000
}

/// The Lab transfer function applied to a normalized tristimulus value.
pub(crate) fn lab_f(t: f32) -> f32 {
    if t > 0.008856 {
        t.powf(0.333333)
    } else {
        7.787 * t + 16.0 / 116.0
    }
}
