//! Owned pixel buffer with stride-padded storage.
//!
//! # Overview
//!
//! [`PixelBuffer`] owns a contiguous byte allocation of exactly
//! `bytes_per_pixel * stride * vstride` bytes. The logical image is the
//! `width x height` region in the top-left corner; `stride`/`vstride` allow
//! padding rows and columns (power-of-two padding for GPU upload, for
//! example) without reallocating.
//!
//! Pixel accessors are bounds-checked and format-checked:
//!
//! - [`PixelBuffer::pixel`]/[`PixelBuffer::set_pixel`] work on byte-element
//!   luminance, RGB and RGBA buffers and always speak `[u8; 4]` RGBA.
//!   Missing alpha reads as 255 and luminance is replicated to r, g, b.
//! - [`PixelBuffer::pixel_f32`]/[`PixelBuffer::set_pixel_f32`] work on float
//!   luminance and float RGBA buffers.
//! - [`PixelBuffer::clamped_pixel_f32`] takes signed coordinates and clamps
//!   them to the logical bounds (replicate-border reads for convolution).
//!
//! Float elements are stored in native byte order.
//!
//! # Example
//!
//! ```
//! use tex_core::{ChannelLayout, ElementType, PixelBuffer, PixelFormat};
//!
//! let fmt = PixelFormat::new(ElementType::U8, ChannelLayout::Rgba)?;
//! let mut buf = PixelBuffer::new(4, 4, 4, 4, fmt)?;
//! buf.set_pixel(1, 2, [255, 0, 0, 255])?;
//! assert_eq!(buf.pixel(1, 2)?, [255, 0, 0, 255]);
//! # Ok::<(), tex_core::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::format::{ChannelLayout, ElementType, PixelFormat};

/// An owned, stride-padded pixel buffer.
///
/// `Clone` is a deep copy of the payload.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: u32,
    vstride: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a zero-filled buffer.
    ///
    /// Fails when `width > stride`, `height > vstride` or a dimension is
    /// zero.
    pub fn new(
        width: u32,
        height: u32,
        stride: u32,
        vstride: u32,
        format: PixelFormat,
    ) -> Result<Self> {
        if width == 0 || stride < width {
            return Err(Error::invalid_dimensions(
                width,
                height,
                stride,
                vstride,
                "width must satisfy 1 <= width <= stride",
            ));
        }
        if height == 0 || vstride < height {
            return Err(Error::invalid_dimensions(
                width,
                height,
                stride,
                vstride,
                "height must satisfy 1 <= height <= vstride",
            ));
        }

        let size = format.bytes_per_pixel() * stride as usize * vstride as usize;
        Ok(Self {
            width,
            height,
            stride,
            vstride,
            format,
            pixels: vec![0u8; size],
        })
    }

    /// Creates a buffer from an existing payload.
    ///
    /// `bytes` must be exactly `bytes_per_pixel * stride * vstride` long.
    pub fn from_bytes(
        width: u32,
        height: u32,
        stride: u32,
        vstride: u32,
        format: PixelFormat,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let mut buf = Self::new(width, height, stride, vstride, format)?;
        if bytes.len() != buf.pixels.len() {
            return Err(Error::size_mismatch(buf.pixels.len(), bytes.len()));
        }
        buf.pixels = bytes;
        Ok(buf)
    }

    /// Logical image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Logical image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Allocated row length in pixels.
    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Allocated row count.
    #[inline]
    pub fn vstride(&self) -> u32 {
        self.vstride
    }

    /// The buffer's pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Element type shorthand.
    #[inline]
    pub fn element(&self) -> ElementType {
        self.format.element()
    }

    /// Channel layout shorthand.
    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.format.layout()
    }

    /// Number of channels.
    #[inline]
    pub fn channels(&self) -> u32 {
        self.format.channels()
    }

    /// Bytes per pixel.
    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// Total payload size in bytes, padding included.
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Raw payload access.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable raw payload access.
    #[inline]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Consumes the buffer and returns the payload.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    /// Zeroes the payload.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Retags the channel layout without touching the payload.
    ///
    /// The new element/layout pair must be a catalog entry with the same
    /// bytes-per-pixel, so the bytes reinterpret directly (for example
    /// luminance to alpha).
    pub fn set_layout(&mut self, layout: ChannelLayout) -> Result<()> {
        let format = PixelFormat::new(self.element(), layout)?;
        if format.bytes_per_pixel() != self.bytes_per_pixel() {
            return Err(Error::unsupported_format(format!(
                "cannot reinterpret {:?}/{:?} as {:?}",
                self.element(),
                self.layout(),
                layout
            )));
        }
        self.format = format;
        Ok(())
    }

    /// Returns `true` when `(x, y)` is inside the logical image.
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<()> {
        if self.contains(x, y) {
            Ok(())
        } else {
            Err(Error::out_of_bounds(x, y, self.width, self.height))
        }
    }

    fn check_byte_layout(&self) -> Result<()> {
        let ok = self.element() == ElementType::U8
            && matches!(
                self.layout(),
                ChannelLayout::Rgb | ChannelLayout::Rgba | ChannelLayout::Luminance
            );
        if ok {
            Ok(())
        } else {
            Err(Error::unsupported_format(format!(
                "{:?}/{:?} (byte luminance, RGB or RGBA required)",
                self.element(),
                self.layout()
            )))
        }
    }

    fn check_float_layout(&self) -> Result<()> {
        let ok = self.element() == ElementType::F32
            && matches!(
                self.layout(),
                ChannelLayout::Luminance | ChannelLayout::Rgba
            );
        if ok {
            Ok(())
        } else {
            Err(Error::unsupported_format(format!(
                "{:?}/{:?} (float luminance or RGBA required)",
                self.element(),
                self.layout()
            )))
        }
    }

    /// Reads one pixel as RGBA bytes.
    ///
    /// RGB buffers read with alpha 255, luminance buffers replicate the
    /// value to r, g and b.
    pub fn pixel(&self, x: u32, y: u32) -> Result<[u8; 4]> {
        self.check_byte_layout()?;
        self.check_bounds(x, y)?;

        let p = &self.pixels;
        Ok(match self.layout() {
            ChannelLayout::Rgb => {
                let idx = 3 * (y as usize * self.stride as usize + x as usize);
                [p[idx], p[idx + 1], p[idx + 2], 0xFF]
            }
            ChannelLayout::Rgba => {
                let idx = 4 * (y as usize * self.stride as usize + x as usize);
                [p[idx], p[idx + 1], p[idx + 2], p[idx + 3]]
            }
            _ => {
                let idx = y as usize * self.stride as usize + x as usize;
                [p[idx], p[idx], p[idx], 0xFF]
            }
        })
    }

    /// Writes one pixel from RGBA bytes.
    ///
    /// RGB buffers drop the alpha, luminance buffers store only the first
    /// component.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: [u8; 4]) -> Result<()> {
        self.check_byte_layout()?;
        self.check_bounds(x, y)?;

        match self.layout() {
            ChannelLayout::Rgb => {
                let idx = 3 * (y as usize * self.stride as usize + x as usize);
                self.pixels[idx..idx + 3].copy_from_slice(&pixel[..3]);
            }
            ChannelLayout::Rgba => {
                let idx = 4 * (y as usize * self.stride as usize + x as usize);
                self.pixels[idx..idx + 4].copy_from_slice(&pixel);
            }
            _ => {
                let idx = y as usize * self.stride as usize + x as usize;
                self.pixels[idx] = pixel[0];
            }
        }
        Ok(())
    }

    #[inline]
    fn read_f32(&self, elem: usize) -> f32 {
        let idx = 4 * elem;
        f32::from_ne_bytes(self.pixels[idx..idx + 4].try_into().unwrap())
    }

    #[inline]
    fn write_f32(&mut self, elem: usize, v: f32) {
        let idx = 4 * elem;
        self.pixels[idx..idx + 4].copy_from_slice(&v.to_ne_bytes());
    }

    fn pixel_f32_unchecked(&self, x: u32, y: u32) -> [f32; 4] {
        if self.layout() == ChannelLayout::Rgba {
            let idx = 4 * (y as usize * self.stride as usize + x as usize);
            [
                self.read_f32(idx),
                self.read_f32(idx + 1),
                self.read_f32(idx + 2),
                self.read_f32(idx + 3),
            ]
        } else {
            let idx = y as usize * self.stride as usize + x as usize;
            [self.read_f32(idx), 0.0, 0.0, 0.0]
        }
    }

    /// Reads one pixel of a float buffer.
    ///
    /// Luminance buffers fill only the first component.
    pub fn pixel_f32(&self, x: u32, y: u32) -> Result<[f32; 4]> {
        self.check_float_layout()?;
        self.check_bounds(x, y)?;
        Ok(self.pixel_f32_unchecked(x, y))
    }

    /// Reads one pixel of a float buffer with replicate-border clamping.
    ///
    /// Signed coordinates outside the logical image are clamped to the
    /// nearest edge pixel.
    pub fn clamped_pixel_f32(&self, x: i64, y: i64) -> Result<[f32; 4]> {
        self.check_float_layout()?;
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        Ok(self.pixel_f32_unchecked(x, y))
    }

    /// Writes one pixel of a float buffer.
    ///
    /// Luminance buffers store only the first component.
    pub fn set_pixel_f32(&mut self, x: u32, y: u32, pixel: [f32; 4]) -> Result<()> {
        self.check_float_layout()?;
        self.check_bounds(x, y)?;

        if self.layout() == ChannelLayout::Rgba {
            let idx = 4 * (y as usize * self.stride as usize + x as usize);
            self.write_f32(idx, pixel[0]);
            self.write_f32(idx + 1, pixel[1]);
            self.write_f32(idx + 2, pixel[2]);
            self.write_f32(idx + 3, pixel[3]);
        } else {
            let idx = y as usize * self.stride as usize + x as usize;
            self.write_f32(idx, pixel[0]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fmt(element: ElementType, layout: ChannelLayout) -> PixelFormat {
        PixelFormat::new(element, layout).unwrap()
    }

    #[test]
    fn test_new_zero_filled() {
        let buf = PixelBuffer::new(3, 2, 4, 2, fmt(ElementType::U8, ChannelLayout::Rgba)).unwrap();
        assert_eq!(buf.byte_size(), 4 * 4 * 2);
        assert!(buf.bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_geometry_validation() {
        let f = fmt(ElementType::U8, ChannelLayout::Rgba);
        assert!(PixelBuffer::new(0, 2, 4, 2, f).is_err());
        assert!(PixelBuffer::new(5, 2, 4, 2, f).is_err());
        assert!(PixelBuffer::new(4, 3, 4, 2, f).is_err());
        assert!(PixelBuffer::new(4, 2, 4, 0, f).is_err());
    }

    #[test]
    fn test_from_bytes_size_check() {
        let f = fmt(ElementType::U8, ChannelLayout::Luminance);
        assert!(PixelBuffer::from_bytes(2, 2, 2, 2, f, vec![0; 4]).is_ok());
        assert!(PixelBuffer::from_bytes(2, 2, 2, 2, f, vec![0; 5]).is_err());
    }

    #[test]
    fn test_pixel_rgb_alpha_fill() {
        let f = fmt(ElementType::U8, ChannelLayout::Rgb);
        let mut buf = PixelBuffer::new(2, 2, 2, 2, f).unwrap();
        buf.set_pixel(1, 0, [10, 20, 30, 99]).unwrap();
        assert_eq!(buf.pixel(1, 0).unwrap(), [10, 20, 30, 255]);
    }

    #[test]
    fn test_pixel_luminance_broadcast() {
        let f = fmt(ElementType::U8, ChannelLayout::Luminance);
        let mut buf = PixelBuffer::new(2, 2, 2, 2, f).unwrap();
        buf.set_pixel(0, 1, [77, 0, 0, 0]).unwrap();
        assert_eq!(buf.pixel(0, 1).unwrap(), [77, 77, 77, 255]);
    }

    #[test]
    fn test_pixel_bounds() {
        let f = fmt(ElementType::U8, ChannelLayout::Rgba);
        let buf = PixelBuffer::new(2, 2, 4, 4, f).unwrap();
        // stride padding is not addressable
        assert!(buf.pixel(2, 0).is_err());
        assert!(buf.pixel(0, 2).is_err());
        assert!(buf.pixel(1, 1).is_ok());
    }

    #[test]
    fn test_pixel_format_checks() {
        let f = fmt(ElementType::F32, ChannelLayout::Rgba);
        let buf = PixelBuffer::new(2, 2, 2, 2, f).unwrap();
        assert!(buf.pixel(0, 0).is_err());

        let f = fmt(ElementType::U8, ChannelLayout::Rgba);
        let buf = PixelBuffer::new(2, 2, 2, 2, f).unwrap();
        assert!(buf.pixel_f32(0, 0).is_err());
    }

    #[test]
    fn test_pixel_f32_round_trip() {
        let f = fmt(ElementType::F32, ChannelLayout::Rgba);
        let mut buf = PixelBuffer::new(2, 2, 2, 2, f).unwrap();
        buf.set_pixel_f32(1, 1, [0.25, 0.5, 0.75, 1.0]).unwrap();
        let p = buf.pixel_f32(1, 1).unwrap();
        assert_relative_eq!(p[0], 0.25);
        assert_relative_eq!(p[3], 1.0);
    }

    #[test]
    fn test_clamped_pixel_f32() {
        let f = fmt(ElementType::F32, ChannelLayout::Luminance);
        let mut buf = PixelBuffer::new(2, 2, 2, 2, f).unwrap();
        buf.set_pixel_f32(0, 0, [3.0, 0.0, 0.0, 0.0]).unwrap();
        buf.set_pixel_f32(1, 1, [7.0, 0.0, 0.0, 0.0]).unwrap();
        assert_relative_eq!(buf.clamped_pixel_f32(-5, -5).unwrap()[0], 3.0);
        assert_relative_eq!(buf.clamped_pixel_f32(10, 10).unwrap()[0], 7.0);
    }

    #[test]
    fn test_clone_is_deep() {
        let f = fmt(ElementType::U8, ChannelLayout::Luminance);
        let mut a = PixelBuffer::new(2, 2, 2, 2, f).unwrap();
        let b = a.clone();
        a.set_pixel(0, 0, [255, 0, 0, 0]).unwrap();
        assert_eq!(b.pixel(0, 0).unwrap()[0], 0);
    }

    #[test]
    fn test_clear() {
        let f = fmt(ElementType::U8, ChannelLayout::Rgba);
        let mut buf = PixelBuffer::new(2, 2, 2, 2, f).unwrap();
        buf.set_pixel(0, 0, [1, 2, 3, 4]).unwrap();
        buf.clear();
        assert_eq!(buf.pixel(0, 0).unwrap(), [0, 0, 0, 0]);
    }
}
