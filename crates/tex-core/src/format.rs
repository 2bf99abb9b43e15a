//! Pixel format catalog.
//!
//! # Overview
//!
//! A texture format is a pair of an [`ElementType`] (how one channel is
//! stored) and a [`ChannelLayout`] (which channels are present and in what
//! order). Only a fixed set of pairs is meaningful; [`PixelFormat`] is the
//! validated pair and the single source of truth for bytes-per-pixel.
//!
//! Packed element types (565, 4444, 5551) store the whole pixel in one
//! 16-bit word, so their "element" already implies the channel layout.
//!
//! Each element type and layout also carries a stable numeric code used by
//! the container format in `tex-io`.
//!
//! # Used By
//!
//! - [`crate::buffer::PixelBuffer`] - Allocation and accessor validation
//! - `tex-convert` - Conversion dispatch
//! - `tex-io` - Container headers

use crate::error::{Error, Result};

/// Storage type of a single channel element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Unsigned 8-bit channel.
    U8,
    /// Signed 16-bit channel (storage only, no conversions).
    I16,
    /// 32-bit float channel.
    F32,
    /// Packed 16-bit pixel, 4 bits per RGBA channel.
    P4444,
    /// Packed 16-bit pixel, 5/6/5 bits for RGB.
    P565,
    /// Packed 16-bit pixel, 5/5/5 bits for RGB plus 1 alpha bit.
    P5551,
}

impl ElementType {
    /// Stable numeric code used by the container header.
    #[inline]
    pub fn code(self) -> u32 {
        match self {
            Self::U8 => 0x1401,
            Self::I16 => 0x1402,
            Self::F32 => 0x1406,
            Self::P4444 => 0x8033,
            Self::P5551 => 0x8034,
            Self::P565 => 0x8363,
        }
    }

    /// Looks up an element type by its container code.
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0x1401 => Ok(Self::U8),
            0x1402 => Ok(Self::I16),
            0x1406 => Ok(Self::F32),
            0x8033 => Ok(Self::P4444),
            0x8034 => Ok(Self::P5551),
            0x8363 => Ok(Self::P565),
            _ => Err(Error::unsupported_format(format!(
                "unknown element code 0x{code:X}"
            ))),
        }
    }

    /// Returns `true` for the packed 16-bit pixel types.
    #[inline]
    pub fn is_packed(self) -> bool {
        matches!(self, Self::P4444 | Self::P565 | Self::P5551)
    }
}

/// Channel layout of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    /// Single alpha channel.
    Alpha,
    /// Single luminance channel.
    Luminance,
    /// Single CIE-Lab lightness channel, scaled to bytes.
    LabL,
    /// Luminance plus alpha.
    LuminanceAlpha,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
    /// Blue, green, red, alpha.
    Bgra,
}

impl ChannelLayout {
    /// Stable numeric code used by the container header.
    #[inline]
    pub fn code(self) -> u32 {
        match self {
            Self::Alpha => 0x1906,
            Self::Rgb => 0x1907,
            Self::Rgba => 0x1908,
            Self::Luminance => 0x1909,
            Self::LuminanceAlpha => 0x190A,
            Self::Bgra => 0x80E1,
            Self::LabL => 0x999A,
        }
    }

    /// Looks up a layout by its container code.
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0x1906 => Ok(Self::Alpha),
            0x1907 => Ok(Self::Rgb),
            0x1908 => Ok(Self::Rgba),
            0x1909 => Ok(Self::Luminance),
            0x190A => Ok(Self::LuminanceAlpha),
            0x80E1 => Ok(Self::Bgra),
            0x999A => Ok(Self::LabL),
            _ => Err(Error::unsupported_format(format!(
                "unknown layout code 0x{code:X}"
            ))),
        }
    }

    /// Number of channels in this layout.
    #[inline]
    pub fn channels(self) -> u32 {
        match self {
            Self::Rgba | Self::Bgra => 4,
            Self::Rgb => 3,
            Self::LuminanceAlpha => 2,
            Self::Alpha | Self::Luminance | Self::LabL => 1,
        }
    }
}

/// A validated element/layout pair.
///
/// Construction fails for pairs outside the catalog, so holding a
/// `PixelFormat` guarantees a defined bytes-per-pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    element: ElementType,
    layout: ChannelLayout,
}

impl PixelFormat {
    /// Validates an element/layout pair against the catalog.
    pub fn new(element: ElementType, layout: ChannelLayout) -> Result<Self> {
        use ChannelLayout as L;
        use ElementType as E;

        let valid = matches!(
            (element, layout),
            (E::U8, L::Rgb)
                | (E::U8, L::Rgba)
                | (E::U8, L::Bgra)
                | (E::U8, L::Luminance)
                | (E::U8, L::LabL)
                | (E::U8, L::Alpha)
                | (E::U8, L::LuminanceAlpha)
                | (E::I16, L::Luminance)
                | (E::F32, L::Luminance)
                | (E::F32, L::Rgba)
                | (E::P565, L::Rgb)
                | (E::P4444, L::Rgba)
                | (E::P5551, L::Rgba)
        );
        if !valid {
            return Err(Error::unsupported_format(format!(
                "{element:?}/{layout:?}"
            )));
        }

        Ok(Self { element, layout })
    }

    /// The element type of this format.
    #[inline]
    pub fn element(self) -> ElementType {
        self.element
    }

    /// The channel layout of this format.
    #[inline]
    pub fn layout(self) -> ChannelLayout {
        self.layout
    }

    /// Number of channels.
    #[inline]
    pub fn channels(self) -> u32 {
        self.layout.channels()
    }

    /// Bytes used to store one pixel.
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        use ChannelLayout as L;
        use ElementType as E;

        match (self.element, self.layout) {
            (E::U8, L::Rgb) => 3,
            (E::U8, L::Rgba) | (E::U8, L::Bgra) => 4,
            (E::U8, L::Luminance) | (E::U8, L::LabL) | (E::U8, L::Alpha) => 1,
            (E::U8, L::LuminanceAlpha) => 2,
            (E::I16, L::Luminance) => 2,
            (E::F32, L::Luminance) => 4,
            (E::F32, L::Rgba) => 16,
            (E::P565, L::Rgb) | (E::P4444, L::Rgba) | (E::P5551, L::Rgba) => 2,
            // unreachable for validated formats
            _ => 0,
        }
    }
}

/// Byte RGBA, the hub format for conversions.
pub const U8_RGBA: PixelFormat = PixelFormat {
    element: ElementType::U8,
    layout: ChannelLayout::Rgba,
};

/// Byte RGB.
pub const U8_RGB: PixelFormat = PixelFormat {
    element: ElementType::U8,
    layout: ChannelLayout::Rgb,
};

/// Byte luminance.
pub const U8_LUMINANCE: PixelFormat = PixelFormat {
    element: ElementType::U8,
    layout: ChannelLayout::Luminance,
};

/// Float luminance.
pub const F32_LUMINANCE: PixelFormat = PixelFormat {
    element: ElementType::F32,
    layout: ChannelLayout::Luminance,
};

/// Float RGBA.
pub const F32_RGBA: PixelFormat = PixelFormat {
    element: ElementType::F32,
    layout: ChannelLayout::Rgba,
};
