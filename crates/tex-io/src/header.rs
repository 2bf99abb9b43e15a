//! Container header codec.
//!
//! The header is 28 bytes: seven little-endian u32 fields holding the
//! magic, the element and layout wire codes, and the buffer geometry.
//! Readers auto-detect byte order: when the magic only matches after a
//! byte swap, every field is read swapped.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use tex_core::{ChannelLayout, ElementType, PixelFormat};

use crate::error::{IoError, IoResult};

/// Container magic number.
pub const MAGIC: u32 = 0x000B_00D9;

/// Encoded header size in bytes.
pub const HEADER_SIZE: usize = 28;

/// Decoded container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexHeader {
    /// Pixel format of the payload.
    pub format: PixelFormat,
    /// Logical image width.
    pub width: u32,
    /// Logical image height.
    pub height: u32,
    /// Allocated row length in pixels.
    pub stride: u32,
    /// Allocated row count.
    pub vstride: u32,
}

impl TexHeader {
    /// Builds the header describing a buffer.
    pub fn for_buffer(buf: &tex_core::PixelBuffer) -> Self {
        Self {
            format: buf.format(),
            width: buf.width(),
            height: buf.height(),
            stride: buf.stride(),
            vstride: buf.vstride(),
        }
    }

    /// Payload size in bytes described by this header.
    pub fn payload_size(&self) -> usize {
        self.format.bytes_per_pixel() * self.stride as usize * self.vstride as usize
    }

    /// Encodes the header into its 28-byte wire form.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        let fields = [
            MAGIC,
            self.format.element().code(),
            self.format.layout().code(),
            self.width,
            self.height,
            self.stride,
            self.vstride,
        ];
        for (chunk, field) in out.chunks_exact_mut(4).zip(fields) {
            LittleEndian::write_u32(chunk, field);
        }
        out
    }

    /// Decodes a header, auto-detecting byte order from the magic.
    pub fn decode(bytes: &[u8]) -> IoResult<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(IoError::Malformed(format!(
                "header truncated at {} bytes",
                bytes.len()
            )));
        }

        let magic = LittleEndian::read_u32(&bytes[0..4]);
        let field = |i: usize| -> u32 {
            let chunk = &bytes[4 * i..4 * i + 4];
            if magic == MAGIC {
                LittleEndian::read_u32(chunk)
            } else {
                BigEndian::read_u32(chunk)
            }
        };
        if magic != MAGIC && magic.swap_bytes() != MAGIC {
            return Err(IoError::BadMagic(magic));
        }

        let element = ElementType::from_code(field(1))
            .map_err(|e| IoError::UnknownFormat(e.to_string()))?;
        let layout = ChannelLayout::from_code(field(2))
            .map_err(|e| IoError::UnknownFormat(e.to_string()))?;
        let format = PixelFormat::new(element, layout)
            .map_err(|e| IoError::UnknownFormat(e.to_string()))?;

        Ok(Self {
            format,
            width: field(3),
            height: field(4),
            stride: field(5),
            vstride: field(6),
        })
    }
}
