//! Compressed container encode/decode.
//!
//! # Overview
//!
//! A container is a single zlib stream whose plaintext is the 28-byte
//! header followed by the raw payload (`bytes_per_pixel * stride *
//! vstride` bytes). [`encode`]/[`decode`] work on in-memory byte
//! vectors, [`write_stream`]/[`read_stream`] wrap them for files, and
//! [`peek_header`] inflates just enough of a container to recover its
//! header without touching the payload.
//!
//! Decoding is strict: after inflation the plaintext must be exactly
//! `28 + payload` bytes, anything shorter or longer is rejected.

use std::fs;
use std::path::Path;

use miniz_oxide::inflate::stream::{inflate, InflateState};
use miniz_oxide::{DataFormat, MZFlush};
use tracing::debug;

use tex_core::PixelBuffer;

use crate::error::{IoError, IoResult};
use crate::header::{TexHeader, HEADER_SIZE};

const COMPRESSION_LEVEL: u8 = 4;

/// Encodes a buffer into a compressed container.
pub fn encode(buf: &PixelBuffer) -> Vec<u8> {
    let header = TexHeader::for_buffer(buf);
    let mut record = Vec::with_capacity(HEADER_SIZE + buf.bytes().len());
    record.extend_from_slice(&header.encode());
    record.extend_from_slice(buf.bytes());
    miniz_oxide::deflate::compress_to_vec_zlib(&record, COMPRESSION_LEVEL)
}

/// Decodes a compressed container into a buffer.
pub fn decode(bytes: &[u8]) -> IoResult<PixelBuffer> {
    let header = peek_header(bytes)?;
    let expected = HEADER_SIZE + header.payload_size();

    let options = zune_inflate::DeflateOptions::default()
        .set_limit(expected)
        .set_size_hint(expected);
    let mut decoder = zune_inflate::DeflateDecoder::new_with_options(bytes, options);
    let record = decoder
        .decode_zlib()
        .map_err(|e| IoError::Malformed(format!("inflate failed: {e:?}")))?;
    if record.len() != expected {
        return Err(IoError::Malformed(format!(
            "expected {expected} bytes, inflated {}",
            record.len()
        )));
    }

    debug!(
        width = header.width,
        height = header.height,
        format = ?header.format,
        "decoded container"
    );
    let buf = PixelBuffer::from_bytes(
        header.width,
        header.height,
        header.stride,
        header.vstride,
        header.format,
        record[HEADER_SIZE..].to_vec(),
    )?;
    Ok(buf)
}

/// Inflates only the header of a compressed container.
pub fn peek_header(bytes: &[u8]) -> IoResult<TexHeader> {
    let mut state = InflateState::new_boxed(DataFormat::Zlib);
    let mut head = [0u8; HEADER_SIZE];
    let result = inflate(&mut state, bytes, &mut head, MZFlush::None);
    if result.bytes_written != HEADER_SIZE {
        return Err(IoError::Malformed(format!(
            "container too short for header, inflated {} bytes",
            result.bytes_written
        )));
    }
    TexHeader::decode(&head)
}

/// Writes a buffer to a compressed container file.
pub fn write_stream<P: AsRef<Path>>(buf: &PixelBuffer, path: P) -> IoResult<()> {
    fs::write(path, encode(buf))?;
    Ok(())
}

/// Reads a buffer from a compressed container file.
pub fn read_stream<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    decode(&fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut buf =
            PixelBuffer::new(width, height, width, height, tex_core::U8_RGBA).unwrap();
        for y in 0..height {
            for x in 0..width {
                buf.set_pixel(x, y, [x as u8, y as u8, (x + y) as u8, 255])
                    .unwrap();
            }
        }
        buf
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let src = gradient(16, 8);
        let decoded = decode(&encode(&src)).unwrap();
        assert_eq!(decoded.format(), src.format());
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 8);
        assert_eq!(decoded.bytes(), src.bytes());
    }

    #[test]
    fn test_padded_geometry_round_trip() {
        let mut src = PixelBuffer::new(3, 2, 8, 4, tex_core::F32_LUMINANCE).unwrap();
        src.set_pixel_f32(2, 1, [0.25, 0.25, 0.25, 1.0]).unwrap();
        let decoded = decode(&encode(&src)).unwrap();
        assert_eq!(decoded.stride(), 8);
        assert_eq!(decoded.vstride(), 4);
        assert_eq!(decoded.pixel_f32(2, 1).unwrap()[0], 0.25);
    }

    #[test]
    fn test_peek_header() {
        let src = gradient(16, 8);
        let header = peek_header(&encode(&src)).unwrap();
        assert_eq!(header, TexHeader::for_buffer(&src));
    }

    #[test]
    fn test_truncated_container() {
        let encoded = encode(&gradient(16, 8));
        assert!(decode(&encoded[..encoded.len() / 2]).is_err());
    }

    #[test]
    fn test_garbage_input() {
        assert!(decode(&[0u8; 64]).is_err());
        assert!(peek_header(&[]).is_err());
    }

    #[test]
    fn test_payload_size_mismatch() {
        // a valid zlib stream whose plaintext is one header plus a short payload
        let mut header = TexHeader::for_buffer(&gradient(16, 8));
        header.width = 32;
        header.stride = 32;
        let mut record = header.encode().to_vec();
        record.extend_from_slice(&[0u8; 16]);
        let encoded = miniz_oxide::deflate::compress_to_vec_zlib(&record, 4);
        assert!(matches!(decode(&encoded), Err(IoError::Malformed(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradient.texz");

        let src = gradient(16, 8);
        write_stream(&src, &path).unwrap();
        let decoded = read_stream(&path).unwrap();
        assert_eq!(decoded.bytes(), src.bytes());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_stream("/nonexistent/path.texz"),
            Err(IoError::Io(_))
        ));
    }
}
