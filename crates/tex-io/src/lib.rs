//! # tex-io
//!
//! Compressed container serialization for tex-rs buffers.
//!
//! A container packs a [`TexHeader`] and the raw pixel payload into one
//! zlib stream. The format is endian-tolerant on read: headers written
//! on a big-endian machine are detected and byte-swapped.
//!
//! ```no_run
//! use tex_core::PixelBuffer;
//!
//! let buf = PixelBuffer::new(64, 64, 64, 64, tex_core::U8_RGBA)?;
//! tex_io::write_stream(&buf, "out.texz")?;
//! let back = tex_io::read_stream("out.texz")?;
//! assert_eq!(back.bytes(), buf.bytes());
//! # Ok::<(), tex_io::IoError>(())
//! ```

#![warn(missing_docs)]

mod container;
mod error;
mod header;

pub use container::{decode, encode, peek_header, read_stream, write_stream};
pub use error::{IoError, IoResult};
pub use header::{TexHeader, HEADER_SIZE, MAGIC};
