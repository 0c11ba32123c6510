//! # rezip-core
//!
//! Core components shared by the `rezip` ZIP reader.
//!
//! This crate provides the fundamental building blocks used to decode a ZIP
//! archive's DEFLATE streams and to model the directory tree reconstructed
//! from its central directory:
//!
//! - [`bitstream`]: Bit-level input for variable-length Huffman codes
//! - [`ringbuffer`]: Sliding window buffer for LZ77 decompression
//! - [`crc`]: CRC-32 checksum, as used by ZIP's central directory records
//! - [`traits`]: The streaming `Decompressor` interface
//! - [`entry`]: Archive entry metadata and the directory tree arena
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ rezip-archive                                            │
//! │     ZIP central directory, local headers, extraction    │
//! ├─────────────────────────────────────────────────────────┤
//! │ rezip-deflate                                            │
//! │     Huffman trees, the DEFLATE (RFC 1951) inflater       │
//! ├─────────────────────────────────────────────────────────┤
//! │ rezip-core (this crate)                                  │
//! │     BitReader, RingBuffer, CRC-32, Entry tree, errors    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rezip_core::bitstream::BitReader;
//! use rezip_core::crc::Crc32;
//! use std::io::Cursor;
//!
//! // Read bits from data
//! let data = vec![0xAB, 0xCD];
//! let mut reader = BitReader::new(Cursor::new(data));
//! let bits = reader.read_bits(12).unwrap();
//!
//! // Compute CRC-32
//! let crc = Crc32::compute(b"Hello, World!");
//! assert_eq!(crc, 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod entry;
pub mod error;
pub mod ringbuffer;
pub mod traits;

// Re-exports for convenience
pub use bitstream::BitReader;
pub use crc::Crc32;
pub use entry::{CompressionMethod, Entry, EntryId, EntryTree};
pub use error::{Result, RezipError};
pub use ringbuffer::{OutputRingBuffer, RingBuffer};
pub use traits::{DecompressStatus, Decompressor};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::BitReader;
    pub use crate::crc::Crc32;
    pub use crate::entry::{CompressionMethod, Entry, EntryId, EntryTree};
    pub use crate::error::{Result, RezipError};
    pub use crate::ringbuffer::{OutputRingBuffer, RingBuffer};
    pub use crate::traits::Decompressor;
}
