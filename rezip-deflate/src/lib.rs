//! # rezip-deflate
//!
//! Pure Rust implementation of DEFLATE decompression (RFC 1951).
//!
//! This crate is decode-only: it provides exactly what's needed to read the
//! DEFLATE streams embedded in ZIP entries.
//!
//! - Stored (uncompressed) blocks
//! - Fixed Huffman codes
//! - Dynamic Huffman codes
//!
//! ## Example
//!
//! ```rust
//! use rezip_deflate::inflate;
//!
//! // `compressed` holds a raw DEFLATE stream (no zlib/gzip wrapper).
//! let compressed: &[u8] = &[0x01, 0x05, 0x00, 0xfa, 0xff, b'H', b'e', b'l', b'l', b'o'];
//! let decompressed = inflate(compressed).unwrap();
//! assert_eq!(&decompressed, b"Hello");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod huffman;
pub mod inflate;
pub mod tables;

// Re-exports
pub use huffman::HuffmanTree;
pub use inflate::{Inflater, inflate, inflate_with_size_hint};
