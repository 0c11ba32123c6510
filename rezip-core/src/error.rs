//! Error types for rezip operations.
//!
//! This module provides a comprehensive error type that covers all possible
//! error conditions when reading ZIP archives and inflating DEFLATE streams,
//! including I/O errors, format validation errors, and decompression errors.

use std::io;
use thiserror::Error;

/// The main error type for rezip operations.
#[derive(Debug, Error)]
pub enum RezipError {
    /// I/O error from the underlying reader.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic number in archive header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Unsupported compression method.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The compression method identifier.
        method: String,
    },

    /// CRC checksum mismatch.
    #[error("CRC mismatch: expected {expected:#x}, computed {computed:#x}")]
    CrcMismatch {
        /// Expected CRC value from archive.
        expected: u32,
        /// Computed CRC value from data.
        computed: u32,
    },

    /// Uncompressed size mismatch after decompression.
    #[error("Size mismatch: expected {expected} bytes, got {actual} bytes")]
    SizeMismatch {
        /// Expected uncompressed size from the directory entry.
        expected: u64,
        /// Actual number of bytes produced.
        actual: u64,
    },

    /// Invalid Huffman code encountered during decompression.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Corrupted data in archive.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Invalid header format.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Unexpected end of file.
    #[error("Unexpected end of file: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Buffer too small for operation.
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Invalid distance in LZ77 back-reference.
    #[error("Invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Current history buffer size.
        history_size: usize,
    },

    /// Entry not found in archive.
    #[error("Entry not found: {name}")]
    EntryNotFound {
        /// Name of the missing entry.
        name: String,
    },

    /// `extractDirectory` was called on an entry that is not a directory.
    #[error("Not a directory: {name}")]
    NotADirectory {
        /// Name of the offending entry.
        name: String,
    },

    /// Bulk directory extraction was rejected, e.g. because it would escape
    /// the requested subtree or the entry list is inconsistent.
    #[error("Directory extraction rejected for {name}: {reason}")]
    DirectoryExtractionRejected {
        /// Name of the directory entry.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}

/// Result type alias for rezip operations.
pub type Result<T> = std::result::Result<T, RezipError>;

impl RezipError {
    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create a size mismatch error.
    pub fn size_mismatch(expected: u64, actual: u64) -> Self {
        Self::SizeMismatch { expected, actual }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create a buffer too small error.
    pub fn buffer_too_small(needed: usize, available: usize) -> Self {
        Self::BufferTooSmall { needed, available }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create an entry not found error.
    pub fn entry_not_found(name: impl Into<String>) -> Self {
        Self::EntryNotFound { name: name.into() }
    }

    /// Create a not-a-directory error.
    pub fn not_a_directory(name: impl Into<String>) -> Self {
        Self::NotADirectory { name: name.into() }
    }

    /// Create a directory extraction rejected error.
    pub fn directory_extraction_rejected(
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DirectoryExtractionRejected {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
