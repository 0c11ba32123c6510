//! Local file header parsing and the data-descriptor heuristic.
//!
//! Extraction reads the local file header rather than trusting the central
//! directory's copies of size/CRC, because those fields are zeroed in the
//! header itself when the general-purpose bit 3 ("data descriptor") flag is
//! set — the true values trail the compressed stream instead.

use rezip_core::entry::CompressionMethod;
use rezip_core::error::{RezipError, Result};

/// Local file header signature (`PK\x03\x04`).
pub const LOCAL_FILE_HEADER_SIG: u32 = 0x0403_4B50;

/// Data descriptor signature (`PK\x07\x08`).
pub const DATA_DESCRIPTOR_SIG: u32 = 0x0807_4B50;

/// General-purpose bit flag 3: size/CRC follow the data in a descriptor.
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

fn read_u16(buffer: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buffer[offset], buffer[offset + 1]])
}

fn read_u32(buffer: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    ])
}

/// A parsed local file header.
#[derive(Debug, Clone, Copy)]
pub struct LocalFileHeader {
    /// General purpose bit flags.
    pub flags: u16,
    /// Compression method.
    pub method: CompressionMethod,
    /// CRC-32 as recorded in the local header (0 when a data descriptor follows).
    pub crc32: u32,
    /// Compressed size as recorded in the local header (0 when a data descriptor follows).
    pub compressed_size: u32,
    /// Uncompressed size as recorded in the local header (0 when a data descriptor follows).
    pub uncompressed_size: u32,
    /// Absolute offset of the first byte of compressed data.
    pub data_offset: usize,
}

impl LocalFileHeader {
    /// Whether this header's compressed stream is followed by a data descriptor.
    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }
}

/// Parse the local file header at `offset` within `buffer`.
pub fn read_local_header(buffer: &[u8], offset: usize) -> Result<LocalFileHeader> {
    if offset + 30 > buffer.len() {
        return Err(RezipError::invalid_header(
            "local file header overruns the archive buffer",
        ));
    }

    let signature = read_u32(buffer, offset);
    if signature != LOCAL_FILE_HEADER_SIG {
        return Err(RezipError::invalid_magic(
            LOCAL_FILE_HEADER_SIG.to_le_bytes().to_vec(),
            signature.to_le_bytes().to_vec(),
        ));
    }

    let flags = read_u16(buffer, offset + 6);
    let method = CompressionMethod::from_u16(read_u16(buffer, offset + 8));
    let crc32 = read_u32(buffer, offset + 14);
    let compressed_size = read_u32(buffer, offset + 18);
    let uncompressed_size = read_u32(buffer, offset + 22);
    let name_len = read_u16(buffer, offset + 26) as usize;
    let extra_len = read_u16(buffer, offset + 28) as usize;

    let data_offset = offset + 30 + name_len + extra_len;
    if data_offset > buffer.len() {
        return Err(RezipError::invalid_header(
            "local file header name/extra length overruns the archive buffer",
        ));
    }

    Ok(LocalFileHeader {
        flags,
        method,
        crc32,
        compressed_size,
        uncompressed_size,
        data_offset,
    })
}

/// CRC/size fields recovered from a trailing data descriptor.
#[derive(Debug, Clone, Copy)]
pub struct DataDescriptor {
    /// True CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// True compressed size.
    pub compressed_size: u32,
    /// True uncompressed size.
    pub uncompressed_size: u32,
}

/// Locate and read the data descriptor that follows a streamed entry's
/// compressed data.
///
/// The descriptor's optional leading signature cannot be relied upon (many
/// writers omit it), so this scans forward byte by byte from `data_offset`
/// looking for either the signature or a 4-byte match against
/// `expected_crc` (the CRC recorded in the entry's central directory
/// record, which is always authoritative even when the local header's copy
/// is zeroed). See the module-level caveat: a compressed stream that
/// happens to contain `expected_crc` as a coincidental byte sequence before
/// the real descriptor would be misidentified; a stream-aware inflater that
/// knows its own end offset would not have this ambiguity.
pub fn find_data_descriptor(
    buffer: &[u8],
    data_offset: usize,
    expected_crc: u32,
) -> Result<DataDescriptor> {
    let mut pos = data_offset;
    loop {
        if pos + 4 > buffer.len() {
            return Err(RezipError::invalid_header(
                "data descriptor not found before end of archive buffer",
            ));
        }

        let word = read_u32(buffer, pos);
        let descriptor_start = if word == DATA_DESCRIPTOR_SIG {
            Some(pos)
        } else if word == expected_crc {
            pos.checked_sub(4)
        } else {
            None
        };

        if let Some(start) = descriptor_start {
            if start + 16 > buffer.len() {
                return Err(RezipError::invalid_header(
                    "data descriptor overruns the archive buffer",
                ));
            }
            return Ok(DataDescriptor {
                crc32: read_u32(buffer, start + 4),
                compressed_size: read_u32(buffer, start + 8),
                uncompressed_size: read_u32(buffer, start + 12),
            });
        }

        pos += 1;
    }
}
