//! Central directory iteration.
//!
//! The central directory is the authoritative index of a ZIP archive's
//! members. Each record here is parsed into a flat, unordered
//! [`CentralDirectoryRecord`]; [`crate::zip::tree`] turns the flat list into
//! a rooted directory tree.

use crate::zip::eocd::EndOfCentralDirectory;
use rezip_core::entry::CompressionMethod;
use rezip_core::error::{RezipError, Result};

/// Central directory header signature (`PK\x01\x02`).
pub const CENTRAL_DIR_HEADER_SIG: u32 = 0x0201_4B50;

/// Fixed portion of a central directory record, up to the file name.
const RECORD_FIXED_SIZE: usize = 46;

/// One parsed central directory record, prior to tree reconstruction.
#[derive(Debug, Clone)]
pub struct CentralDirectoryRecord {
    /// Stored path, trailing `/` marks a directory.
    pub name: String,
    /// Whether `name` ends with `/`.
    pub is_directory: bool,
    /// Compression method.
    pub method: CompressionMethod,
    /// Stored CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Uncompressed size in bytes.
    pub uncompressed_size: u32,
    /// Compressed size in bytes.
    pub compressed_size: u32,
    /// MS-DOS packed date/time, preserved verbatim.
    pub dos_timestamp: u32,
    /// Absolute offset of the local file header within the archive buffer.
    pub local_header_offset: u32,
}

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

/// Parse every central directory record described by `eocd`.
///
/// Records are read back to back starting at `eocd.cd_offset`; each
/// record's stated name/extra/comment lengths determine where the next one
/// begins, so a truncated or inconsistent directory surfaces as an error
/// rather than reading past the buffer.
pub fn parse_records(
    buffer: &[u8],
    eocd: &EndOfCentralDirectory,
) -> Result<Vec<CentralDirectoryRecord>> {
    let mut records = Vec::with_capacity(eocd.entry_count as usize);
    let mut offset = eocd.cd_offset as usize;

    for _ in 0..eocd.entry_count {
        if offset + RECORD_FIXED_SIZE > buffer.len() {
            return Err(RezipError::invalid_header(
                "central directory record overruns the archive buffer",
            ));
        }

        let signature = read_u32(buffer, offset);
        if signature != CENTRAL_DIR_HEADER_SIG {
            return Err(RezipError::invalid_magic(
                CENTRAL_DIR_HEADER_SIG.to_le_bytes().to_vec(),
                signature.to_le_bytes().to_vec(),
            ));
        }

        let method = CompressionMethod::from_u16(read_u16(buffer, offset + 10));
        let dos_timestamp = read_u32(buffer, offset + 12);
        let crc32 = read_u32(buffer, offset + 16);
        let compressed_size = read_u32(buffer, offset + 20);
        let uncompressed_size = read_u32(buffer, offset + 24);
        let name_len = read_u16(buffer, offset + 28) as usize;
        let extra_len = read_u16(buffer, offset + 30) as usize;
        let comment_len = read_u16(buffer, offset + 32) as usize;
        let local_header_offset = read_u32(buffer, offset + 42);

        let record_len = RECORD_FIXED_SIZE + name_len + extra_len + comment_len;
        if offset + record_len > buffer.len() {
            return Err(RezipError::invalid_header(
                "central directory record's name/extra/comment length overruns the buffer",
            ));
        }

        let name_bytes = &buffer[offset + RECORD_FIXED_SIZE..offset + RECORD_FIXED_SIZE + name_len];
        let name = String::from_utf8_lossy(name_bytes).into_owned();
        let is_directory = name.ends_with('/');

        records.push(CentralDirectoryRecord {
            name,
            is_directory,
            method,
            crc32,
            uncompressed_size,
            compressed_size,
            dos_timestamp,
            local_header_offset,
        });

        offset += record_len;
    }

    Ok(records)
}
