//! End-of-Central-Directory (EOCD) record location.

use rezip_core::error::{RezipError, Result};

/// EOCD signature (`PK\x05\x06`).
pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4B50;

/// Fixed size of the EOCD record, not counting the trailing comment.
const EOCD_FIXED_SIZE: usize = 22;

/// Maximum size of a ZIP archive comment, which bounds how far back from
/// the end of the buffer the EOCD signature can appear.
const MAX_COMMENT_SIZE: usize = 65535;

/// Fields of interest from the End-of-Central-Directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    /// Number of records in the central directory.
    pub entry_count: u16,
    /// Absolute byte offset of the central directory within the archive.
    pub cd_offset: u32,
}

/// Locate and parse the EOCD record within `buffer`.
///
/// Scans backward from the end of the buffer for the EOCD signature,
/// bounded to the last `22 + 65535` bytes (the largest an EOCD record plus
/// comment can be) rather than scanning the entire buffer unbounded. This
/// avoids both pathological slowness and spurious signature matches deep
/// inside a large archive body.
pub fn find_eocd(buffer: &[u8]) -> Result<EndOfCentralDirectory> {
    if buffer.len() < EOCD_FIXED_SIZE {
        return Err(RezipError::invalid_header(
            "buffer too small to contain an end-of-central-directory record",
        ));
    }

    let sig = END_OF_CENTRAL_DIR_SIG.to_le_bytes();
    let window_start = buffer
        .len()
        .saturating_sub(EOCD_FIXED_SIZE + MAX_COMMENT_SIZE);

    let eocd_pos = buffer[window_start..]
        .windows(4)
        .rposition(|w| w == sig)
        .map(|offset| window_start + offset)
        .ok_or_else(|| {
            RezipError::invalid_header("end-of-central-directory signature not found")
        })?;

    if eocd_pos + EOCD_FIXED_SIZE > buffer.len() {
        return Err(RezipError::invalid_header(
            "end-of-central-directory record overruns the archive buffer",
        ));
    }

    let record = &buffer[eocd_pos..];
    let entry_count = u16::from_le_bytes([record[10], record[11]]);
    let cd_offset = u32::from_le_bytes([record[16], record[17], record[18], record[19]]);

    Ok(EndOfCentralDirectory {
        entry_count,
        cd_offset,
    })
}
