//! `ZipReader`: the public surface for reading an in-memory ZIP archive.
//!
//! A `ZipReader` owns the archive buffer and the directory tree reconstructed
//! from its central directory. Both are immutable after [`ZipReader::load`];
//! extraction allocates fresh output buffers and never touches reader state,
//! so concurrent extractions from the same reader (or from distinct readers)
//! are trivially safe.

use crate::zip::central_directory::parse_records;
use crate::zip::eocd::find_eocd;
use crate::zip::local_header::{find_data_descriptor, read_local_header};
use crate::zip::tree::{DirectoryIndex, build_tree};
use rezip_core::crc::Crc32;
use rezip_core::entry::{CompressionMethod, Entry, EntryId, EntryTree};
use rezip_core::error::{RezipError, Result};
use rezip_deflate::inflate_with_size_hint;
use std::collections::HashMap;

/// Options controlling a single `extract` call.
///
/// `decompress` defaults to `true`; the rest default to `false`.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Run the entry's compressed data through the appropriate decompressor.
    /// When `false`, the raw compressed bytes are returned as-is and no
    /// validation is performed.
    pub decompress: bool,
    /// Return the extracted bytes decoded as a UTF-8 string (lossily) rather
    /// than as a byte buffer.
    pub is_string: bool,
    /// Skip CRC-32 validation against the entry's stored checksum.
    pub skip_crc_validation: bool,
    /// Skip validation that the decompressed length matches the entry's
    /// stored uncompressed size.
    pub skip_size_validation: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            decompress: true,
            is_string: false,
            skip_crc_validation: false,
            skip_size_validation: false,
        }
    }
}

/// The result of [`ZipReader::extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedContent {
    /// Raw (or decompressed) bytes.
    Bytes(Vec<u8>),
    /// Bytes decoded as a string, requested via `ExtractOptions::is_string`.
    Text(String),
}

impl ExtractedContent {
    /// Borrow the content as bytes regardless of which variant it is.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Bytes(b) => b,
            Self::Text(s) => s.as_bytes(),
        }
    }
}

/// Aggregate counts over every entry in a loaded archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Number of file entries (directories excluded).
    pub file_count: usize,
    /// Number of directory entries, synthesized or explicit.
    pub dir_count: usize,
    /// Sum of every file entry's uncompressed size.
    pub total_size: u64,
}

/// A loaded, read-only view of a ZIP archive backed by an in-memory buffer.
pub struct ZipReader {
    buffer: Vec<u8>,
    tree: EntryTree,
    dirs: DirectoryIndex,
}

impl ZipReader {
    /// Parse `buffer` as a ZIP archive and reconstruct its directory tree.
    ///
    /// This locates the end-of-central-directory record, walks every central
    /// directory record, and synthesizes any directory entries implied but
    /// not explicitly present. It does not touch any local file header —
    /// those are only consulted lazily, by `extract`.
    pub fn load(buffer: Vec<u8>) -> Result<Self> {
        let eocd = find_eocd(&buffer)?;
        let records = parse_records(&buffer, &eocd)?;
        let (tree, dirs) = build_tree(records);
        Ok(Self { buffer, tree, dirs })
    }

    /// The synthesized root directory entry.
    pub fn root(&self) -> &Entry {
        self.tree.get(self.tree.root())
    }

    /// Look up an entry's id by path.
    ///
    /// `"/"` resolves to the root. Otherwise the path is normalised by
    /// stripping one leading and one trailing `/`, then matched against
    /// every entry's path (directories compared with their trailing `/`
    /// stripped); on miss, the directory index is consulted as a fallback.
    fn find_entry_id(&self, path: &str) -> Option<EntryId> {
        if path == "/" {
            return Some(self.tree.root());
        }

        let normalized = path.trim_start_matches('/').trim_end_matches('/');

        for (id, entry) in self.tree.iter() {
            if id == self.tree.root() {
                continue;
            }
            if entry.path.trim_end_matches('/') == normalized {
                return Some(id);
            }
        }

        self.dirs.get(normalized).copied()
    }

    /// Look up an entry by path. See [`ZipReader::find_entry_id`] for the
    /// resolution rule.
    pub fn find_entry(&self, path: &str) -> Option<&Entry> {
        self.find_entry_id(path).map(|id| self.tree.get(id))
    }

    /// List the direct children of the directory at `path`.
    ///
    /// Fails with [`RezipError::NotADirectory`] if `path` resolves to a file,
    /// or [`RezipError::EntryNotFound`] if it does not resolve at all.
    pub fn list_directory(&self, path: &str) -> Result<Vec<&Entry>> {
        let id = self
            .find_entry_id(path)
            .ok_or_else(|| RezipError::entry_not_found(path))?;

        if !self.tree.get(id).is_directory {
            return Err(RezipError::not_a_directory(&self.tree.get(id).path));
        }

        Ok(self.tree.children(id).iter().map(|&c| self.tree.get(c)).collect())
    }

    /// Visit every entry in pre-order (parent before children), starting
    /// from the root at depth 0.
    pub fn walk<F: FnMut(&Entry, usize)>(&self, mut callback: F) {
        self.walk_from(self.tree.root(), 0, &mut callback);
    }

    fn walk_from<F: FnMut(&Entry, usize)>(&self, id: EntryId, depth: usize, callback: &mut F) {
        callback(self.tree.get(id), depth);
        for &child in self.tree.children(id) {
            self.walk_from(child, depth + 1, callback);
        }
    }

    /// Extract a single entry's content.
    ///
    /// Fails with [`RezipError::DirectoryExtractionRejected`] if `entry` is a
    /// directory. Otherwise re-reads the local file header at the entry's
    /// offset (the authoritative source for compression method and, when a
    /// data descriptor is present, size/CRC), slices out the compressed
    /// payload, optionally decompresses it, and validates the result against
    /// the stored CRC-32 and uncompressed size unless the caller opted out.
    pub fn extract(&self, entry: &Entry, options: &ExtractOptions) -> Result<ExtractedContent> {
        if entry.is_directory {
            return Err(RezipError::directory_extraction_rejected(
                &entry.path,
                "extract was called on a directory entry",
            ));
        }

        let header = read_local_header(&self.buffer, entry.local_header_offset as usize)?;

        let (crc32, compressed_size, uncompressed_size, data_offset) =
            if header.has_data_descriptor() {
                let descriptor =
                    find_data_descriptor(&self.buffer, header.data_offset, entry.crc32)?;
                (
                    descriptor.crc32,
                    descriptor.compressed_size,
                    descriptor.uncompressed_size,
                    header.data_offset,
                )
            } else {
                (
                    header.crc32,
                    header.compressed_size,
                    header.uncompressed_size,
                    header.data_offset,
                )
            };

        let payload_end = data_offset
            .checked_add(compressed_size as usize)
            .ok_or_else(|| RezipError::invalid_header("compressed size overflows archive buffer"))?;
        if payload_end > self.buffer.len() {
            return Err(RezipError::invalid_header(
                "entry's compressed data overruns the archive buffer",
            ));
        }
        let payload = &self.buffer[data_offset..payload_end];

        let bytes = if options.decompress {
            let output = match header.method {
                CompressionMethod::Stored => payload.to_vec(),
                CompressionMethod::Deflate => {
                    inflate_with_size_hint(payload, Some(uncompressed_size as u64))?
                }
                CompressionMethod::Unknown(method) => {
                    return Err(RezipError::unsupported_method(format!("method {method}")));
                }
            };

            if !options.skip_crc_validation {
                let computed = Crc32::compute(&output);
                if computed != crc32 {
                    return Err(RezipError::crc_mismatch(crc32, computed));
                }
            }
            if !options.skip_size_validation && output.len() as u64 != uncompressed_size as u64 {
                return Err(RezipError::size_mismatch(
                    uncompressed_size as u64,
                    output.len() as u64,
                ));
            }

            output
        } else {
            payload.to_vec()
        };

        if options.is_string {
            Ok(ExtractedContent::Text(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        } else {
            Ok(ExtractedContent::Bytes(bytes))
        }
    }

    /// Extract every file whose path starts with `path`, as a bulk subtree
    /// extraction.
    ///
    /// `path` is normalised by stripping one leading `/`; matching is a
    /// plain string-prefix test against each file's full path (not bounded
    /// to path-component edges), matching the reference behaviour.
    pub fn extract_directory(
        &self,
        path: &str,
        options: &ExtractOptions,
    ) -> Result<HashMap<String, ExtractedContent>> {
        let normalized = path.trim_start_matches('/');

        let mut out = HashMap::new();
        for (id, entry) in self.tree.iter() {
            if id == self.tree.root() || entry.is_directory {
                continue;
            }
            if entry.path.starts_with(normalized) {
                let content = self.extract(entry, options)?;
                out.insert(entry.path.clone(), content);
            }
        }
        Ok(out)
    }

    /// Aggregate file/directory counts and total uncompressed size across
    /// every entry (the synthesized root excluded).
    pub fn get_stats(&self) -> Stats {
        let mut stats = Stats::default();
        for (id, entry) in self.tree.iter() {
            if id == self.tree.root() {
                continue;
            }
            if entry.is_directory {
                stats.dir_count += 1;
            } else {
                stats.file_count += 1;
                stats.total_size += entry.size;
            }
        }
        stats
    }
}
