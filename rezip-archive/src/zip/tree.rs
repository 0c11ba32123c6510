//! Directory tree reconstruction from a flat central directory listing.
//!
//! ZIP archives often omit explicit records for intermediate directories —
//! a lone entry named `a/b/c.txt` implies directories `a/` and `a/b/` that
//! may never appear in the central directory themselves. This module walks
//! each record's path components and synthesizes whatever directory nodes
//! are missing, so the resulting [`rezip_core::entry::EntryTree`] is always
//! fully connected from the root down to every file.

use crate::zip::central_directory::CentralDirectoryRecord;
use rezip_core::entry::{Entry, EntryId, EntryTree};
use std::collections::HashMap;
use std::cmp::Ordering;

/// Maps a normalised path (no leading/trailing `/`) to the directory entry
/// that owns it — real or synthesized.
pub type DirectoryIndex = HashMap<String, EntryId>;

/// Build a directory tree from a flat list of central directory records.
///
/// Records are sorted directories-first (ties broken lexicographically) so
/// that an explicit directory record is always the one reused, rather than
/// being shadowed by a synthesized stub created while walking an earlier
/// file's path.
pub fn build_tree(mut records: Vec<CentralDirectoryRecord>) -> (EntryTree, DirectoryIndex) {
    records.sort_by(|a, b| match (a.is_directory, b.is_directory) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });

    let mut tree = EntryTree::new();
    let mut dirs: DirectoryIndex = HashMap::new();

    for record in records {
        insert_record(&mut tree, &mut dirs, &record);
    }

    (tree, dirs)
}

fn insert_record(tree: &mut EntryTree, dirs: &mut DirectoryIndex, record: &CentralDirectoryRecord) {
    let trimmed = record.name.trim_end_matches('/');
    let components: Vec<&str> = trimmed.split('/').filter(|c| !c.is_empty()).collect();
    if components.is_empty() {
        return;
    }

    let mut current = tree.root();
    let mut cumulative = String::new();

    for (i, component) in components.iter().enumerate() {
        let is_last = i == components.len() - 1;
        if !cumulative.is_empty() {
            cumulative.push('/');
        }
        cumulative.push_str(component);

        if is_last && !record.is_directory {
            let entry = Entry::new_file(
                (*component).to_string(),
                cumulative.clone(),
                record.uncompressed_size as u64,
                record.compressed_size as u64,
                record.method,
                record.crc32,
                record.dos_timestamp,
                record.local_header_offset as u64,
                None,
            );
            tree.insert(current, entry);
            return;
        }

        current = if let Some(&existing) = dirs.get(&cumulative) {
            existing
        } else if is_last && record.is_directory {
            let entry = Entry::new_directory(
                (*component).to_string(),
                format!("{cumulative}/"),
                false,
                record.uncompressed_size as u64,
                record.crc32,
                record.dos_timestamp,
                record.local_header_offset as u64,
                None,
            );
            let id = tree.insert(current, entry);
            dirs.insert(cumulative.clone(), id);
            id
        } else {
            let entry = Entry::new_directory(
                (*component).to_string(),
                format!("{cumulative}/"),
                true,
                0,
                0,
                record.dos_timestamp,
                0,
                None,
            );
            let id = tree.insert(current, entry);
            dirs.insert(cumulative.clone(), id);
            id
        };
    }
}
