//! Archive entry metadata and the directory tree arena.
//!
//! This module defines `Entry`, the metadata record for a file or
//! synthesized directory within a ZIP archive, plus `EntryTree`: an
//! arena-backed tree of entries. Parent/child links are stored as indices
//! into the arena rather than as owned references, which sidesteps the
//! double-ownership problem a `Rc<RefCell<Node>>` tree runs into when a
//! node needs to point both down at its children and up at its parent.

/// Opaque handle to an `Entry` stored in an `EntryTree`.
///
/// `EntryId` values are only meaningful relative to the `EntryTree` that
/// produced them; mixing handles from two different trees is a logic error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u32);

impl EntryId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Compression method used for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    /// No compression (method 0).
    #[default]
    Stored,
    /// DEFLATE compression (method 8).
    Deflate,
    /// Any method this reader does not implement.
    Unknown(u16),
}

impl CompressionMethod {
    /// Decode a ZIP compression method identifier.
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::Stored,
            8 => Self::Deflate,
            other => Self::Unknown(other),
        }
    }

    /// Name of the method, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stored => "Stored",
            Self::Deflate => "Deflate",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl std::fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(id) => write!(f, "Unknown({})", id),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// An entry in the reconstructed directory tree: a real ZIP file record, a
/// real ZIP directory record, or a directory synthesized because the
/// archive had no explicit entry naming it.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Base name of this entry (the last path component, no slashes).
    pub name: String,
    /// Full path of this entry from the archive root, using `/` separators.
    /// Directory paths end with a trailing `/`; the root is `""`.
    pub path: String,
    /// Whether this entry is a directory (real or synthesized).
    pub is_directory: bool,
    /// Whether this directory exists only because nothing in the central
    /// directory named it explicitly. Always `false` for files.
    pub synthesized: bool,
    /// Uncompressed size in bytes (0 for directories).
    pub size: u64,
    /// Compressed size in bytes as recorded in the central directory
    /// (0 for directories).
    pub compressed_size: u64,
    /// Compression method (meaningless for directories).
    pub method: CompressionMethod,
    /// CRC-32 of the uncompressed data, as recorded in the central
    /// directory (0 for directories).
    pub crc32: u32,
    /// Raw MS-DOS packed date/time, kept opaque rather than converted.
    pub dos_timestamp: u32,
    /// Byte offset of the local file header within the archive buffer.
    /// Meaningless for synthesized directories.
    pub local_header_offset: u64,
    /// Archive comment attached to this entry's central directory record,
    /// if any.
    pub comment: Option<String>,
    parent: Option<EntryId>,
    children: Vec<EntryId>,
}

impl Entry {
    /// Whether this is a regular file entry.
    pub fn is_file(&self) -> bool {
        !self.is_directory
    }

    /// Whether this is a directory entry (real or synthesized).
    pub fn is_dir(&self) -> bool {
        self.is_directory
    }

    /// Build a file entry from its central directory fields.
    ///
    /// `parent`/`children` are left empty; `EntryTree::insert` fills in the
    /// parent link when the entry is added to a tree.
    #[allow(clippy::too_many_arguments)]
    pub fn new_file(
        name: impl Into<String>,
        path: impl Into<String>,
        size: u64,
        compressed_size: u64,
        method: CompressionMethod,
        crc32: u32,
        dos_timestamp: u32,
        local_header_offset: u64,
        comment: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_directory: false,
            synthesized: false,
            size,
            compressed_size,
            method,
            crc32,
            dos_timestamp,
            local_header_offset,
            comment,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Build a directory entry, either one named explicitly in the central
    /// directory (`synthesized = false`) or one synthesized to fill a gap
    /// in the tree (`synthesized = true`).
    #[allow(clippy::too_many_arguments)]
    pub fn new_directory(
        name: impl Into<String>,
        path: impl Into<String>,
        synthesized: bool,
        size: u64,
        crc32: u32,
        dos_timestamp: u32,
        local_header_offset: u64,
        comment: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_directory: true,
            synthesized,
            size,
            compressed_size: 0,
            method: CompressionMethod::Stored,
            crc32,
            dos_timestamp,
            local_header_offset,
            comment,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An arena-backed tree of `Entry` nodes, reconstructed from a ZIP central
/// directory.
///
/// Index 0 is always the synthesized root directory (`path == ""`), which
/// has no entry of its own in the archive.
#[derive(Debug)]
pub struct EntryTree {
    entries: Vec<Entry>,
}

impl EntryTree {
    /// Create a new tree containing only the synthesized root directory.
    pub fn new() -> Self {
        Self {
            entries: vec![Entry {
                name: String::new(),
                path: String::new(),
                is_directory: true,
                synthesized: true,
                size: 0,
                compressed_size: 0,
                method: CompressionMethod::Stored,
                crc32: 0,
                dos_timestamp: 0,
                local_header_offset: 0,
                comment: None,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The root directory's id.
    pub fn root(&self) -> EntryId {
        EntryId(0)
    }

    /// Borrow an entry by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn get(&self, id: EntryId) -> &Entry {
        &self.entries[id.index()]
    }

    /// The number of entries in the tree, including the synthesized root.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree contains only the synthesized root.
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// The parent of `id`, or `None` if `id` is the root.
    pub fn parent(&self, id: EntryId) -> Option<EntryId> {
        self.entries[id.index()].parent
    }

    /// The direct children of `id`, in insertion order.
    pub fn children(&self, id: EntryId) -> &[EntryId] {
        &self.entries[id.index()].children
    }

    /// Look up a direct child of `parent` by base name.
    pub fn find_child(&self, parent: EntryId, name: &str) -> Option<EntryId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.entries[child.index()].name == name)
    }

    /// Insert a new entry as a child of `parent`, returning its id.
    pub fn insert(&mut self, parent: EntryId, mut entry: Entry) -> EntryId {
        let id = EntryId(self.entries.len() as u32);
        entry.parent = Some(parent);
        self.entries.push(entry);
        self.entries[parent.index()].children.push(id);
        id
    }

    /// Iterate over every entry in the tree in arena order (root first,
    /// and every parent before its children).
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (EntryId(i as u32), e))
    }

    /// Collect the ids of every descendant of `id`, depth-first with each
    /// parent visited immediately before its own children.
    pub fn descendants(&self, id: EntryId) -> Vec<EntryId> {
        let mut result = Vec::new();
        let mut stack: Vec<EntryId> = self.children(id).to_vec();
        stack.reverse();
        while let Some(next) = stack.pop() {
            result.push(next);
            let mut kids = self.children(next).to_vec();
            kids.reverse();
            stack.extend(kids);
        }
        result
    }
}

impl Default for EntryTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, name: &str) -> Entry {
        Entry {
            name: name.to_string(),
            path: path.to_string(),
            is_directory: false,
            synthesized: false,
            size: 10,
            compressed_size: 10,
            method: CompressionMethod::Stored,
            crc32: 0,
            dos_timestamp: 0,
            local_header_offset: 0,
            comment: None,
            parent: None,
            children: Vec::new(),
        }
    }

    fn dir(path: &str, name: &str) -> Entry {
        let mut e = file(path, name);
        e.is_directory = true;
        e.synthesized = true;
        e
    }

    #[test]
    fn test_tree_insert_and_lookup() {
        let mut tree = EntryTree::new();
        let root = tree.root();
        let child = tree.insert(root, file("a.txt", "a.txt"));

        assert_eq!(tree.parent(child), Some(root));
        assert_eq!(tree.children(root), &[child]);
        assert_eq!(tree.find_child(root, "a.txt"), Some(child));
        assert!(tree.find_child(root, "missing").is_none());
    }

    #[test]
    fn test_compression_method_from_u16() {
        assert_eq!(CompressionMethod::from_u16(0), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from_u16(8), CompressionMethod::Deflate);
        assert_eq!(
            CompressionMethod::from_u16(99),
            CompressionMethod::Unknown(99)
        );
    }

    #[test]
    fn test_descendants_depth_first_parent_before_children() {
        let mut tree = EntryTree::new();
        let root = tree.root();
        let d = tree.insert(root, dir("dir/", "dir"));
        let inner = tree.insert(d, file("dir/b.txt", "b.txt"));
        let top = tree.insert(root, file("a.txt", "a.txt"));

        let order = tree.descendants(root);
        assert_eq!(order, vec![d, inner, top]);
    }

    #[test]
    fn test_synthesized_directory_flag() {
        let mut tree = EntryTree::new();
        let root = tree.root();
        let synthesized = tree.insert(root, dir("pkg/", "pkg"));
        let real = tree.insert(root, file("a.txt", "a.txt"));

        assert!(tree.get(synthesized).synthesized);
        assert!(!tree.get(real).synthesized);
        assert!(tree.get(root).is_dir());
    }
}
