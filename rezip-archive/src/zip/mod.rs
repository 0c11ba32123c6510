//! ZIP archive decoding.
//!
//! Submodules mirror the dependency order from the system design: locate
//! the end-of-central-directory record, parse the central directory it
//! points at, reconstruct a directory tree from the flat record list, then
//! expose it all through [`ZipReader`].

mod central_directory;
mod eocd;
mod local_header;
mod reader;
mod tree;

pub use reader::{ExtractOptions, ExtractedContent, Stats, ZipReader};
