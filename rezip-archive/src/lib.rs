//! # rezip-archive
//!
//! Read-only ZIP archive decoding over an in-memory byte buffer.
//!
//! This crate reconstructs a ZIP archive's directory tree from its central
//! directory and extracts individual entries (or whole subtrees) on demand,
//! validating CRC-32 and size by default. It never writes archives and
//! never touches the filesystem directly — callers own the byte buffer.
//!
//! See [`zip::ZipReader`] for the public surface.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod zip;

pub use zip::{ExtractOptions, ExtractedContent, Stats, ZipReader};
