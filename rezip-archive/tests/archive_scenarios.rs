//! End-to-end scenarios over hand-built ZIP archives.
//!
//! This crate is decode-only, so there is no encoder to round-trip through;
//! every archive here is assembled byte-by-byte (or with the small
//! `ZipBuilder` helper below) the way a real ZIP writer would lay one out.

use rezip_archive::{ExtractOptions, ExtractedContent, ZipReader};
use rezip_core::crc::Crc32;

const LOCAL_FILE_HEADER_SIG: u32 = 0x0403_4B50;
const CENTRAL_DIR_HEADER_SIG: u32 = 0x0201_4B50;
const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4B50;
const DATA_DESCRIPTOR_SIG: u32 = 0x0807_4B50;
const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

/// Wrap raw bytes in a DEFLATE stream using a single final stored block.
/// This is a valid (if trivially compressed) DEFLATE stream, so it
/// exercises the method-8 extraction path without needing an encoder.
fn deflate_stored(data: &[u8]) -> Vec<u8> {
    assert!(data.len() <= 0xFFFF, "test helper only handles one block");
    let mut out = vec![0x01]; // BFINAL=1, BTYPE=00, padding zero bits
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(&(!(data.len() as u16)).to_le_bytes());
    out.extend_from_slice(data);
    out
}

struct TestEntry {
    /// Stored path; a trailing `/` marks a directory, as everywhere else.
    name: &'static str,
    method: u16,
    stored_bytes: Vec<u8>,
    crc: u32,
    uncompressed_size: u32,
    use_data_descriptor: bool,
    descriptor_has_signature: bool,
}

impl TestEntry {
    fn file(name: &'static str, method: u16, stored_bytes: Vec<u8>, original: &[u8]) -> Self {
        Self {
            name,
            method,
            stored_bytes,
            crc: Crc32::compute(original),
            uncompressed_size: original.len() as u32,
            use_data_descriptor: false,
            descriptor_has_signature: false,
        }
    }

    fn directory(name: &'static str) -> Self {
        Self {
            name,
            method: 0,
            stored_bytes: Vec::new(),
            crc: 0,
            uncompressed_size: 0,
            use_data_descriptor: false,
            descriptor_has_signature: false,
        }
    }

    fn with_data_descriptor(mut self, signature: bool) -> Self {
        self.use_data_descriptor = true;
        self.descriptor_has_signature = signature;
        self
    }
}

/// Assemble local headers, central directory, and EOCD for a set of test
/// entries into one archive buffer.
fn build_zip(entries: Vec<TestEntry>) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut local_offsets = Vec::with_capacity(entries.len());

    for entry in &entries {
        local_offsets.push(buf.len() as u32);

        let flags: u16 = if entry.use_data_descriptor {
            FLAG_DATA_DESCRIPTOR
        } else {
            0
        };
        let (header_crc, header_compressed, header_uncompressed) = if entry.use_data_descriptor {
            (0, 0, 0)
        } else {
            (entry.crc, entry.stored_bytes.len() as u32, entry.uncompressed_size)
        };

        buf.extend_from_slice(&LOCAL_FILE_HEADER_SIG.to_le_bytes());
        buf.extend_from_slice(&20u16.to_le_bytes());
        buf.extend_from_slice(&flags.to_le_bytes());
        buf.extend_from_slice(&entry.method.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&header_crc.to_le_bytes());
        buf.extend_from_slice(&header_compressed.to_le_bytes());
        buf.extend_from_slice(&header_uncompressed.to_le_bytes());
        buf.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(entry.name.as_bytes());
        buf.extend_from_slice(&entry.stored_bytes);

        if entry.use_data_descriptor {
            if entry.descriptor_has_signature {
                buf.extend_from_slice(&DATA_DESCRIPTOR_SIG.to_le_bytes());
            }
            buf.extend_from_slice(&entry.crc.to_le_bytes());
            buf.extend_from_slice(&(entry.stored_bytes.len() as u32).to_le_bytes());
            buf.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
        }
    }

    let cd_start = buf.len() as u32;

    for (entry, &local_offset) in entries.iter().zip(&local_offsets) {
        let flags: u16 = if entry.use_data_descriptor {
            FLAG_DATA_DESCRIPTOR
        } else {
            0
        };
        buf.extend_from_slice(&CENTRAL_DIR_HEADER_SIG.to_le_bytes());
        buf.extend_from_slice(&20u16.to_le_bytes());
        buf.extend_from_slice(&20u16.to_le_bytes());
        buf.extend_from_slice(&flags.to_le_bytes());
        buf.extend_from_slice(&entry.method.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&entry.crc.to_le_bytes());
        buf.extend_from_slice(&(entry.stored_bytes.len() as u32).to_le_bytes());
        buf.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
        buf.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&local_offset.to_le_bytes());
        buf.extend_from_slice(entry.name.as_bytes());
    }

    let cd_size = buf.len() as u32 - cd_start;

    buf.extend_from_slice(&END_OF_CENTRAL_DIR_SIG.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    buf.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    buf.extend_from_slice(&cd_size.to_le_bytes());
    buf.extend_from_slice(&cd_start.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());

    buf
}

#[test]
fn stored_hello_end_to_end() {
    let content = b"Hello";
    let entries = vec![TestEntry::file("hello.txt", 0, content.to_vec(), content)];
    let reader = ZipReader::load(build_zip(entries)).unwrap();

    let entry = reader.find_entry("hello.txt").unwrap();
    assert_eq!(entry.size, 5);

    let got = reader
        .extract(entry, &ExtractOptions { is_string: true, ..Default::default() })
        .unwrap();
    assert_eq!(got, ExtractedContent::Text("Hello".to_string()));

    let stats = reader.get_stats();
    assert_eq!(stats.file_count, 1);
    assert_eq!(stats.dir_count, 0);
    assert_eq!(stats.total_size, 5);
}

#[test]
fn deflate_compressible_repeated_byte() {
    let content = vec![b'A'; 1024];
    let compressed = deflate_stored(&content);
    let entries = vec![TestEntry::file("a.txt", 8, compressed, &content)];
    let reader = ZipReader::load(build_zip(entries)).unwrap();

    let entry = reader.find_entry("a.txt").unwrap();
    let got = reader.extract(entry, &ExtractOptions::default()).unwrap();
    assert_eq!(got.as_bytes(), content.as_slice());
}

#[test]
fn implicit_directories_are_synthesized_and_counted() {
    let content = b"x";
    let entries = vec![TestEntry::file("a/b/c.txt", 0, content.to_vec(), content)];
    let reader = ZipReader::load(build_zip(entries)).unwrap();

    let root_children = reader.list_directory("/").unwrap();
    assert_eq!(root_children.len(), 1);
    assert_eq!(root_children[0].name, "a");

    let a_children = reader.list_directory("a").unwrap();
    assert_eq!(a_children.len(), 1);
    assert_eq!(a_children[0].name, "b");

    let b_children = reader.list_directory("a/b").unwrap();
    assert_eq!(b_children.len(), 1);
    assert_eq!(b_children[0].name, "c.txt");

    let stats = reader.get_stats();
    assert_eq!(stats.file_count, 1);
    assert_eq!(stats.dir_count, 2);
}

#[test]
fn walk_visits_directories_before_their_siblings() {
    let entries = vec![
        TestEntry::directory("dir/"),
        TestEntry::file("dir/f.txt", 0, b"x".to_vec(), b"x"),
        TestEntry::file("g.txt", 0, b"y".to_vec(), b"y"),
    ];
    let reader = ZipReader::load(build_zip(entries)).unwrap();

    let mut visited = Vec::new();
    reader.walk(|entry, depth| visited.push((entry.path.clone(), depth)));

    assert_eq!(
        visited,
        vec![
            (String::new(), 0),
            ("dir/".to_string(), 1),
            ("dir/f.txt".to_string(), 2),
            ("g.txt".to_string(), 1),
        ]
    );
}

#[test]
fn data_descriptor_with_and_without_signature_decode_identically() {
    let content = b"streamed content";
    let with_sig = TestEntry::file("with_sig.txt", 0, content.to_vec(), content)
        .with_data_descriptor(true);
    let without_sig = TestEntry::file("without_sig.txt", 0, content.to_vec(), content)
        .with_data_descriptor(false);

    let reader = ZipReader::load(build_zip(vec![with_sig, without_sig])).unwrap();

    let a = reader.extract(reader.find_entry("with_sig.txt").unwrap(), &ExtractOptions::default()).unwrap();
    let b = reader
        .extract(reader.find_entry("without_sig.txt").unwrap(), &ExtractOptions::default())
        .unwrap();

    assert_eq!(a.as_bytes(), content.as_slice());
    assert_eq!(b.as_bytes(), content.as_slice());
}

#[test]
fn empty_stored_file_has_zero_crc() {
    let entries = vec![TestEntry::file("empty.bin", 0, Vec::new(), b"")];
    let reader = ZipReader::load(build_zip(entries)).unwrap();

    let entry = reader.find_entry("empty.bin").unwrap();
    assert_eq!(entry.crc32, 0);
    let got = reader.extract(entry, &ExtractOptions::default()).unwrap();
    assert!(got.as_bytes().is_empty());
}

#[test]
fn idempotent_extraction_returns_equal_bytes() {
    let content = b"repeat me";
    let entries = vec![TestEntry::file("r.txt", 0, content.to_vec(), content)];
    let reader = ZipReader::load(build_zip(entries)).unwrap();
    let entry = reader.find_entry("r.txt").unwrap();

    let first = reader.extract(entry, &ExtractOptions::default()).unwrap();
    let second = reader.extract(entry, &ExtractOptions::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn extract_directory_collects_every_nested_file() {
    let entries = vec![
        TestEntry::file("pkg/a.txt", 0, b"1".to_vec(), b"1"),
        TestEntry::file("pkg/sub/b.txt", 0, b"2".to_vec(), b"2"),
        TestEntry::file("other.txt", 0, b"3".to_vec(), b"3"),
    ];
    let reader = ZipReader::load(build_zip(entries)).unwrap();

    let extracted = reader
        .extract_directory("pkg", &ExtractOptions::default())
        .unwrap();

    assert_eq!(extracted.len(), 2);
    assert_eq!(extracted["pkg/a.txt"].as_bytes(), b"1");
    assert_eq!(extracted["pkg/sub/b.txt"].as_bytes(), b"2");
    assert!(!extracted.contains_key("other.txt"));
}

#[test]
fn corrupt_central_directory_crc_is_caught_unless_skipped() {
    let content = b"Hello";
    let mut entry = TestEntry::file("hello.txt", 0, content.to_vec(), content);
    entry.crc ^= 0xFFFF_FFFF; // corrupt, local header echoes this value too
    let reader = ZipReader::load(build_zip(vec![entry])).unwrap();
    let entry = reader.find_entry("hello.txt").unwrap();

    assert!(reader.extract(entry, &ExtractOptions::default()).is_err());

    let lenient = ExtractOptions { skip_crc_validation: true, ..Default::default() };
    assert!(reader.extract(entry, &lenient).is_ok());
}

#[test]
fn reserved_deflate_block_type_is_rejected() {
    // BFINAL=1, BTYPE=11 (reserved): a single byte is enough to trigger it.
    let bad_stream = vec![0b0000_0111u8];
    let entries = vec![TestEntry::file("bad.bin", 8, bad_stream, b"")];
    let reader = ZipReader::load(build_zip(entries)).unwrap();
    let entry = reader.find_entry("bad.bin").unwrap();

    assert!(reader.extract(entry, &ExtractOptions::default()).is_err());
}

#[test]
fn empty_archive_has_zero_stats_and_no_children() {
    let reader = ZipReader::load(build_zip(Vec::new())).unwrap();
    let stats = reader.get_stats();
    assert_eq!(stats.file_count, 0);
    assert_eq!(stats.dir_count, 0);
    assert_eq!(stats.total_size, 0);
    assert!(reader.list_directory("/").unwrap().is_empty());
}
