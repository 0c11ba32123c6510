//! DEFLATE decompression (inflate).
//!
//! This module implements the DEFLATE decompression algorithm as specified
//! in RFC 1951. It supports all three block types:
//! - Type 0: Stored (uncompressed)
//! - Type 1: Fixed Huffman codes
//! - Type 2: Dynamic Huffman codes

use crate::huffman::HuffmanTree;
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS, decode_distance, decode_length,
    fixed_distance_tree, fixed_litlen_tree,
};
use rezip_core::error::{Result, RezipError};
use rezip_core::traits::{DecompressStatus, Decompressor};
use rezip_core::{BitReader, OutputRingBuffer};
use std::io::Read;

/// Maximum back-reference window for DEFLATE (32KB).
pub const MAX_DICTIONARY_SIZE: usize = 32768;

/// Multiplier used to speculatively size the output buffer when the caller
/// has not supplied an expected uncompressed size.
const SPECULATIVE_SIZE_MULTIPLIER: usize = 7;

/// Default output buffer capacity when no size hint is available and the
/// compressed length is unknown (streaming `Decompressor` use).
const DEFAULT_OUTPUT_CAPACITY: usize = 65536;

/// DEFLATE decompressor.
#[derive(Debug)]
pub struct Inflater {
    /// Output ring buffer.
    output: OutputRingBuffer,
    /// Whether we've seen the final block.
    final_block: bool,
    /// Whether decompression is complete.
    finished: bool,
    /// For the streaming `Decompressor` interface: how many bytes of the
    /// fully decompressed output have already been copied out to a caller.
    delivered: usize,
}

impl Inflater {
    /// Create a new DEFLATE decompressor with a default-sized output buffer.
    pub fn new() -> Self {
        Self {
            output: OutputRingBuffer::with_capacity(MAX_DICTIONARY_SIZE, DEFAULT_OUTPUT_CAPACITY),
            final_block: false,
            finished: false,
            delivered: 0,
        }
    }

    /// Create a new DEFLATE decompressor whose output buffer is sized
    /// according to the caller's knowledge of the stream.
    ///
    /// If `expected_size` is known (e.g. the uncompressed size from a ZIP
    /// central directory record), the buffer is allocated to exactly that
    /// size. Otherwise the buffer is sized speculatively as
    /// `7 × compressed_size`, which is then grown on demand if the stream
    /// turns out to be more compressible than that.
    pub fn with_size_hint(expected_size: Option<u64>, compressed_size: u64) -> Self {
        let capacity = match expected_size {
            Some(size) => size as usize,
            None => (compressed_size as usize).saturating_mul(SPECULATIVE_SIZE_MULTIPLIER),
        };
        Self {
            output: OutputRingBuffer::with_capacity(MAX_DICTIONARY_SIZE, capacity.max(1)),
            final_block: false,
            finished: false,
            delivered: 0,
        }
    }

    /// Reset the decompressor to its initial state.
    pub fn reset(&mut self) {
        self.output.clear();
        self.final_block = false;
        self.finished = false;
        self.delivered = 0;
    }

    /// Decompress data from a reader.
    pub fn inflate_reader<R: Read>(&mut self, reader: &mut R) -> Result<Vec<u8>> {
        let mut bit_reader = BitReader::new(reader);
        self.inflate(&mut bit_reader)
    }

    /// Decompress data from a bit reader.
    pub fn inflate<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<Vec<u8>> {
        self.run_to_completion(reader)?;
        self.finished = true;
        Ok(self.output.output().to_vec())
    }

    /// Run the block loop until the final block has been fully decoded,
    /// without touching `finished` (which the streaming `Decompressor`
    /// interface reserves for "every byte has been handed to the caller").
    fn run_to_completion<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        while !self.final_block {
            self.inflate_block(reader)?;
        }
        Ok(())
    }

    /// Decompress a single block.
    fn inflate_block<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        // Read block header
        let bfinal = reader.read_bit()?;
        let btype = reader.read_bits(2)?;

        self.final_block = bfinal;

        match btype {
            0 => self.inflate_stored(reader),
            1 => self.inflate_fixed(reader),
            2 => self.inflate_dynamic(reader),
            3 => Err(RezipError::invalid_header("Reserved block type 3")),
            _ => unreachable!(),
        }
    }

    /// Decompress a stored (uncompressed) block.
    fn inflate_stored<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        // Align to byte boundary
        reader.align_to_byte();

        // Read LEN and NLEN
        let len = reader.read_bits(16)? as u16;
        let nlen = reader.read_bits(16)? as u16;

        // Validate
        if len != !nlen {
            return Err(RezipError::corrupted(
                reader.bit_position() / 8,
                format!("LEN/NLEN mismatch: {} vs {}", len, !nlen),
            ));
        }

        // Copy bytes
        let mut buf = vec![0u8; len as usize];
        reader.read_bytes(&mut buf)?;
        self.output.write_literals(&buf);

        Ok(())
    }

    /// Decompress a block with fixed Huffman codes.
    fn inflate_fixed<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        let litlen_tree = fixed_litlen_tree()?;
        let dist_tree = fixed_distance_tree()?;

        self.inflate_huffman(reader, litlen_tree, dist_tree)
    }

    /// Decompress a block with dynamic Huffman codes.
    fn inflate_dynamic<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        // Read code counts
        let hlit = reader.read_bits(5)? as usize + 257; // literal/length codes
        let hdist = reader.read_bits(5)? as usize + 1; // distance codes
        let hclen = reader.read_bits(4)? as usize + 4; // code length codes

        // Read code length code lengths
        let mut code_length_lengths = [0u8; 19];
        for i in 0..hclen {
            code_length_lengths[CODE_LENGTH_ORDER[i]] = reader.read_bits(3)? as u8;
        }

        // Build code length tree
        let code_length_tree = HuffmanTree::from_code_lengths(&code_length_lengths)?;

        // Read literal/length and distance code lengths
        let mut all_lengths = vec![0u8; hlit + hdist];
        let mut i = 0;

        while i < all_lengths.len() {
            let code = code_length_tree.decode(reader)?;

            match code {
                0..=15 => {
                    all_lengths[i] = code as u8;
                    i += 1;
                }
                16 => {
                    // Copy previous length 3-6 times
                    if i == 0 {
                        return Err(RezipError::corrupted(
                            reader.bit_position() / 8,
                            "Code 16 at start of lengths",
                        ));
                    }
                    let repeat = reader.read_bits(2)? as usize + 3;
                    let prev = all_lengths[i - 1];
                    for _ in 0..repeat {
                        if i >= all_lengths.len() {
                            return Err(RezipError::corrupted(
                                reader.bit_position() / 8,
                                "Code length overflow",
                            ));
                        }
                        all_lengths[i] = prev;
                        i += 1;
                    }
                }
                17 => {
                    // Repeat 0 for 3-10 times
                    let repeat = reader.read_bits(3)? as usize + 3;
                    for _ in 0..repeat {
                        if i >= all_lengths.len() {
                            return Err(RezipError::corrupted(
                                reader.bit_position() / 8,
                                "Code length overflow",
                            ));
                        }
                        all_lengths[i] = 0;
                        i += 1;
                    }
                }
                18 => {
                    // Repeat 0 for 11-138 times
                    let repeat = reader.read_bits(7)? as usize + 11;
                    for _ in 0..repeat {
                        if i >= all_lengths.len() {
                            return Err(RezipError::corrupted(
                                reader.bit_position() / 8,
                                "Code length overflow",
                            ));
                        }
                        all_lengths[i] = 0;
                        i += 1;
                    }
                }
                _ => {
                    return Err(RezipError::invalid_huffman(reader.bit_position()));
                }
            }
        }

        // Split into literal/length and distance lengths
        let litlen_lengths = &all_lengths[..hlit];
        let dist_lengths = &all_lengths[hlit..];

        // Build trees
        let litlen_tree = HuffmanTree::from_code_lengths(litlen_lengths)?;
        let dist_tree = HuffmanTree::from_code_lengths(dist_lengths)?;

        self.inflate_huffman(reader, &litlen_tree, &dist_tree)
    }

    /// Decompress using Huffman codes.
    fn inflate_huffman<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        litlen_tree: &HuffmanTree,
        dist_tree: &HuffmanTree,
    ) -> Result<()> {
        loop {
            let code = litlen_tree.decode(reader)?;

            if code < 256 {
                // Literal byte
                self.output.write_literal(code as u8);
            } else if code == 256 {
                // End of block
                break;
            } else if code <= 285 {
                // Length code
                let length_idx = (code - 257) as usize;
                let extra_bits = LENGTH_EXTRA_BITS[length_idx];
                let extra = reader.read_bits(extra_bits)? as u16;
                let length = decode_length(code, extra);

                // Read distance
                let dist_code = dist_tree.decode(reader)?;
                if dist_code >= 30 {
                    return Err(RezipError::corrupted(
                        reader.bit_position() / 8,
                        format!("Invalid distance code: {}", dist_code),
                    ));
                }

                let dist_extra_bits = DISTANCE_EXTRA_BITS[dist_code as usize];
                let dist_extra = reader.read_bits(dist_extra_bits)? as u16;
                let distance = decode_distance(dist_code, dist_extra);

                // Copy from history
                self.output.copy_match(distance as usize, length as usize)?;
            } else {
                return Err(RezipError::corrupted(
                    reader.bit_position() / 8,
                    format!("Invalid literal/length code: {}", code),
                ));
            }
        }

        Ok(())
    }

    /// Get the decompressed output.
    pub fn output(&self) -> &[u8] {
        self.output.output()
    }

    /// Take ownership of the decompressed output.
    pub fn into_output(self) -> Vec<u8> {
        self.output.into_output()
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for Inflater {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        // The in-memory ZIP reader always hands the whole compressed stream
        // to the first call, so there is nothing left to consume on later
        // ones; but the caller's output buffer may be smaller than the
        // fully decompressed size, so draining it can take several calls.
        // `delivered` tracks how much of `self.output` has already been
        // copied out, so no produced byte is ever silently dropped.
        if self.finished {
            return Ok((0, 0, DecompressStatus::Done));
        }

        let consumed = if !self.final_block {
            let mut cursor = std::io::Cursor::new(input);
            {
                let mut bit_reader = BitReader::new(&mut cursor);
                self.run_to_completion(&mut bit_reader)?;
            }
            cursor.position() as usize
        } else {
            0
        };

        let produced_total = self.output.output_len();
        let start = self.delivered;
        let to_copy = (produced_total - start).min(output.len());
        output[..to_copy].copy_from_slice(&self.output.output()[start..start + to_copy]);
        self.delivered += to_copy;

        let status = if self.delivered >= produced_total {
            self.finished = true;
            DecompressStatus::Done
        } else {
            DecompressStatus::NeedsOutput
        };

        Ok((consumed, to_copy, status))
    }

    fn reset(&mut self) {
        Inflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Decompress a raw DEFLATE stream with no size hint.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Inflater::new();
    let mut cursor = std::io::Cursor::new(data);
    inflater.inflate_reader(&mut cursor)
}

/// Decompress a raw DEFLATE stream, sizing the output buffer from the
/// caller's expected uncompressed size (when known) or speculatively from
/// the compressed length otherwise.
///
/// This is the entry point ZIP entry extraction uses: `expected_size` comes
/// from the central directory's uncompressed-size field.
pub fn inflate_with_size_hint(data: &[u8], expected_size: Option<u64>) -> Result<Vec<u8>> {
    let mut inflater = Inflater::with_size_hint(expected_size, data.len() as u64);
    let mut cursor = std::io::Cursor::new(data);
    inflater.inflate_reader(&mut cursor)
}
