use log::{debug, info, warn};

use crate::bits::{BitReader, BitSink, BitSource, BitWriter, ByteSource, SymbolSource};
use crate::codec::{
    HEADER_BITS, INTERNAL_BITS, LEAF_BITS, decode_payload, encode_payload, read_header,
    read_tree, write_header, write_tree,
};
use crate::error::{HuffError, Result};
use crate::frequency::FrequencyTable;
use crate::huffman::{CodeTable, HuffmanTree, build_code_table, build_huffman_tree};

/// Input and predicted output size of one compression, in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeStats {
    pub input_bits: u64,
    pub estimated_bits: u64,
}

/// Everything computed while compressing one input.
#[derive(Debug)]
pub struct Compression {
    pub frequencies: FrequencyTable,
    pub tree: HuffmanTree,
    pub codes: CodeTable,
    pub stats: SizeStats,
    compressed: bool,
}

impl Compression {
    /// `false` when the output would not have been smaller and compression
    /// was not forced. Nothing was written in that case.
    pub fn was_compressed(&self) -> bool {
        self.compressed
    }
}

#[derive(Debug)]
pub struct Decompression {
    pub data: Vec<u8>,
    pub tree: HuffmanTree,
}

/// Size of the stream `compress` would write, rounded up to whole bytes.
pub fn estimate_compressed_size(
    frequencies: &FrequencyTable,
    codes: &CodeTable,
    tree: &HuffmanTree,
) -> u64 {
    let payload: u64 = codes
        .iter()
        .map(|(symbol, code)| code.len() as u64 * frequencies.count(symbol))
        .sum();
    let structure =
        tree.internal_count() as u64 * INTERNAL_BITS + tree.leaf_count() as u64 * LEAF_BITS;

    (payload + structure + HEADER_BITS).div_ceil(8) * 8
}

pub fn should_compress(input_bits: u64, estimated_bits: u64, force: bool) -> bool {
    force || estimated_bits < input_bits
}

/// Compresses every symbol of `source` into `sink`.
///
/// The source is read twice: once to count symbols and once to encode
/// them. When the result would not be smaller than the input and `force`
/// is unset, nothing is written to `sink`.
pub fn compress_source<S, W>(source: &mut S, sink: &mut W, force: bool) -> Result<Compression>
where
    S: SymbolSource,
    W: BitSink,
{
    let frequencies = FrequencyTable::from_source(source);
    let total = frequencies.total();
    let tree = build_huffman_tree(&frequencies)?;
    let symbol_count =
        u32::try_from(total).map_err(|_| HuffError::InputTooLarge(total as usize))?;
    let codes = build_code_table(&tree);

    let stats = SizeStats {
        input_bits: total * 8,
        estimated_bits: estimate_compressed_size(&frequencies, &codes, &tree),
    };
    debug!(
        "Input {} bits, estimated output {} bits",
        stats.input_bits, stats.estimated_bits
    );

    let compressed = should_compress(stats.input_bits, stats.estimated_bits, force);
    if compressed {
        write_header(sink, symbol_count);
        write_tree(sink, tree.root());
        encode_payload(source, &codes, sink)?;
    } else {
        warn!(
            "Skipping compression: output ({} bits) would not be smaller than input ({} bits)",
            stats.estimated_bits, stats.input_bits
        );
    }

    Ok(Compression {
        frequencies,
        tree,
        codes,
        stats,
        compressed,
    })
}

/// Compresses `input`, returning the stream when one was written.
pub fn compress(input: &[u8], force: bool) -> Result<(Option<Vec<u8>>, Compression)> {
    info!("Compressing {} bytes (force: {})", input.len(), force);
    let mut writer = BitWriter::new();
    let compression = compress_source(&mut ByteSource::new(input), &mut writer, force)?;

    if !compression.was_compressed() {
        return Ok((None, compression));
    }
    let output = writer.into_bytes();
    info!("Compressed {} bytes into {}", input.len(), output.len());
    Ok((Some(output), compression))
}

pub fn decompress_source<R: BitSource>(source: &mut R) -> Result<Decompression> {
    let symbol_count = read_header(source)?;
    let tree = read_tree(source)?;

    let mut data = Vec::new();
    decode_payload(source, &tree, symbol_count, &mut data)?;
    Ok(Decompression { data, tree })
}

pub fn decompress(input: &[u8]) -> Result<Decompression> {
    info!("Decompressing {} bytes", input.len());
    let mut reader = BitReader::new(input);
    let decompression = decompress_source(&mut reader)?;

    let leftover = reader.remaining();
    if leftover >= 8 {
        warn!("Ignoring {leftover} trailing bits after the payload");
    } else {
        debug!("{leftover} padding bits after the payload");
    }
    info!("Decompressed {} bytes", decompression.data.len());
    Ok(decompression)
}
