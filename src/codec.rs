//! The compressed stream format.
//!
//! ```text
//! [16 bits]  magic "HF"
//! [32 bits]  payload symbol count, big-endian
//! [variable] tree, preorder: `1` per internal node, `0` + 8 symbol bits per leaf
//! [variable] payload: one code per input symbol
//! [0-7 bits] zero padding
//! ```

use log::{debug, trace};

use crate::bits::{BitSink, BitSource, SymbolSource};
use crate::error::{HuffError, Result};
use crate::heap::ALPHABET_SIZE;
use crate::huffman::{CodeTable, HuffmanTree, Node};

pub const MAGIC: [u8; 2] = *b"HF";

/// Magic marker plus the symbol count.
pub const HEADER_BITS: u64 = 48;

/// Flag bit plus symbol byte.
pub const LEAF_BITS: u64 = 9;

pub const INTERNAL_BITS: u64 = 1;

pub fn write_header<W: BitSink>(sink: &mut W, symbol_count: u32) {
    for byte in MAGIC {
        sink.write_byte(byte);
    }
    for byte in symbol_count.to_be_bytes() {
        sink.write_byte(byte);
    }
}

/// Checks the magic marker and returns the payload symbol count.
pub fn read_header<R: BitSource>(source: &mut R) -> Result<u32> {
    let mut magic = [0u8; 2];
    for byte in magic.iter_mut() {
        *byte = source
            .read_byte()
            .map_err(|_| HuffError::malformed("missing magic marker"))?;
    }
    if magic != MAGIC {
        return Err(HuffError::malformed(format!(
            "bad magic marker {:02x?}, expected {:02x?}",
            magic, MAGIC
        )));
    }

    let mut count = [0u8; 4];
    for byte in count.iter_mut() {
        *byte = source
            .read_byte()
            .map_err(|_| HuffError::malformed("truncated header"))?;
    }
    let symbol_count = u32::from_be_bytes(count);
    debug!("Stream header: {symbol_count} symbols");
    if symbol_count == 0 {
        return Err(HuffError::malformed("header records zero symbols"));
    }
    Ok(symbol_count)
}

pub fn write_tree<W: BitSink>(sink: &mut W, node: &Node) {
    match node {
        Node::Leaf { byte, .. } => {
            sink.write_bit(false);
            sink.write_byte(*byte);
        }
        Node::Internal { left, right, .. } => {
            sink.write_bit(true);
            write_tree(sink, left);
            write_tree(sink, right);
        }
    }
}

/// Reads a preorder-serialized tree. Frequencies are not stored, so every
/// node comes back with a frequency of zero.
pub fn read_tree<R: BitSource>(source: &mut R) -> Result<HuffmanTree> {
    let mut leaves = 0usize;
    let root = read_node(source, 0, &mut leaves)?;
    let tree = HuffmanTree::new(root);
    debug!(
        "Read tree with {} leaves and {} internal nodes",
        tree.leaf_count(),
        tree.internal_count()
    );
    Ok(tree)
}

/// No tree built from at most 256 symbols puts a leaf deeper than this.
const MAX_DEPTH: usize = ALPHABET_SIZE - 1;

fn read_node<R: BitSource>(source: &mut R, depth: usize, leaves: &mut usize) -> Result<Node> {
    let truncated = |_| HuffError::malformed("truncated tree");

    if depth > MAX_DEPTH {
        return Err(HuffError::malformed(format!(
            "tree deeper than {MAX_DEPTH} levels"
        )));
    }

    if !source.read_bit().map_err(truncated)? {
        *leaves += 1;
        if *leaves > ALPHABET_SIZE {
            return Err(HuffError::malformed(format!(
                "tree holds more than {ALPHABET_SIZE} leaves"
            )));
        }
        let byte = source.read_byte().map_err(truncated)?;
        return Ok(Node::Leaf { byte, freq: 0 });
    }

    let left = read_node(source, depth + 1, leaves)?;
    let right = read_node(source, depth + 1, leaves)?;
    Ok(Node::Internal {
        freq: 0,
        left: Box::new(left),
        right: Box::new(right),
    })
}

/// Writes the code of every remaining symbol of `source`, in order, and
/// returns how many symbols were encoded.
pub fn encode_payload<S, W>(source: &mut S, codes: &CodeTable, sink: &mut W) -> Result<u64>
where
    S: SymbolSource,
    W: BitSink,
{
    let mut encoded = 0u64;
    while source.has_more() {
        let Some(symbol) = source.read_symbol() else {
            break;
        };
        let code = codes.get(symbol).ok_or(HuffError::UnknownSymbol(symbol))?;
        for bit in code.iter().by_vals() {
            sink.write_bit(bit);
        }
        encoded += 1;
    }
    trace!("Encoded {encoded} payload symbols");
    Ok(encoded)
}

/// Decodes exactly `symbol_count` symbols by walking `tree` from the root
/// once per symbol. A tree that is a single leaf consumes one `0` bit per
/// symbol.
///
/// `symbol_count` comes from an untrusted header, so `out` only grows as
/// bits are actually consumed.
pub fn decode_payload<R: BitSource>(
    source: &mut R,
    tree: &HuffmanTree,
    symbol_count: u32,
    out: &mut Vec<u8>,
) -> Result<()> {
    let truncated = |_| HuffError::malformed("truncated payload");

    for _ in 0..symbol_count {
        let mut branch = tree.root();
        if let Node::Leaf { byte, .. } = branch {
            if source.read_bit().map_err(truncated)? {
                return Err(HuffError::malformed("invalid code bit for single-symbol tree"));
            }
            out.push(*byte);
            continue;
        }
        loop {
            match branch {
                Node::Leaf { byte, .. } => {
                    out.push(*byte);
                    break;
                }
                Node::Internal { left, right, .. } => {
                    branch = if source.read_bit().map_err(truncated)? {
                        &**right
                    } else {
                        &**left
                    };
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{BitReader, BitWriter, ByteSource};
    use crate::frequency::FrequencyTable;
    use crate::huffman::{build_code_table, build_huffman_tree};

    fn leaf(byte: u8) -> Node {
        Node::Leaf { byte, freq: 0 }
    }

    fn internal(left: Node, right: Node) -> Node {
        Node::Internal {
            freq: 0,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn header_layout() {
        let mut writer = BitWriter::new();
        write_header(&mut writer, 0x0102_0304);
        assert_eq!(writer.into_bytes(), vec![b'H', b'F', 1, 2, 3, 4]);
    }

    #[test]
    fn header_rejects_wrong_magic() {
        let bytes = [b'H', b'G', 0, 0, 0, 1];
        let err = read_header(&mut BitReader::new(&bytes)).unwrap_err();
        assert!(matches!(err, HuffError::MalformedStream(_)));
    }

    #[test]
    fn header_rejects_short_input() {
        let cases: [&[u8]; 4] = [b"", b"H", b"HF", b"HF\0\0\0"];
        for bytes in cases {
            let err = read_header(&mut BitReader::new(bytes)).unwrap_err();
            assert!(matches!(err, HuffError::MalformedStream(_)));
        }
    }

    #[test]
    fn header_rejects_zero_count() {
        let bytes = [b'H', b'F', 0, 0, 0, 0];
        assert!(read_header(&mut BitReader::new(&bytes)).is_err());
    }

    #[test]
    fn tree_bits_are_preorder() {
        // 1 | 0 01100001 | 0 01100010
        let tree = internal(leaf(b'a'), leaf(b'b'));
        let mut writer = BitWriter::new();
        write_tree(&mut writer, &tree);
        assert_eq!(writer.bit_len(), 19);

        let bytes = writer.into_bytes();
        assert_eq!(bytes, vec![0b1001_1000, 0b0100_1100, 0b0100_0000]);
    }

    #[test]
    fn tree_survives_serialization() {
        let original = internal(leaf(1), internal(internal(leaf(2), leaf(3)), leaf(255)));
        let mut writer = BitWriter::new();
        write_tree(&mut writer, &original);
        let bytes = writer.into_bytes();

        let tree = read_tree(&mut BitReader::new(&bytes)).unwrap();
        assert_eq!(tree.root(), &original);
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.internal_count(), 3);
    }

    #[test]
    fn truncated_tree_is_rejected() {
        // An internal node followed by a single leaf, then nothing.
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bit(false);
        writer.write_byte(b'x');
        let bytes = writer.into_bytes();
        let err = read_tree(&mut BitReader::new(&bytes)).unwrap_err();
        assert!(matches!(err, HuffError::MalformedStream(_)));
    }

    #[test]
    fn endless_internal_nodes_are_rejected() {
        let bytes = vec![0xFF; 4096];
        let err = read_tree(&mut BitReader::new(&bytes)).unwrap_err();
        assert!(err.to_string().contains("deeper"));
    }

    #[test]
    fn too_many_leaves_are_rejected() {
        fn full_tree(writer: &mut BitWriter, depth: u32) {
            if depth == 0 {
                writer.write_bit(false);
                writer.write_byte(0);
            } else {
                writer.write_bit(true);
                full_tree(writer, depth - 1);
                full_tree(writer, depth - 1);
            }
        }
        // 512 leaves, nine levels deep.
        let mut writer = BitWriter::new();
        full_tree(&mut writer, 9);
        let bytes = writer.into_bytes();
        let err = read_tree(&mut BitReader::new(&bytes)).unwrap_err();
        assert!(err.to_string().contains("leaves"));
    }

    #[test]
    fn payload_encodes_and_decodes() {
        let input = b"aaaabbbcc";
        let tree = build_huffman_tree(&FrequencyTable::from_bytes(input)).unwrap();
        let codes = build_code_table(&tree);

        let mut writer = BitWriter::new();
        let count = encode_payload(&mut ByteSource::new(input), &codes, &mut writer).unwrap();
        assert_eq!(count, 9);
        // a=0 c=10 b=11
        assert_eq!(writer.bit_len(), 4 + 3 * 2 + 2 * 2);

        let bytes = writer.into_bytes();
        let mut out = Vec::new();
        decode_payload(&mut BitReader::new(&bytes), &tree, 9, &mut out).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn payload_rejects_symbol_without_code() {
        let tree = build_huffman_tree(&FrequencyTable::from_bytes(b"ab")).unwrap();
        let codes = build_code_table(&tree);
        let err = encode_payload(&mut ByteSource::new(b"abc"), &codes, &mut BitWriter::new())
            .unwrap_err();
        assert!(matches!(err, HuffError::UnknownSymbol(b'c')));
    }

    #[test]
    fn single_leaf_payload_uses_zero_bits() {
        let tree = HuffmanTree::new(leaf(b'q'));
        let mut out = Vec::new();
        decode_payload(&mut BitReader::new(&[0x00]), &tree, 5, &mut out).unwrap();
        assert_eq!(out, b"qqqqq");

        let mut out = Vec::new();
        let err = decode_payload(&mut BitReader::new(&[0x80]), &tree, 1, &mut out).unwrap_err();
        assert!(matches!(err, HuffError::MalformedStream(_)));
    }

    #[test]
    fn oversized_symbol_count_fails_on_missing_bits() {
        let tree = HuffmanTree::new(leaf(b'a'));
        let mut out = Vec::new();
        let err = decode_payload(&mut BitReader::new(&[0x00]), &tree, u32::MAX, &mut out)
            .unwrap_err();
        assert!(matches!(err, HuffError::MalformedStream(_)));
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let tree = HuffmanTree::new(internal(leaf(b'a'), leaf(b'b')));
        let mut out = Vec::new();
        let err = decode_payload(&mut BitReader::new(&[0xFF]), &tree, 9, &mut out).unwrap_err();
        assert!(matches!(err, HuffError::MalformedStream(_)));
    }
}
