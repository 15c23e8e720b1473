//! Huffman compression of byte streams into a self-describing bit format.
//!
//! ```
//! let (packed, report) = huffpack::compress(b"abracadabra", true)?;
//! assert!(report.was_compressed());
//! let unpacked = huffpack::decompress(&packed.unwrap())?;
//! assert_eq!(unpacked.data, b"abracadabra");
//! # Ok::<(), huffpack::HuffError>(())
//! ```

pub mod bits;
pub mod codec;
pub mod compressor;
pub mod error;
pub mod frequency;
pub mod heap;
pub mod huffman;

pub use compressor::{
    Compression, Decompression, SizeStats, compress, compress_source, decompress,
    decompress_source, estimate_compressed_size, should_compress,
};
pub use error::{HuffError, Result};
pub use frequency::FrequencyTable;
pub use huffman::{CodeTable, HuffmanTree, Node, build_code_table, build_huffman_tree};
