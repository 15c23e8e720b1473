use std::fmt;

use bitvec::prelude::*;
use log::{debug, trace};

use crate::error::{HuffError, Result};
use crate::frequency::FrequencyTable;
use crate::heap::{ALPHABET_SIZE, MinHeap, Weighted};

/// A code as a sequence of branch bits, `0` for left and `1` for right.
pub type Code = BitVec<u8, Msb0>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Node {
    Leaf {
        byte: u8,
        freq: u64,
    },
    Internal {
        freq: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn freq(&self) -> u64 {
        match self {
            Node::Leaf { freq, .. } => *freq,
            Node::Internal { freq, .. } => *freq,
        }
    }

    fn merge(left: Node, right: Node) -> Node {
        Node::Internal {
            freq: left.freq() + right.freq(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl Weighted for Node {
    fn weight(&self) -> u64 {
        self.freq()
    }
}

/// A rooted Huffman tree together with its node counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
    leaf_count: usize,
    internal_count: usize,
}

impl HuffmanTree {
    /// Wraps `root`, counting its nodes.
    pub fn new(root: Node) -> Self {
        let (leaf_count, internal_count) = count_nodes(&root);
        HuffmanTree {
            root,
            leaf_count,
            internal_count,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn internal_count(&self) -> usize {
        self.internal_count
    }

    pub fn node_count(&self) -> usize {
        self.leaf_count + self.internal_count
    }

    /// Depth of the first leaf holding `symbol`, the root being depth 0.
    pub fn depth_of(&self, symbol: u8) -> Option<usize> {
        fn walk(node: &Node, symbol: u8, depth: usize) -> Option<usize> {
            match node {
                Node::Leaf { byte, .. } => (*byte == symbol).then_some(depth),
                Node::Internal { left, right, .. } => {
                    walk(left, symbol, depth + 1).or_else(|| walk(right, symbol, depth + 1))
                }
            }
        }
        walk(&self.root, symbol, 0)
    }
}

fn count_nodes(node: &Node) -> (usize, usize) {
    match node {
        Node::Leaf { .. } => (1, 0),
        Node::Internal { left, right, .. } => {
            let (ll, li) = count_nodes(left);
            let (rl, ri) = count_nodes(right);
            (ll + rl, li + ri + 1)
        }
    }
}

impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn outline(node: &Node, indent: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for _ in 0..indent {
                write!(f, "\t")?;
            }
            match node {
                Node::Leaf { byte, .. } => writeln!(f, "[ASCII: {byte}]"),
                Node::Internal { left, right, .. } => {
                    writeln!(f, "[Internal Node]")?;
                    outline(left, indent + 1, f)?;
                    outline(right, indent + 1, f)
                }
            }
        }
        outline(&self.root, 1, f)
    }
}

/// Builds the tree by repeatedly merging the two lightest nodes.
///
/// Leaves enter the queue in ascending symbol order. Of each pair removed,
/// the first becomes the left child and the second the right child.
pub fn build_huffman_tree(frequencies: &FrequencyTable) -> Result<HuffmanTree> {
    if frequencies.is_empty() {
        return Err(HuffError::EmptyInput);
    }
    debug!(
        "Building Huffman Tree from {} unique symbols",
        frequencies.distinct()
    );

    let mut heap = MinHeap::with_capacity(ALPHABET_SIZE);
    for (byte, freq) in frequencies.iter() {
        heap.insert(Node::Leaf { byte, freq })?;
    }
    let leaf_count = heap.size();
    let mut internal_count = 0;

    while heap.size() > 1 {
        let left = heap.remove_min()?;
        let right = heap.remove_min()?;
        trace!("Merging nodes of weight {} and {}", left.freq(), right.freq());
        heap.insert(Node::merge(left, right))?;
        internal_count += 1;
    }

    let root = heap.remove_min()?;
    debug!(
        "Tree construction complete: {} leaves, {} internal nodes",
        leaf_count, internal_count
    );
    Ok(HuffmanTree {
        root,
        leaf_count,
        internal_count,
    })
}

/// Per-symbol codes derived from a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<Code>>,
}

impl CodeTable {
    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes[symbol as usize].as_ref()
    }

    pub fn len(&self) -> usize {
        self.codes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_ref().map(|c| (symbol as u8, c)))
    }
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, code) in self.iter() {
            write!(f, "ASCII {symbol}: ")?;
            for bit in code.iter().by_vals() {
                write!(f, "{}", if bit { '1' } else { '0' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Assigns each leaf the path leading to it. A tree that is a single leaf
/// gets the one-bit code `0`, so every occurrence still costs a bit.
pub fn build_code_table(tree: &HuffmanTree) -> CodeTable {
    let mut table = CodeTable {
        codes: vec![None; ALPHABET_SIZE],
    };
    match tree.root() {
        Node::Leaf { byte, .. } => {
            trace!("Single-symbol tree, assigning code '0' to byte {byte:#04x}");
            table.codes[*byte as usize] = Some(bitvec![u8, Msb0; 0]);
        }
        root => assign_codes(root, Code::new(), &mut table),
    }
    table
}

fn assign_codes(node: &Node, prefix: Code, table: &mut CodeTable) {
    match node {
        Node::Leaf { byte, .. } => {
            trace!(
                "Assigning code to byte {:#04x} ('{}') : {:?}",
                byte,
                (*byte as char).escape_default(),
                prefix
            );
            table.codes[*byte as usize] = Some(prefix);
        }
        Node::Internal { left, right, .. } => {
            let mut left_prefix = prefix.clone();
            left_prefix.push(false);
            assign_codes(left, left_prefix, table);

            let mut right_prefix = prefix;
            right_prefix.push(true);
            assign_codes(right, right_prefix, table);
        }
    }
}
