//! Symbol and bit I/O used by the codec.
//!
//! The traits mirror the three collaborators the codec needs: something to
//! read input symbols from (twice, hence `rewind`), something to write bits
//! to, and something to read bits back from. The in-memory implementations
//! pack bits most-significant first.

use bitvec::prelude::*;

use crate::error::{HuffError, Result};

/// A rewindable stream of input symbols.
pub trait SymbolSource {
    fn has_more(&self) -> bool;
    fn read_symbol(&mut self) -> Option<u8>;
    fn rewind(&mut self);
}

pub trait BitSink {
    fn write_bit(&mut self, bit: bool);

    fn write_byte(&mut self, byte: u8) {
        for shift in (0..8).rev() {
            self.write_bit((byte >> shift) & 1 == 1);
        }
    }
}

pub trait BitSource {
    fn has_more(&self) -> bool;
    fn read_bit(&mut self) -> Result<bool>;

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | self.read_bit()? as u8;
        }
        Ok(byte)
    }
}

#[derive(Debug)]
pub struct ByteSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteSource { data, pos: 0 }
    }
}

impl SymbolSource for ByteSource<'_> {
    fn has_more(&self) -> bool {
        self.pos < self.data.len()
    }

    fn read_symbol(&mut self) -> Option<u8> {
        let symbol = self.data.get(self.pos).copied()?;
        self.pos += 1;
        Some(symbol)
    }

    fn rewind(&mut self) {
        self.pos = 0;
    }
}

/// Growable bit buffer. The final byte is zero-padded.
#[derive(Debug, Default)]
pub struct BitWriter {
    bits: BitVec<u8, Msb0>,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        let mut bits = self.bits;
        bits.set_uninitialized(false);
        bits.into_vec()
    }
}

impl BitSink for BitWriter {
    fn write_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    fn write_byte(&mut self, byte: u8) {
        self.bits.extend_from_bitslice(byte.view_bits::<Msb0>());
    }
}

#[derive(Debug)]
pub struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        BitReader {
            bits: bytes.view_bits::<Msb0>(),
            pos: 0,
        }
    }

    /// Number of bits consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }
}

impl BitSource for BitReader<'_> {
    fn has_more(&self) -> bool {
        self.pos < self.bits.len()
    }

    fn read_bit(&mut self) -> Result<bool> {
        let bit = self
            .bits
            .get(self.pos)
            .map(|bit| *bit)
            .ok_or_else(|| HuffError::malformed("unexpected end of bit stream"))?;
        self.pos += 1;
        Ok(bit)
    }
}
