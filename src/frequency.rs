use std::fmt;

use log::debug;

use crate::bits::{ByteSource, SymbolSource};
use crate::heap::ALPHABET_SIZE;

/// Occurrence count of every byte value in one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
}

impl FrequencyTable {
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_source(&mut ByteSource::new(data))
    }

    /// Counts every remaining symbol of `source`, then rewinds it so the
    /// same symbols can be encoded afterwards.
    pub fn from_source<S: SymbolSource>(source: &mut S) -> Self {
        let mut counts = [0u64; ALPHABET_SIZE];
        while let Some(symbol) = source.read_symbol() {
            counts[symbol as usize] += 1;
        }
        source.rewind();

        let table = FrequencyTable { counts };
        debug!(
            "Counted {} symbols, {} distinct",
            table.total(),
            table.distinct()
        );
        table
    }

    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.distinct() == 0
    }

    /// Symbols with a nonzero count, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(symbol, c)| (symbol as u8, *c))
    }

    /// Shannon entropy in bits per symbol.
    pub fn entropy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let total_f = total as f64;

        let entropy: f64 = self
            .iter()
            .map(|(_, count)| {
                let p = count as f64 / total_f;
                -p * p.log2()
            })
            .sum();

        debug!(
            "Calculated entropy: {:.4} bits/symbol (Total samples: {})",
            entropy, total
        );
        entropy
    }
}

impl fmt::Display for FrequencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, count) in self.iter() {
            writeln!(f, "ASCII {symbol}: {count}")?;
        }
        Ok(())
    }
}
