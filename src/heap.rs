//! Fixed-capacity binary min-heap used to order tree nodes by weight.
//!
//! Positions are 1-based: the root sits at position 1 and the children of
//! position `p` are `2p` and `2p + 1`. Equal weights are never reordered
//! on the way up, and on the way down the left child is preferred unless
//! the right child is strictly lighter. Together with the insertion order
//! this pins the exact shape of every tree built on top of the heap.

use log::trace;

use crate::error::{HuffError, Result};

/// Largest number of distinct symbols, and the default heap capacity.
pub const ALPHABET_SIZE: usize = 256;

/// Anything that can be ordered by the heap.
pub trait Weighted {
    fn weight(&self) -> u64;
}

#[derive(Debug)]
pub struct MinHeap<T> {
    slots: Vec<T>,
    capacity: usize,
}

impl<T: Weighted> MinHeap<T> {
    pub fn new() -> Self {
        Self::with_capacity(ALPHABET_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MinHeap {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn insert(&mut self, elem: T) -> Result<()> {
        if self.size() == self.capacity {
            return Err(HuffError::QueueOverflow {
                capacity: self.capacity,
            });
        }
        self.slots.push(elem);

        let mut current = self.size();
        while current > 1 && self.weight_at(current) < self.weight_at(parent(current)) {
            self.swap(current, parent(current));
            current = parent(current);
        }
        trace!("heap insert settled at position {current} (size {})", self.size());
        Ok(())
    }

    pub fn remove_min(&mut self) -> Result<T> {
        let size = self.size();
        if size == 0 {
            return Err(HuffError::QueueUnderflow);
        }
        self.swap(1, size);
        let min = self.slots.pop().ok_or(HuffError::QueueUnderflow)?;
        if !self.is_empty() {
            self.push_down(1);
        }
        Ok(min)
    }

    pub fn peek_root(&self) -> Result<&T> {
        self.slots.first().ok_or(HuffError::QueueUnderflow)
    }

    fn push_down(&mut self, mut position: usize) {
        let size = self.size();
        while position <= size / 2 {
            let mut smallest = left(position);
            if smallest < size && self.weight_at(smallest) > self.weight_at(smallest + 1) {
                smallest += 1;
            }
            if self.weight_at(position) <= self.weight_at(smallest) {
                return;
            }
            self.swap(position, smallest);
            position = smallest;
        }
    }

    fn weight_at(&self, position: usize) -> u64 {
        self.slots[position - 1].weight()
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a - 1, b - 1);
    }
}

impl<T: Weighted> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn parent(position: usize) -> usize {
    position / 2
}

fn left(position: usize) -> usize {
    2 * position
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item {
        weight: u64,
        tag: char,
    }

    impl Weighted for Item {
        fn weight(&self) -> u64 {
            self.weight
        }
    }

    fn item(weight: u64, tag: char) -> Item {
        Item { weight, tag }
    }

    #[test]
    fn removes_in_ascending_weight_order() {
        let mut heap = MinHeap::new();
        for (w, t) in [(5, 'a'), (1, 'b'), (9, 'c'), (3, 'd'), (7, 'e'), (2, 'f')] {
            heap.insert(item(w, t)).unwrap();
        }
        let mut weights = Vec::new();
        while !heap.is_empty() {
            weights.push(heap.remove_min().unwrap().weight);
        }
        assert_eq!(weights, vec![1, 2, 3, 5, 7, 9]);
    }

    #[test]
    fn peek_root_does_not_remove() {
        let mut heap = MinHeap::new();
        heap.insert(item(4, 'a')).unwrap();
        heap.insert(item(2, 'b')).unwrap();
        assert_eq!(heap.peek_root().unwrap().tag, 'b');
        assert_eq!(heap.size(), 2);
    }

    #[test]
    fn empty_heap_reports_underflow() {
        let mut heap: MinHeap<Item> = MinHeap::new();
        assert!(matches!(heap.remove_min(), Err(HuffError::QueueUnderflow)));
        assert!(matches!(heap.peek_root(), Err(HuffError::QueueUnderflow)));
    }

    #[test]
    fn insert_past_capacity_overflows() {
        let mut heap = MinHeap::with_capacity(2);
        heap.insert(item(1, 'a')).unwrap();
        heap.insert(item(2, 'b')).unwrap();
        let err = heap.insert(item(3, 'c')).unwrap_err();
        assert!(matches!(err, HuffError::QueueOverflow { capacity: 2 }));
        assert_eq!(heap.size(), 2);
    }

    #[test]
    fn default_capacity_holds_full_alphabet() {
        let mut heap: MinHeap<Item> = MinHeap::new();
        assert_eq!(heap.capacity(), ALPHABET_SIZE);
        for i in 0..ALPHABET_SIZE {
            heap.insert(item(i as u64, 'x')).unwrap();
        }
        assert!(heap.insert(item(0, 'y')).is_err());
    }

    #[test]
    fn equal_weights_follow_heap_positions() {
        // [a, b, c] all weight 1: removing `a` moves `c` to the root, and
        // with `b` tied the left-biased sift-down leaves `c` there.
        let mut heap = MinHeap::new();
        heap.insert(item(1, 'a')).unwrap();
        heap.insert(item(1, 'b')).unwrap();
        heap.insert(item(1, 'c')).unwrap();
        let order: Vec<char> = (0..3).map(|_| heap.remove_min().unwrap().tag).collect();
        assert_eq!(order, vec!['a', 'c', 'b']);
    }

    #[test]
    fn sift_down_prefers_left_child_on_ties() {
        // Root 9 with two children of weight 4: the left one is promoted.
        let mut heap = MinHeap::new();
        heap.insert(item(1, 'r')).unwrap();
        heap.insert(item(4, 'l')).unwrap();
        heap.insert(item(4, 'm')).unwrap();
        heap.insert(item(9, 'z')).unwrap();
        assert_eq!(heap.remove_min().unwrap().tag, 'r');
        assert_eq!(heap.peek_root().unwrap().tag, 'l');
    }
}
