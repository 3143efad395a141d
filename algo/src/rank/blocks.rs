/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::ops::Range;

/// A partition of [0 . . *n*) into contiguous blocks of fixed size.
///
/// There are ⌈*n* / *b*⌉ blocks; when *b* does not divide *n* the last block
/// is shorter. Block boundaries use saturating arithmetic, so any positive
/// block size is valid, and a block size of at least *n* yields a single
/// block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPartition {
    num_nodes: usize,
    block_size: usize,
}

impl BlockPartition {
    /// Creates a partition of `num_nodes` nodes in blocks of `block_size`
    /// nodes.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    pub fn new(num_nodes: usize, block_size: usize) -> Self {
        assert!(block_size > 0, "The block size must be positive");
        Self {
            num_nodes,
            block_size,
        }
    }

    /// Returns the block size.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the number of blocks.
    pub fn num_blocks(&self) -> usize {
        self.num_nodes.div_ceil(self.block_size)
    }

    /// Returns the range of nodes of a block.
    pub fn range(&self, block: usize) -> Range<usize> {
        let start = block.saturating_mul(self.block_size).min(self.num_nodes);
        let end = start.saturating_add(self.block_size).min(self.num_nodes);
        start..end
    }

    /// Returns the block containing a node.
    pub fn block_of(&self, node: usize) -> usize {
        node / self.block_size
    }

    /// Returns an iterator over the ranges of all blocks, in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Range<usize>> + '_ {
        (0..self.num_blocks()).map(|block| self.range(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remainder() {
        let p = BlockPartition::new(10, 4);
        assert_eq!(p.num_blocks(), 3);
        assert_eq!(p.iter().collect::<Vec<_>>(), vec![0..4, 4..8, 8..10]);
        assert_eq!(p.block_of(7), 1);
        assert_eq!(p.block_of(9), 2);
        assert_eq!(p.range(3), 10..10);
    }

    #[test]
    fn test_exact_and_degenerate() {
        let p = BlockPartition::new(8, 4);
        assert_eq!(p.iter().collect::<Vec<_>>(), vec![0..4, 4..8]);

        for block_size in [8, 9, usize::MAX] {
            let p = BlockPartition::new(8, block_size);
            assert_eq!(p.num_blocks(), 1);
            assert_eq!(p.range(0), 0..8);
            assert_eq!(p.range(1), 8..8);
            assert_eq!(p.block_of(7), 0);
        }

        let p = BlockPartition::new(0, 3);
        assert_eq!(p.num_blocks(), 0);
    }

    #[test]
    fn test_unit_blocks() {
        let p = BlockPartition::new(5, 1);
        assert_eq!(p.num_blocks(), 5);
        for (block, range) in p.iter().enumerate() {
            assert_eq!(range, block..block + 1);
            assert_eq!(p.block_of(block), block);
        }
    }

    #[test]
    #[should_panic]
    fn test_zero_block_size() {
        BlockPartition::new(5, 0);
    }
}
