/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::ConfigError;
use super::blocks::BlockPartition;
use super::engine::{Engine, ScanStats};
use super::model::{TransitionModel, teleport};
use crate::graph::Graph;
use rayon::prelude::*;

/// An engine keeping in memory only a block of the next vector.
///
/// The next vector is split in blocks of fixed size. For each block, the
/// buffer is reset to the teleport term and the whole adjacency structure is
/// scanned once, accumulating the contributions of the arcs whose
/// destination falls in the block. An iteration thus costs ⌈*n* / *b*⌉ full
/// scans.
///
/// Blocks are independent, and are processed in parallel.
#[derive(Debug, Clone)]
pub struct BlockEngine {
    model: TransitionModel,
    partition: BlockPartition,
}

impl BlockEngine {
    pub fn new(graph: &Graph, block_size: usize) -> Result<Self, ConfigError> {
        if block_size == 0 {
            return Err(ConfigError::BlockSize);
        }
        let model = TransitionModel::new(graph);
        let partition = BlockPartition::new(model.num_nodes(), block_size);
        log::debug!(
            "{} blocks of {} nodes",
            partition.num_blocks(),
            partition.block_size()
        );
        Ok(Self { model, partition })
    }

    /// Returns the block partition of the score vector.
    pub fn partition(&self) -> &BlockPartition {
        &self.partition
    }

    /// Computes a block of the next vector, scanning all sources.
    fn fill_block(
        &self,
        alpha: f64,
        teleport: f64,
        scores: &[f64],
        block: usize,
        buffer: &mut [f64],
    ) -> ScanStats {
        let range = self.partition.range(block);
        debug_assert_eq!(range.len(), buffer.len());
        buffer.fill(teleport);

        let mut stats = ScanStats {
            scans: 1,
            ..Default::default()
        };
        for (source, &score) in scores.iter().enumerate() {
            let (column, weight) = self.model.column(source);
            stats.rows += 1;
            let column = column.clip(&range);
            stats.arcs += column.len() as u64;
            let share = alpha * score * weight;
            for destination in column {
                buffer[destination - range.start] += share;
            }
        }
        stats
    }
}

impl Engine for BlockEngine {
    fn name(&self) -> &'static str {
        "block"
    }

    fn num_nodes(&self) -> usize {
        self.model.num_nodes()
    }

    fn step(&self, alpha: f64, scores: &[f64], next: &mut [f64]) -> ScanStats {
        let teleport = teleport(alpha, self.num_nodes());
        next.par_chunks_mut(self.partition.block_size())
            .enumerate()
            .map(|(block, buffer)| self.fill_block(alpha, teleport, scores, block, buffer))
            .reduce(ScanStats::default, |a, b| a + b)
    }
}
