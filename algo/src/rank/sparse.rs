/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::engine::{Engine, ScanStats};
use super::model::{TransitionModel, teleport};
use crate::graph::Graph;

/// An engine reading one adjacency row, and the matching score, at a time.
///
/// The adjacency lists and the committed vector are treated as if they were
/// on slow storage and read sequentially, source by source, once per
/// iteration. The next vector, however, must fit in memory as a whole, as
/// contributions are scattered over all of it.
#[derive(Debug, Clone)]
pub struct SparseEngine {
    model: TransitionModel,
}

impl SparseEngine {
    pub fn new(graph: &Graph) -> Self {
        Self {
            model: TransitionModel::new(graph),
        }
    }
}

impl Engine for SparseEngine {
    fn name(&self) -> &'static str {
        "sparse"
    }

    fn num_nodes(&self) -> usize {
        self.model.num_nodes()
    }

    fn step(&self, alpha: f64, scores: &[f64], next: &mut [f64]) -> ScanStats {
        let n = self.num_nodes();
        next.fill(teleport(alpha, n));

        let mut stats = ScanStats {
            scans: 1,
            ..Default::default()
        };
        for (source, &score) in scores.iter().enumerate() {
            let (column, weight) = self.model.column(source);
            stats.rows += 1;
            stats.arcs += column.len() as u64;
            let share = alpha * score * weight;
            for destination in column {
                next[destination] += share;
            }
        }
        stats
    }
}
