/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::engine::{Engine, ScanStats};
use super::model::{TransitionModel, teleport};
use super::ConfigError;
use crate::graph::Graph;
use crate::utils::Matrix;
use rayon::prelude::*;

/// An engine materializing the whole *n* × *n* transition matrix.
///
/// Each step is a dense matrix-vector product, whose rows are computed in
/// parallel. Memory usage is quadratic, so this engine is a correctness
/// baseline for small graphs only.
#[derive(Debug, Clone)]
pub struct DenseEngine {
    matrix: Matrix<f64>,
}

impl DenseEngine {
    /// The largest number of nodes accepted (a 2 GiB matrix).
    pub const MAX_NODES: usize = 1 << 14;

    pub fn new(graph: &Graph) -> Result<Self, ConfigError> {
        let n = graph.num_nodes();
        if n > Self::MAX_NODES {
            return Err(ConfigError::DenseTooLarge {
                num_nodes: n,
                max: Self::MAX_NODES,
            });
        }

        let model = TransitionModel::new(graph);
        let mut matrix = Matrix::new(n, n);
        for source in 0..n {
            let (column, weight) = model.column(source);
            for destination in column {
                matrix[(destination, source)] += weight;
            }
        }
        Ok(Self { matrix })
    }

    /// Returns the transition matrix; the entry (*i*, *j*) is the
    /// probability of moving from *j* to *i*.
    pub fn matrix(&self) -> &Matrix<f64> {
        &self.matrix
    }
}

impl Engine for DenseEngine {
    fn name(&self) -> &'static str {
        "dense"
    }

    fn num_nodes(&self) -> usize {
        self.matrix.cols()
    }

    fn step(&self, alpha: f64, scores: &[f64], next: &mut [f64]) -> ScanStats {
        let n = self.num_nodes();
        let teleport = teleport(alpha, n);
        next.par_iter_mut().enumerate().for_each(|(i, x)| {
            let dot: f64 = self
                .matrix
                .row(i)
                .iter()
                .zip(scores)
                .map(|(p, r)| p * r)
                .sum();
            *x = teleport + alpha * dot;
        });

        ScanStats {
            rows: n as u64,
            arcs: (n * n) as u64,
            scans: 1,
        }
    }
}
