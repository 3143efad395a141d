/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::Graph;
use crate::utils::CsrRows;

/// Adjacency lists with out-degrees, one row per source node.
///
/// Successors are sorted in increasing order. Rows of dead ends (nodes
/// without successors) are empty. This is the structure the sparse and block
/// engines scan at each iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseAdjacency {
    rows: CsrRows<usize>,
}

impl SparseAdjacency {
    /// Builds the adjacency lists of a graph.
    pub fn new(graph: &Graph) -> Self {
        let n = graph.num_nodes();
        let mut rows = CsrRows::with_capacity(n, graph.num_arcs());
        let mut arcs = graph.arcs().iter().peekable();
        for node in 0..n {
            let mut succ = Vec::new();
            while let Some(&(_, destination)) = arcs.next_if(|&&(source, _)| source == node) {
                succ.push(destination);
            }
            rows.push(succ);
        }
        Self { rows }
    }

    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.rows.num_rows()
    }

    /// Returns the number of arcs.
    pub fn num_arcs(&self) -> usize {
        self.rows.num_values()
    }

    /// Returns the successors of a node, in increasing order.
    pub fn successors(&self, node: usize) -> &[usize] {
        &self.rows[node]
    }

    /// Returns the out-degree of a node.
    pub fn outdegree(&self, node: usize) -> usize {
        self.rows.row_len(node)
    }

    /// Returns whether a node has no successors.
    pub fn is_dead_end(&self, node: usize) -> bool {
        self.outdegree(node) == 0
    }

    /// Returns the number of dead ends.
    pub fn num_dead_ends(&self) -> usize {
        (0..self.num_nodes()).filter(|&v| self.is_dead_end(v)).count()
    }

    /// Returns an iterator over pairs (node, successors).
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, &[usize])> + '_ {
        self.rows.iter().enumerate()
    }

    /// Returns the adjacency lists of the transpose, that is, the
    /// predecessors of each node, in increasing order.
    pub fn transpose(&self) -> Self {
        let n = self.num_nodes();
        let mut pred = vec![Vec::new(); n];
        for (source, succ) in self.iter() {
            for &destination in succ {
                pred[destination].push(source);
            }
        }
        let mut rows = CsrRows::with_capacity(n, self.num_arcs());
        for p in pred {
            rows.push(p);
        }
        Self { rows }
    }
}
