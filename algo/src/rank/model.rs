/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The column-stochastic transition rule shared by all engines.
//!
//! Let *P* be the *n* × *n* matrix in which *pᵢⱼ* is the probability of
//! moving from node *j* to node *i*. A node *j* with out-degree *d* > 0
//! splits its mass evenly among its successors, so *pᵢⱼ* = 1/*d* for every
//! arc *j* → *i*. A dead end (*d* = 0) would leak its mass; here it is
//! treated as if it had an arc towards every node, including itself, so its
//! column is uniform and *pᵢⱼ* = 1/*n* for all *i*.
//!
//! This is the _eager_ policy: the mass of dead ends is spread at every
//! iteration, damped by α like any other mass, and the update rule is
//!
//! > *r*′ᵢ = (1 − α) / *n* + α ∑ⱼ *pᵢⱼ* *rⱼ*.
//!
//! When the score vector is stochastic this coincides with computing the
//! update without dead ends and reinjecting uniformly the leaked mass, but
//! the eager form needs no global sum, so it can be evaluated block by block.
//!
//! All engines obtain columns from a [`TransitionModel`], so the policy
//! cannot diverge between them.

use crate::graph::{Graph, SparseAdjacency};
use itertools::Either;
use std::iter::Copied;
use std::ops::Range;

/// The nonzero entries of a column of the transition matrix, that is, the
/// destinations receiving mass from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column<'a> {
    /// The successors of a node with positive out-degree, in increasing
    /// order.
    Links(&'a [usize]),
    /// A range of destinations receiving uniform mass from a dead end.
    Uniform(Range<usize>),
}

impl<'a> Column<'a> {
    /// Restricts the column to the destinations inside `range`.
    pub fn clip(&self, range: &Range<usize>) -> Column<'a> {
        match self {
            Column::Links(succ) => {
                let succ: &'a [usize] = *succ;
                let start = succ.partition_point(|&v| v < range.start);
                let end = succ.partition_point(|&v| v < range.end).max(start);
                Column::Links(&succ[start..end])
            }
            Column::Uniform(uniform) => {
                let start = uniform.start.max(range.start);
                let end = uniform.end.min(range.end).max(start);
                Column::Uniform(start..end)
            }
        }
    }

    /// Returns the number of destinations.
    pub fn len(&self) -> usize {
        match self {
            Column::Links(succ) => succ.len(),
            Column::Uniform(range) => range.len(),
        }
    }

    /// Returns whether there are no destinations.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> IntoIterator for Column<'a> {
    type Item = usize;
    type IntoIter = Either<Copied<std::slice::Iter<'a, usize>>, Range<usize>>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Column::Links(succ) => Either::Left(succ.iter().copied()),
            Column::Uniform(range) => Either::Right(range),
        }
    }
}

/// Returns 1/`d`.
///
/// # Panics
///
/// Panics if `d` is zero: dead ends must be patched before their
/// out-degree is used as a divisor.
#[inline(always)]
pub fn inverse(d: usize) -> f64 {
    assert!(d != 0, "A zero out-degree reached a division");
    1.0 / d as f64
}

/// Returns the teleport term (1 − α) / *n*.
#[inline(always)]
pub fn teleport(alpha: f64, num_nodes: usize) -> f64 {
    (1.0 - alpha) / num_nodes as f64
}

/// The column-stochastic transition rule of a graph, with the eager
/// dead-end policy described in the [module documentation](self).
#[derive(Debug, Clone)]
pub struct TransitionModel {
    adjacency: SparseAdjacency,
}

impl TransitionModel {
    /// Builds the transition rule of a graph.
    pub fn new(graph: &Graph) -> Self {
        Self::from_adjacency(SparseAdjacency::new(graph))
    }

    /// Builds the transition rule from adjacency lists.
    pub fn from_adjacency(adjacency: SparseAdjacency) -> Self {
        Self { adjacency }
    }

    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.adjacency.num_nodes()
    }

    /// Returns the underlying adjacency lists.
    pub fn adjacency(&self) -> &SparseAdjacency {
        &self.adjacency
    }

    /// Returns the effective out-degree of a node: its number of successors,
    /// or *n* for a dead end.
    pub fn outdegree(&self, source: usize) -> usize {
        match self.adjacency.outdegree(source) {
            0 => self.num_nodes(),
            d => d,
        }
    }

    /// Returns the column of `source` together with the probability of each
    /// of its entries.
    #[inline]
    pub fn column(&self, source: usize) -> (Column<'_>, f64) {
        let succ = self.adjacency.successors(source);
        if succ.is_empty() {
            let n = self.num_nodes();
            (Column::Uniform(0..n), inverse(n))
        } else {
            (Column::Links(succ), inverse(succ.len()))
        }
    }
}
