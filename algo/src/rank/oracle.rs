/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! An independent PageRank computation used to validate the engines.
//!
//! [`ReferenceRank`] solves the same problem with a different method: a
//! sequential Gauss–Seidel iteration on the predecessors of each node. It
//! shares no code with the engines besides the adjacency lists, so agreement
//! between the two is meaningful.
//!
//! # The Gauss–Seidel method
//!
//! With *P* the row-normalized adjacency matrix (with zero rows for dead
//! ends), **d** the characteristic vector of dead ends and α the damping
//! factor, the PageRank vector satisfies
//!
//! > **x** ( *I* − α (*P* + **d**ᵀ **1**/*n*) )  =  (1 − α) **1**/*n*,
//!
//! which the Gauss–Seidel method solves updating a single vector in place:
//!
//! 1. initialize **x** to **1**/*n*;
//! 2. while the stopping criterion is not met, for each
//!    *i* = 0, 1, …, *n* − 1:
//!    - σ = 0;
//!    - for each *j* → *i* with *j* ≠ *i*:  σ += *xⱼ* / *d*(*j*);
//!    - σ += (*D* − *dᵢ* · *xᵢ*) / *n*, where *D* is the rank of dead ends;
//!    - *xᵢ* = ( (1 − α) / *n* + α σ ) / (1 − α *pᵢᵢ* − α *dᵢ* / *n*).
//!
//! The rank of dead ends is computed at the end of each iteration and used
//! unchanged throughout the next one, which corresponds to moving dead ends
//! after all other nodes.
//!
//! The norm delta passed to stopping predicates is an upper bound on the 𝓁₁
//! error with respect to the true PageRank vector, α / (1 − α) ·
//! ‖**x**⁽ᵗ⁾ − **x**⁽ᵗ⁻¹⁾‖₁.

use super::export::sort_scores;
use super::monitor::preds::PredParams;
use crate::graph::{Graph, SparseAdjacency};
use dsi_progress_logger::{ProgressLog, no_logging};
use kahan::KahanSum;
use predicates::Predicate;

/// Computes PageRank using a sequential Gauss–Seidel iteration.
///
/// The struct is configured via setters and then executed via
/// [`run`](Self::run). After completion the rank vector is available via the
/// [`rank`](Self::rank) method.
///
/// # Examples
///
/// ```
/// use striperank::graph::Graph;
/// use striperank::rank::{ReferenceRank, preds};
///
/// let graph = Graph::from_arcs([(1, 2), (1, 3), (2, 3), (3, 1), (4, 1), (5, 4)])?;
/// let mut reference = ReferenceRank::new(&graph);
/// reference.alpha(0.85);
/// reference.run(preds::L1Norm::try_from(1E-9)?);
///
/// assert_eq!(reference.rank().len(), 5);
/// assert!((reference.rank().iter().sum::<f64>() - 1.0).abs() < 1E-9);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct ReferenceRank {
    transpose: SparseAdjacency,
    inv_outdegrees: Box<[f64]>,
    alpha: f64,
    norm_delta: f64,
    rank: Box<[f64]>,
    iteration: usize,
}

impl ReferenceRank {
    pub fn new(graph: &Graph) -> Self {
        let adjacency = SparseAdjacency::new(graph);
        let inv_outdegrees = (0..adjacency.num_nodes())
            .map(|v| match adjacency.outdegree(v) {
                0 => 0.0,
                d => 1.0 / d as f64,
            })
            .collect();
        Self {
            transpose: adjacency.transpose(),
            inv_outdegrees,
            alpha: 0.85,
            norm_delta: f64::INFINITY,
            rank: vec![0.0; graph.num_nodes()].into_boxed_slice(),
            iteration: 0,
        }
    }

    /// Sets the damping factor α.
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is not in the interval [0 . . 1).
    pub fn alpha(&mut self, alpha: f64) -> &mut Self {
        assert!(
            // Note that 0.0..1.0 is [0.0..1.0) in mathematical notation
            (0.0..1.0).contains(&alpha),
            "The damping factor must be in [0 . . 1), got {alpha}"
        );
        self.alpha = alpha;
        self
    }

    /// Returns the rank vector.
    pub fn rank(&self) -> &[f64] {
        &self.rank
    }

    /// Returns the number of iterations performed by the last call to
    /// [`run`](Self::run).
    pub fn iterations(&self) -> usize {
        self.iteration
    }

    /// Returns the norm delta after the last iteration.
    pub fn norm_delta(&self) -> f64 {
        self.norm_delta
    }

    /// Runs the computation until the given predicate is satisfied.
    pub fn run(&mut self, predicate: impl Predicate<PredParams>) {
        self.run_with_logging(predicate, no_logging![]);
    }

    /// Runs the computation until the given predicate is satisfied, logging
    /// iterations on `pl`.
    pub fn run_with_logging(
        &mut self,
        predicate: impl Predicate<PredParams>,
        pl: &mut impl ProgressLog,
    ) {
        let n = self.transpose.num_nodes();
        if n == 0 {
            return;
        }

        log::info!("Reference alpha: {}", self.alpha);
        log::info!("Reference stopping criterion: {}", predicate);

        self.iteration = 0;
        let inv_n = 1.0 / n as f64;
        self.rank.fill(inv_n);

        let mut dangling_rank: KahanSum<f64> = KahanSum::new();
        for (i, &inv_d) in self.inv_outdegrees.iter().enumerate() {
            if inv_d == 0.0 {
                dangling_rank += self.rank[i];
            }
        }
        let mut dangling_rank = dangling_rank.sum();

        pl.item_name("iteration");
        pl.expected_updates(None);
        pl.start(format!(
            "Computing reference PageRank (alpha={})...",
            self.alpha
        ));

        loop {
            let mut norm_delta: KahanSum<f64> = KahanSum::new();
            let mut next_dangling_rank: KahanSum<f64> = KahanSum::new();

            for i in 0..n {
                let mut sigma: KahanSum<f64> = KahanSum::new();
                let mut has_loop = false;
                for &j in self.transpose.successors(i) {
                    if j == i {
                        has_loop = true;
                    } else {
                        sigma += self.rank[j] * self.inv_outdegrees[j];
                    }
                }

                let dangling = self.inv_outdegrees[i] == 0.0;
                let (self_dangling_rank, self_loop_factor) = if dangling {
                    (self.rank[i], 1.0 - self.alpha * inv_n)
                } else if has_loop {
                    (0.0, 1.0 - self.alpha * self.inv_outdegrees[i])
                } else {
                    (0.0, 1.0)
                };
                sigma += (dangling_rank - self_dangling_rank) * inv_n;

                let new_rank =
                    ((1.0 - self.alpha) * inv_n + self.alpha * sigma.sum()) / self_loop_factor;
                if dangling {
                    next_dangling_rank += new_rank;
                }
                norm_delta += (new_rank - self.rank[i]).abs();
                self.rank[i] = new_rank;
            }

            dangling_rank = next_dangling_rank.sum();
            // Bound on 𝓁₁ error
            self.norm_delta = norm_delta.sum() * self.alpha / (1.0 - self.alpha);
            self.iteration += 1;

            log::debug!(
                "Reference iteration {}: norm delta = {}",
                self.iteration,
                self.norm_delta
            );
            pl.update_and_display();

            if predicate.eval(&PredParams {
                iteration: self.iteration,
                norm_delta: self.norm_delta,
            }) {
                break;
            }
        }

        pl.done();
    }
}

/// A comparison between a score vector and a reference one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// The number of top positions compared.
    pub top: usize,
    /// The maximum absolute difference over all nodes.
    pub max_abs_diff: f64,
    /// The 𝓁₁ distance between the two vectors.
    pub l1_distance: f64,
    /// The number of positions among the first [`top`](Self::top) of the
    /// two descending orders occupied by different nodes.
    ///
    /// Nodes with (numerically) tied scores may be counted as mismatches.
    pub mismatches: usize,
}

impl Comparison {
    /// Compares `scores` with `reference` on all nodes, and on the first
    /// `top` positions of the two rankings.
    ///
    /// # Panics
    ///
    /// Panics if the two vectors have different lengths.
    pub fn new(scores: &[f64], reference: &[f64], top: usize) -> Self {
        assert_eq!(
            scores.len(),
            reference.len(),
            "The score vector and the reference have different lengths"
        );
        let mut max_abs_diff = 0.0_f64;
        let mut l1_distance: KahanSum<f64> = KahanSum::new();
        for (x, y) in scores.iter().zip(reference) {
            let diff = (x - y).abs();
            max_abs_diff = max_abs_diff.max(diff);
            l1_distance += diff;
        }

        let top = top.min(scores.len());
        let mismatches = sort_scores(scores)
            .iter()
            .zip(sort_scores(reference).iter())
            .take(top)
            .filter(|((u, _), (v, _))| u != v)
            .count();

        Self {
            top,
            max_abs_diff,
            l1_distance: l1_distance.sum(),
            mismatches,
        }
    }
}
