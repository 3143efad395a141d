/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::ConfigError;
use super::blocks::BlockPartition;
use super::engine::{Engine, ScanStats};
use super::model::{Column, TransitionModel, inverse, teleport};
use crate::graph::Graph;
use crate::utils::CsrRows;
use rayon::prelude::*;

/// The part of the adjacency structure whose destinations lie in a block.
///
/// Rows are keyed by source, in increasing order; only sources with at
/// least one destination in the block have a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stripe {
    sources: Vec<usize>,
    destinations: CsrRows<usize>,
}

impl Stripe {
    fn push(&mut self, source: usize, destinations: impl IntoIterator<Item = usize>) {
        self.sources.push(source);
        self.destinations.push(destinations);
    }

    /// Returns the number of sources with a row in the stripe.
    pub fn num_sources(&self) -> usize {
        self.sources.len()
    }

    /// Returns the number of (source, destination) pairs in the stripe.
    pub fn num_arcs(&self) -> usize {
        self.destinations.num_values()
    }

    /// Returns an iterator over pairs (source, destinations).
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.sources.iter().copied().zip(self.destinations.iter())
    }
}

/// An engine partitioning the adjacency structure by destination block.
///
/// At construction, every arc is routed to the stripe of the block of its
/// destination, so that a step reads, for each block, only its own stripe:
/// every arc is read exactly once per iteration, instead of once per block
/// as in [`BlockEngine`](super::BlockEngine).
///
/// Dead ends are patched at construction: they get a row in every stripe
/// covering the whole block, and their out-degree is set to *n*. Steps are
/// thus oblivious of dead ends. Out-degrees are global, as they do not
/// depend on the stripe in which a destination falls.
#[derive(Debug, Clone)]
pub struct StripeEngine {
    partition: BlockPartition,
    stripes: Box<[Stripe]>,
    inv_outdegrees: Box<[f64]>,
}

impl StripeEngine {
    pub fn new(graph: &Graph, block_size: usize) -> Result<Self, ConfigError> {
        if block_size == 0 {
            return Err(ConfigError::BlockSize);
        }
        let model = TransitionModel::new(graph);
        let n = model.num_nodes();
        let partition = BlockPartition::new(n, block_size);
        let mut stripes = vec![Stripe::default(); partition.num_blocks()];
        let mut outdegrees = vec![0_usize; n];

        for (source, outdegree) in outdegrees.iter_mut().enumerate() {
            match model.column(source).0 {
                Column::Links(succ) => {
                    // Successors are sorted, so each stripe receives a run
                    for &destination in succ {
                        let stripe = &mut stripes[partition.block_of(destination)];
                        if stripe.sources.last() == Some(&source) {
                            stripe.destinations.extend_last(destination);
                        } else {
                            stripe.push(source, [destination]);
                        }
                        *outdegree += 1;
                    }
                }
                Column::Uniform(_) => {
                    for (stripe, range) in stripes.iter_mut().zip(partition.iter()) {
                        stripe.push(source, range);
                    }
                    *outdegree = n;
                }
            }
        }

        for stripe in stripes.iter_mut() {
            stripe.sources.shrink_to_fit();
            stripe.destinations.shrink_to_fit();
        }

        log::debug!(
            "{} stripes, {} (source, destination) pairs",
            stripes.len(),
            stripes.iter().map(Stripe::num_arcs).sum::<usize>()
        );

        Ok(Self {
            partition,
            stripes: stripes.into_boxed_slice(),
            inv_outdegrees: outdegrees.into_iter().map(inverse).collect(),
        })
    }

    /// Returns the block partition of the score vector.
    pub fn partition(&self) -> &BlockPartition {
        &self.partition
    }

    /// Returns the stripes, one per block.
    pub fn stripes(&self) -> &[Stripe] {
        &self.stripes
    }
}

impl Engine for StripeEngine {
    fn name(&self) -> &'static str {
        "stripe"
    }

    fn num_nodes(&self) -> usize {
        self.inv_outdegrees.len()
    }

    fn step(&self, alpha: f64, scores: &[f64], next: &mut [f64]) -> ScanStats {
        let teleport = teleport(alpha, self.num_nodes());
        next.par_chunks_mut(self.partition.block_size())
            .zip(self.stripes.par_iter())
            .enumerate()
            .map(|(block, (buffer, stripe))| {
                let start = self.partition.range(block).start;
                buffer.fill(teleport);
                for (source, destinations) in stripe.iter() {
                    let share = alpha * scores[source] * self.inv_outdegrees[source];
                    for &destination in destinations {
                        buffer[destination - start] += share;
                    }
                }
                ScanStats {
                    rows: stripe.num_sources() as u64,
                    arcs: stripe.num_arcs() as u64,
                    scans: 1,
                }
            })
            .reduce(ScanStats::default, |a, b| a + b)
    }
}
