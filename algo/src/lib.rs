/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! PageRank by power iteration under shrinking memory budgets.
//!
//! The crate provides four engines computing the same fixed point:
//!
//! - [`DenseEngine`](rank::DenseEngine) materializes the whole transition
//!   matrix;
//! - [`SparseEngine`](rank::SparseEngine) scans adjacency rows one source at
//!   a time, keeping the whole next vector in memory;
//! - [`BlockEngine`](rank::BlockEngine) keeps only a block of the next vector
//!   in memory, scanning the whole adjacency structure once per block;
//! - [`StripeEngine`](rank::StripeEngine) partitions the adjacency structure
//!   by destination block, so that each arc is read once per iteration.
//!
//! Graphs are read from text edge lists with 1-based, contiguous node
//! identifiers (see [`graph::ArcList`]).

#![deny(unconditional_recursion)]
#![deny(unreachable_code)]
#![deny(unreachable_patterns)]
#![deny(unused_doc_comments)]

pub mod graph;
pub mod rank;
pub mod utils;

pub mod prelude {
    pub use crate::graph::{ArcList, Graph, GraphError, SparseAdjacency};
    pub use crate::rank::{
        BlockEngine, Config, ConfigError, DenseEngine, Engine, EngineKind, NonConvergence,
        PageRank, RankError, Ranking, SparseEngine, StripeEngine, rank,
    };
}
