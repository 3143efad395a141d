/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! PageRank engines.
//!
//! All engines compute the fixed point of the damped transition operator
//! described in [`model`], starting from the uniform vector and stopping when
//! the 𝓁₁ norm of the difference between successive vectors is at most the
//! configured threshold. They differ only in which structures they keep in
//! memory and how much of the adjacency structure they read per iteration:
//!
//! | Engine           | In memory                 | Rows read per iteration |
//! |------------------|---------------------------|-------------------------|
//! | [`DenseEngine`]  | *n* × *n* matrix          | *n* (dense)             |
//! | [`SparseEngine`] | next vector               | *n*                     |
//! | [`BlockEngine`]  | one block of next vector  | *n* ⌈*n* / *b*⌉         |
//! | [`StripeEngine`] | one block of next vector  | one per stripe source   |
//!
//! Engines implement [`Engine`], and are driven by [`PageRank`], which owns
//! the score vector and commits it at the end of each iteration.

mod block;
mod blocks;
mod dense;
mod engine;
mod export;
pub mod model;
mod monitor;
mod oracle;
mod sparse;
mod stripe;

pub use block::*;
pub use blocks::*;
pub use dense::*;
pub use engine::*;
pub use export::*;
pub use monitor::*;
pub use oracle::*;
pub use sparse::*;
pub use stripe::*;

use crate::graph::{Graph, GraphError};
use thiserror::Error;

/// Errors in the configuration of a computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("The damping factor must be in [0 . . 1), got {0}")]
    DampingFactor(f64),
    #[error("The threshold must be positive, got {0}")]
    Threshold(f64),
    #[error("The block size must be positive")]
    BlockSize,
    #[error("The maximum number of iterations must be positive")]
    MaxIter,
    #[error("The dense engine supports at most {max} nodes, got {num_nodes}")]
    DenseTooLarge { num_nodes: usize, max: usize },
    #[error("The initial score vector has length {got}, expected {expected}")]
    InitialScores { expected: usize, got: usize },
}

/// The maximum number of iterations was reached before convergence.
///
/// The error carries the last score vector computed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("No convergence within {iterations} iterations (norm delta = {norm_delta})")]
pub struct NonConvergence {
    pub iterations: usize,
    pub norm_delta: f64,
    pub scores: Box<[f64]>,
}

/// Any error of [`rank`].
#[derive(Error, Debug)]
pub enum RankError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    NonConvergence(#[from] NonConvergence),
}

/// Parameters of a computation.
///
/// # Examples
///
/// ```
/// use striperank::rank::Config;
///
/// let config = Config::default().alpha(0.9).threshold(1E-9).block_size(100);
/// assert!(config.validate().is_ok());
/// assert!(Config::default().alpha(1.0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// The damping factor α: the probability of following an arc rather
    /// than teleporting.
    pub alpha: f64,
    /// The 𝓁₁ convergence threshold.
    pub threshold: f64,
    /// The width of the in-memory buffer of block engines.
    pub block_size: usize,
    /// The maximum number of iterations.
    pub max_iter: usize,
    /// Whether to log every iteration at `info` level.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alpha: Self::DEFAULT_ALPHA,
            threshold: preds::L1Norm::DEFAULT_THRESHOLD,
            block_size: Self::DEFAULT_BLOCK_SIZE,
            max_iter: preds::MaxIter::DEFAULT_MAX_ITER,
            verbose: false,
        }
    }
}

impl Config {
    pub const DEFAULT_ALPHA: f64 = 0.85;
    pub const DEFAULT_BLOCK_SIZE: usize = 2000;

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Checks that all parameters are within their domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Note that 0.0..1.0 is [0.0..1.0) in mathematical notation
        if !(0.0..1.0).contains(&self.alpha) {
            return Err(ConfigError::DampingFactor(self.alpha));
        }
        preds::L1Norm::try_from(self.threshold)?;
        if self.block_size == 0 {
            return Err(ConfigError::BlockSize);
        }
        if self.max_iter == 0 {
            return Err(ConfigError::MaxIter);
        }
        Ok(())
    }
}

/// The available engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    /// See [`DenseEngine`].
    Dense,
    /// See [`SparseEngine`].
    Sparse,
    /// See [`BlockEngine`].
    Block,
    /// See [`StripeEngine`].
    #[default]
    Stripe,
}

impl EngineKind {
    pub const ALL: [EngineKind; 4] = [
        EngineKind::Dense,
        EngineKind::Sparse,
        EngineKind::Block,
        EngineKind::Stripe,
    ];

    /// Builds an engine of this kind on a graph, using the block size in
    /// `config` if needed.
    pub fn build(self, graph: &Graph, config: &Config) -> Result<Box<dyn Engine>, ConfigError> {
        Ok(match self {
            EngineKind::Dense => Box::new(DenseEngine::new(graph)?),
            EngineKind::Sparse => Box::new(SparseEngine::new(graph)),
            EngineKind::Block => Box::new(BlockEngine::new(graph, config.block_size)?),
            EngineKind::Stripe => Box::new(StripeEngine::new(graph, config.block_size)?),
        })
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Dense => f.write_str("dense"),
            EngineKind::Sparse => f.write_str("sparse"),
            EngineKind::Block => f.write_str("block"),
            EngineKind::Stripe => f.write_str("stripe"),
        }
    }
}

/// Computes PageRank on a graph with an engine of the given kind.
///
/// # Examples
///
/// ```
/// use striperank::graph::Graph;
/// use striperank::rank::{Config, EngineKind, rank};
///
/// let graph = Graph::from_arcs([(1, 2), (2, 3), (3, 1)])?;
/// let ranking = rank(&graph, EngineKind::Block, Config::default())?;
/// for score in ranking.scores.iter() {
///     assert!((score - 1.0 / 3.0).abs() < 1E-12);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn rank(graph: &Graph, kind: EngineKind, config: Config) -> Result<Ranking, RankError> {
    config.validate()?;
    let engine = kind.build(graph, &config)?;
    let mut pr = PageRank::new(engine, config)?;
    Ok(pr.run()?)
}
