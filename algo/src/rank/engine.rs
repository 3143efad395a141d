/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::monitor::preds::{L1Norm, MaxIter};
use super::monitor::{ConvergenceMonitor, Status};
use super::{Config, ConfigError, NonConvergence, Ranking};
use dsi_progress_logger::{ProgressLog, no_logging};
use kahan::KahanSum;
use std::ops::{Add, AddAssign};

/// Simulated storage traffic of a number of iterations.
///
/// Engines pretend that the adjacency structure lives on slow storage; these
/// counters measure how much of it they read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Adjacency rows read (one per source node and scan).
    pub rows: u64,
    /// Destination entries touched.
    pub arcs: u64,
    /// Scans of a whole adjacency structure, or of a stripe.
    pub scans: u64,
}

impl Add for ScanStats {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            rows: self.rows + rhs.rows,
            arcs: self.arcs + rhs.arcs,
            scans: self.scans + rhs.scans,
        }
    }
}

impl AddAssign for ScanStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// A strategy computing one power-iteration step.
///
/// Implementations hold structures built once from a graph and never
/// modified afterwards. The score vector is not part of the engine: a step
/// reads the committed vector `scores` and writes the next one in `next`,
/// which is the only mutable state it is handed. Committing `next` is the
/// responsibility of the caller (see [`PageRank::iterate`]), so a step can
/// never observe a partially updated vector.
pub trait Engine: Send + Sync {
    /// Returns a short name for logging.
    fn name(&self) -> &'static str;

    /// Returns the number of nodes of the graph.
    fn num_nodes(&self) -> usize;

    /// Writes in `next` the result of applying to `scores` the damped
    /// transition operator with damping factor `alpha`.
    ///
    /// Both slices have length [`num_nodes`](Engine::num_nodes); the previous
    /// content of `next` is irrelevant.
    fn step(&self, alpha: f64, scores: &[f64], next: &mut [f64]) -> ScanStats;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn num_nodes(&self) -> usize {
        (**self).num_nodes()
    }

    fn step(&self, alpha: f64, scores: &[f64], next: &mut [f64]) -> ScanStats {
        (**self).step(alpha, scores, next)
    }
}

/// The result of [`PageRank::iterate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// The number of iterations performed so far.
    pub iteration: usize,
    /// The 𝓁₁ norm of the difference between the new and the old vector.
    pub norm_delta: f64,
    pub status: Status,
}

impl Step {
    /// Returns whether the norm delta is within the threshold.
    pub fn converged(&self) -> bool {
        self.status == Status::Converged
    }
}

/// Power iteration driven by an [`Engine`].
///
/// The struct owns the committed score vector, initially uniform, and the
/// buffer the engine writes into. Each call to [`iterate`](Self::iterate)
/// computes a full step and then commits it by swapping the two vectors:
/// this is the only point in which the committed vector changes.
///
/// # Examples
///
/// ```
/// use striperank::graph::Graph;
/// use striperank::rank::{Config, PageRank, StripeEngine};
///
/// let graph = Graph::from_arcs([(1, 2), (2, 3), (3, 1), (3, 4)])?;
/// let config = Config::default().block_size(2);
/// let mut pr = PageRank::new(StripeEngine::new(&graph, config.block_size)?, config)?;
/// let ranking = pr.run()?;
///
/// assert_eq!(ranking.scores.len(), 4);
/// assert!((ranking.scores.iter().sum::<f64>() - 1.0).abs() < 1E-9);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct PageRank<E> {
    engine: E,
    config: Config,
    scores: Box<[f64]>,
    next: Box<[f64]>,
    monitor: ConvergenceMonitor,
    stats: ScanStats,
}

impl<E: Engine> PageRank<E> {
    /// Creates a new computation with a uniform initial vector.
    ///
    /// The block size in `config` is not used here: it is a parameter of the
    /// engine constructors.
    pub fn new(engine: E, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let n = engine.num_nodes();
        let monitor = ConvergenceMonitor::new(
            L1Norm::try_from(config.threshold)?,
            MaxIter::from(config.max_iter),
        );
        Ok(Self {
            engine,
            config,
            scores: vec![1.0 / n as f64; n].into_boxed_slice(),
            next: vec![0.0; n].into_boxed_slice(),
            monitor,
            stats: ScanStats::default(),
        })
    }

    /// Replaces the score vector, resetting the iteration count.
    pub fn with_scores(mut self, scores: impl Into<Box<[f64]>>) -> Result<Self, ConfigError> {
        let scores = scores.into();
        let expected = self.engine.num_nodes();
        if scores.len() != expected {
            return Err(ConfigError::InitialScores {
                expected,
                got: scores.len(),
            });
        }
        self.scores = scores;
        self.monitor.reset();
        self.stats = ScanStats::default();
        Ok(self)
    }

    /// Performs one iteration and commits its result.
    pub fn iterate(&mut self) -> Step {
        let stats = self
            .engine
            .step(self.config.alpha, &self.scores, &mut self.next);

        let mut norm_delta: KahanSum<f64> = KahanSum::new();
        for (new, old) in self.next.iter().zip(self.scores.iter()) {
            norm_delta += (new - old).abs();
        }
        let norm_delta = norm_delta.sum();

        // Commit
        std::mem::swap(&mut self.scores, &mut self.next);
        self.stats += stats;

        let status = self.monitor.observe(norm_delta);
        let iteration = self.monitor.iteration();
        if self.config.verbose {
            log::info!("Iteration {}: norm delta = {}", iteration, norm_delta);
        } else {
            log::debug!("Iteration {}: norm delta = {}", iteration, norm_delta);
        }

        Step {
            iteration,
            norm_delta,
            status,
        }
    }

    /// Iterates until convergence.
    ///
    /// If the maximum number of iterations is reached first, the error
    /// contains the last score vector and norm delta.
    pub fn run(&mut self) -> Result<Ranking, NonConvergence> {
        self.run_with_logging(no_logging![])
    }

    /// Iterates until convergence as [`run`](Self::run) does, logging
    /// iterations on `pl`.
    pub fn run_with_logging(
        &mut self,
        pl: &mut impl ProgressLog,
    ) -> Result<Ranking, NonConvergence> {
        let n = self.engine.num_nodes();
        log::info!("Engine: {}", self.engine.name());
        log::info!("Nodes: {}", n);
        log::info!("Alpha: {}", self.config.alpha);
        log::info!("Stopping criterion: {}", self.monitor);

        if n == 0 {
            return Ok(self.ranking());
        }

        pl.item_name("iteration");
        pl.expected_updates(None);
        pl.start(format!(
            "Computing PageRank ({} engine, alpha={})...",
            self.engine.name(),
            self.config.alpha
        ));

        loop {
            let step = self.iterate();
            pl.update_and_display();
            match step.status {
                Status::Running => {}
                Status::Converged => break,
                Status::Exhausted => {
                    pl.done();
                    log::warn!(
                        "No convergence after {} iteration(s), norm delta = {}",
                        step.iteration,
                        step.norm_delta
                    );
                    return Err(NonConvergence {
                        iterations: step.iteration,
                        norm_delta: step.norm_delta,
                        scores: self.scores.clone(),
                    });
                }
            }
        }

        pl.done();
        log::info!(
            "Completed after {} iteration(s), norm delta = {}",
            self.iterations(),
            self.norm_delta()
        );
        Ok(self.ranking())
    }

    /// Returns the committed score vector.
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Returns the number of iterations performed.
    pub fn iterations(&self) -> usize {
        self.monitor.iteration()
    }

    /// Returns the norm delta of the last iteration.
    pub fn norm_delta(&self) -> f64 {
        self.monitor.norm_delta()
    }

    /// Returns the storage traffic accumulated by all iterations.
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Returns the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn ranking(&self) -> Ranking {
        Ranking {
            scores: self.scores.clone(),
            iterations: self.iterations(),
            norm_delta: self.norm_delta(),
            stats: self.stats,
        }
    }
}
