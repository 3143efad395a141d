/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::{GlobalArgs, NumThreadsArg, RankingFormat, get_thread_pool, read_arcs};
use anyhow::{Context, Result, ensure};
use clap::Parser;
use dsi_progress_logger::{ProgressLog, progress_logger};
use predicates::prelude::*;
use std::path::PathBuf;
use striperank::rank::preds::{L1Norm, MaxIter};
use striperank::rank::{Comparison, Config, EngineKind, PageRank, ReferenceRank};

/// The engine computing the iteration.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default)]
pub enum CliEngine {
    /// Materialize the whole transition matrix (small graphs only).
    Dense,
    /// Adjacency lists and a full next vector.
    Sparse,
    /// One block of the next vector; one scan of all lists per block.
    Block,
    /// One block of the next vector; lists pre-split by destination block.
    #[default]
    Stripe,
}

impl From<CliEngine> for EngineKind {
    fn from(e: CliEngine) -> Self {
        match e {
            CliEngine::Dense => EngineKind::Dense,
            CliEngine::Sparse => EngineKind::Sparse,
            CliEngine::Block => EngineKind::Block,
            CliEngine::Stripe => EngineKind::Stripe,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "rank",
    about = "Computes PageRank by power iteration.",
    long_about = None
)]
pub struct CliArgs {
    /// The file containing the arcs, one `<source> <destination>` pair of
    /// 1-based identifiers per line, or `-` for standard input.
    pub edges: PathBuf,

    #[arg(short, long, value_enum, default_value_t = CliEngine::Stripe)]
    /// The engine.
    pub engine: CliEngine,

    #[arg(short, long, default_value_t = Config::DEFAULT_ALPHA)]
    /// The damping factor α (must be in the interval [0 . . 1).
    pub alpha: f64,

    #[arg(short, long, default_value_t = L1Norm::DEFAULT_THRESHOLD)]
    /// The ℓ₁ threshold on the difference between successive vectors.
    pub threshold: f64,

    #[arg(short, long, default_value_t = Config::DEFAULT_BLOCK_SIZE)]
    /// The number of scores kept in memory by block engines.
    pub block_size: usize,

    #[arg(long, default_value_t = MaxIter::DEFAULT_MAX_ITER)]
    /// Maximum number of iterations.
    pub max_iter: usize,

    #[arg(short, long)]
    /// Log every iteration at info level.
    pub verbose: bool,

    #[arg(short, long)]
    /// Where to store the ranking (standard output if missing).
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = RankingFormat::Ascii)]
    /// The output format for the ranking.
    pub fmt: RankingFormat,

    #[arg(long)]
    /// Decimal digits for ASCII output.
    pub precision: Option<usize>,

    #[arg(long)]
    /// Output only the given number of top-ranked nodes.
    pub top: Option<usize>,

    #[arg(long)]
    /// Compare the result with an independent Gauss–Seidel computation.
    pub check: bool,

    #[arg(long, default_value_t = 10)]
    /// The number of top positions compared by --check.
    pub check_top: usize,

    #[clap(flatten)]
    pub num_threads: NumThreadsArg,
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    ensure!(
        // Note that 0.0..1.0 is [0.0..1.0) in mathematical notation
        (0.0..1.0).contains(&args.alpha),
        "The damping factor must be in [0 . . 1), got {}",
        args.alpha
    );

    let config = Config::default()
        .alpha(args.alpha)
        .threshold(args.threshold)
        .block_size(args.block_size)
        .max_iter(args.max_iter)
        .verbose(args.verbose);
    config.validate()?;

    let mut pl = progress_logger![];
    if let Some(log_interval) = global_args.log_interval {
        pl.log_interval(log_interval);
    }

    let thread_pool = get_thread_pool(args.num_threads.num_threads)?;

    let graph = read_arcs(&args.edges, &mut pl)?
        .into_graph()
        .with_context(|| format!("Invalid graph {}", args.edges.display()))?;
    log::info!(
        "Graph: {} nodes, {} arcs",
        graph.num_nodes(),
        graph.num_arcs()
    );

    let kind = EngineKind::from(args.engine);
    let engine = kind.build(&graph, &config)?;
    let mut pr = PageRank::new(engine, config)?;

    let ranking = thread_pool.install(|| pr.run_with_logging(&mut pl))?;
    log::info!(
        "Rows read: {} Entries touched: {} Scans: {}",
        ranking.stats.rows,
        ranking.stats.arcs,
        ranking.stats.scans
    );

    if args.check {
        let n = graph.num_nodes();
        let mut reference = ReferenceRank::new(&graph);
        reference.alpha(args.alpha);
        let predicate = L1Norm::try_from(args.threshold / n.max(1) as f64)?
            .or(MaxIter::from(args.max_iter))
            .boxed();
        reference.run_with_logging(predicate, &mut pl);

        let comparison = Comparison::new(&ranking.scores, reference.rank(), args.check_top);
        log::info!("Max absolute difference: {}", comparison.max_abs_diff);
        log::info!("ℓ₁ distance: {}", comparison.l1_distance);
        log::info!(
            "Mismatches in the top {}: {}",
            comparison.top,
            comparison.mismatches
        );
        if comparison.max_abs_diff > args.threshold {
            log::warn!(
                "The reference differs by more than the threshold ({})",
                args.threshold
            );
        }
    }

    let ranked = match args.top {
        Some(k) => ranking.top(k),
        None => ranking.sorted(),
    };

    match &args.output {
        Some(path) => args.fmt.store(path, &ranked, args.precision)?,
        None => args
            .fmt
            .write(std::io::stdout().lock(), &ranked, args.precision)?,
    }

    Ok(())
}
