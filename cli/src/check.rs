/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::{GlobalArgs, read_arcs};
use anyhow::{Context, Result};
use clap::Parser;
use dsi_progress_logger::{ProgressLog, progress_logger};
use std::path::PathBuf;
use striperank::graph::SparseAdjacency;

#[derive(Parser, Debug)]
#[command(
    name = "check",
    about = "Checks that node identifiers are contiguous and reports basic statistics.",
    long_about = None
)]
pub struct CliArgs {
    /// The file containing the arcs, or `-` for standard input.
    pub edges: PathBuf,
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    let mut pl = progress_logger![];
    if let Some(log_interval) = global_args.log_interval {
        pl.log_interval(log_interval);
    }

    let arcs = read_arcs(&args.edges, &mut pl)?;
    let num_arcs = arcs.num_arcs();
    let graph = arcs
        .into_graph()
        .with_context(|| format!("Invalid graph {}", args.edges.display()))?;
    let adjacency = SparseAdjacency::new(&graph);

    log::info!("Node identifiers are contiguous");
    log::info!("Nodes: {}", graph.num_nodes());
    log::info!(
        "Arcs: {} ({} duplicates)",
        graph.num_arcs(),
        num_arcs - graph.num_arcs()
    );
    log::info!("Dead ends: {}", adjacency.num_dead_ends());
    Ok(())
}
