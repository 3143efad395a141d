/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Graphs given as lists of arcs between 1-based node identifiers.
//!
//! An [`ArcList`] is what a loader sees: a sequence of arcs and the set of
//! identifiers they mention. Identifiers must cover exactly the range [1 . .
//! *n*], where *n* is the number of distinct identifiers; this is checked by
//! [`ArcList::check_contiguous`], and enforced by [`ArcList::into_graph`],
//! which is the only way to build a [`Graph`]. No engine can thus be built on
//! a graph with holes in its identifier space.
//!
//! A [`Graph`] is the validated, deduplicated set of arcs with 0-based
//! identifiers, sorted by source and then by destination.

mod adjacency;
pub use adjacency::*;

use dsi_progress_logger::{ProgressLog, no_logging};
use rayon::slice::ParallelSliceMut;
use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading or validating a graph.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node identifiers are not contiguous: {missing} is missing from [1 . . {num_nodes}]")]
    NotContiguous { num_nodes: usize, missing: usize },
    #[error("Line {line}: expected two node identifiers, got {content:?}")]
    MissingColumn { line: usize, content: String },
    #[error("Line {line}: could not parse {value:?} as a node identifier")]
    ParseId {
        line: usize,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("Could not open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A list of arcs between 1-based node identifiers, together with the set of
/// identifiers appearing in it.
#[derive(Debug, Clone, Default)]
pub struct ArcList {
    arcs: Vec<(usize, usize)>,
    node_ids: HashSet<usize>,
}

impl ArcList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arc.
    pub fn push(&mut self, source: usize, destination: usize) {
        self.node_ids.insert(source);
        self.node_ids.insert(destination);
        self.arcs.push((source, destination));
    }

    /// Reads a list of arcs, one per line, each given by two
    /// whitespace-separated node identifiers.
    ///
    /// Empty lines and lines starting with `#` are skipped; columns after the
    /// second one are ignored.
    pub fn read(reader: impl BufRead) -> Result<Self, GraphError> {
        Self::read_with_logging(reader, no_logging![])
    }

    /// Reads a list of arcs as [`read`](Self::read) does, logging progress
    /// on `pl`.
    pub fn read_with_logging(
        reader: impl BufRead,
        pl: &mut impl ProgressLog,
    ) -> Result<Self, GraphError> {
        let mut list = Self::new();

        pl.item_name("line");
        pl.expected_updates(None);
        pl.start("Reading arcs...");

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut columns = trimmed.split_whitespace();
            let (Some(source), Some(destination)) = (columns.next(), columns.next()) else {
                return Err(GraphError::MissingColumn {
                    line: line_num,
                    content: line.clone(),
                });
            };

            list.push(
                parse_id(source, line_num)?,
                parse_id(destination, line_num)?,
            );
            pl.light_update();
        }

        pl.done();
        log::info!(
            "Arcs read: {} Nodes: {}",
            list.num_arcs(),
            list.num_nodes()
        );
        Ok(list)
    }

    /// Reads a list of arcs from a file; see [`read`](Self::read).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let path = path.as_ref();
        log::info!("Loading arcs from {}", path.display());
        let file = std::fs::File::open(path).map_err(|source| GraphError::Open {
            path: path.to_owned(),
            source,
        })?;
        Self::read(BufReader::new(file))
    }

    /// Returns the number of distinct node identifiers.
    pub fn num_nodes(&self) -> usize {
        self.node_ids.len()
    }

    /// Returns the number of arcs, duplicates included.
    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    /// Returns the set of node identifiers appearing in the list.
    pub fn node_ids(&self) -> &HashSet<usize> {
        &self.node_ids
    }

    /// Returns the arcs, in insertion order.
    pub fn arcs(&self) -> &[(usize, usize)] {
        &self.arcs
    }

    /// Checks that node identifiers are exactly [1 . . *n*], where *n* is the
    /// [number of distinct identifiers](Self::num_nodes).
    ///
    /// On failure, the error contains the smallest missing identifier.
    pub fn check_contiguous(&self) -> Result<(), GraphError> {
        let num_nodes = self.num_nodes();
        match (1..=num_nodes).find(|id| !self.node_ids.contains(id)) {
            None => Ok(()),
            Some(missing) => Err(GraphError::NotContiguous { num_nodes, missing }),
        }
    }

    /// Validates the identifiers and turns the list into a [`Graph`].
    ///
    /// Identifiers become 0-based, arcs are sorted by source and destination,
    /// and duplicate arcs are removed.
    pub fn into_graph(self) -> Result<Graph, GraphError> {
        self.check_contiguous()?;
        let num_nodes = self.num_nodes();
        let mut arcs = self.arcs;
        for (source, destination) in arcs.iter_mut() {
            *source -= 1;
            *destination -= 1;
        }
        arcs.par_sort_unstable();
        let before = arcs.len();
        arcs.dedup();
        if arcs.len() != before {
            log::info!("Removed {} duplicate arcs", before - arcs.len());
        }

        Ok(Graph {
            num_nodes,
            arcs: arcs.into_boxed_slice(),
        })
    }
}

impl FromIterator<(usize, usize)> for ArcList {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        let mut list = Self::new();
        for (source, destination) in iter {
            list.push(source, destination);
        }
        list
    }
}

fn parse_id(value: &str, line: usize) -> Result<usize, GraphError> {
    value.parse::<usize>().map_err(|source| GraphError::ParseId {
        line,
        value: value.to_owned(),
        source,
    })
}

/// A static directed graph with contiguous 0-based node identifiers.
///
/// Arcs are sorted by source and then by destination, and contain no
/// duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    num_nodes: usize,
    arcs: Box<[(usize, usize)]>,
}

impl Graph {
    /// Builds a graph from arcs between 1-based node identifiers.
    ///
    /// # Examples
    ///
    /// ```
    /// use striperank::graph::Graph;
    ///
    /// let graph = Graph::from_arcs([(1, 2), (2, 3), (3, 1), (1, 2)])?;
    /// assert_eq!(graph.num_nodes(), 3);
    /// assert_eq!(graph.arcs(), &[(0, 1), (1, 2), (2, 0)]);
    /// # Ok::<(), striperank::graph::GraphError>(())
    /// ```
    pub fn from_arcs(arcs: impl IntoIterator<Item = (usize, usize)>) -> Result<Self, GraphError> {
        arcs.into_iter().collect::<ArcList>().into_graph()
    }

    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Returns the number of arcs.
    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    /// Returns the arcs as 0-based pairs, sorted by source and destination.
    pub fn arcs(&self) -> &[(usize, usize)] {
        &self.arcs
    }
}
