/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::engine::ScanStats;
use std::io::Write;

/// The outcome of a converged computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// The score of each node, indexed by 0-based identifier.
    pub scores: Box<[f64]>,
    /// The number of iterations performed.
    pub iterations: usize,
    /// The norm delta of the last iteration.
    pub norm_delta: f64,
    /// The storage traffic of all iterations.
    pub stats: ScanStats,
}

impl Ranking {
    /// Returns pairs (1-based identifier, score) in descending score order;
    /// see [`sort_scores`].
    pub fn sorted(&self) -> Vec<(usize, f64)> {
        sort_scores(&self.scores)
    }

    /// Returns the first `k` pairs of [`sorted`](Self::sorted).
    pub fn top(&self, k: usize) -> Vec<(usize, f64)> {
        let mut sorted = self.sorted();
        sorted.truncate(k);
        sorted
    }
}

/// Returns pairs (1-based identifier, score) sorted by decreasing score.
///
/// Ties are broken by increasing identifier.
pub fn sort_scores(scores: &[f64]) -> Vec<(usize, f64)> {
    let mut sorted: Vec<(usize, f64)> = scores
        .iter()
        .enumerate()
        .map(|(i, &score)| (i + 1, score))
        .collect();
    sorted.sort_by(|(u, x), (v, y)| y.total_cmp(x).then(u.cmp(v)));
    sorted
}

/// Writes pairs (identifier, score) as lines `<identifier> <score>`.
pub fn write_ranking(mut writer: impl Write, ranked: &[(usize, f64)]) -> std::io::Result<()> {
    for (node, score) in ranked {
        writeln!(writer, "{} {}", node, score)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_and_write() {
        let ranked = sort_scores(&[0.25, 0.5, 0.125, 0.125]);
        assert_eq!(ranked, vec![(2, 0.5), (1, 0.25), (3, 0.125), (4, 0.125)]);

        let mut out = Vec::new();
        write_ranking(&mut out, &ranked[..2]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "2 0.5\n1 0.25\n");
    }
}
