/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use striperank::graph::{Graph, SparseAdjacency};
use striperank::rank::{
    BlockEngine, Config, ConfigError, DenseEngine, Engine, EngineKind, PageRank, RankError,
    ReferenceRank, SparseEngine, Status, StripeEngine, preds, rank,
};

/// Builds a random graph on 1-based identifiers [1 . . `n`] in which each node
/// is a dead end with probability `dead_prob`. Nodes not appearing in any
/// arc receive an arc from node 1, so identifiers are contiguous.
fn random_graph(n: usize, max_outdegree: usize, dead_prob: f64, seed: u64) -> Graph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut arcs = Vec::new();
    for u in 1..=n {
        if rng.random_bool(dead_prob) {
            continue;
        }
        for _ in 0..rng.random_range(1..=max_outdegree) {
            arcs.push((u, rng.random_range(1..=n)));
        }
    }
    let seen: HashSet<usize> = arcs.iter().flat_map(|&(u, v)| [u, v]).collect();
    for v in 1..=n {
        if !seen.contains(&v) {
            arcs.push((1, v));
        }
    }
    Graph::from_arcs(arcs).unwrap()
}

/// Returns the 𝓁-∞ distance (maximum absolute difference) between two vectors.
fn l_inf_distance(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

#[test]
fn test_empty() {
    let graph = Graph::from_arcs([]).unwrap();
    for kind in EngineKind::ALL {
        let ranking = rank(&graph, kind, Config::default()).unwrap();
        assert!(ranking.scores.is_empty());
        assert_eq!(ranking.iterations, 0);
    }
}

#[test]
fn test_cycle() {
    let graph = Graph::from_arcs([(1, 2), (2, 3), (3, 1)]).unwrap();
    for kind in EngineKind::ALL {
        let ranking = rank(&graph, kind, Config::default()).unwrap();
        for &score in ranking.scores.iter() {
            assert!((score - 1.0 / 3.0).abs() < 1E-12, "{kind}: {score}");
        }
        // The uniform vector is already the fixed point
        assert_eq!(ranking.iterations, 1, "{kind}");
        assert!(ranking.norm_delta < 1E-15);
    }
}

#[test]
fn test_stochastic() {
    for seed in 0..3 {
        let graph = random_graph(60, 5, 0.2, seed);
        for alpha in [0.0, 0.25, 0.5, 0.85, 0.99] {
            let config = Config::default()
                .alpha(alpha)
                .block_size(7)
                .max_iter(100_000);
            for kind in EngineKind::ALL {
                let ranking = rank(&graph, kind, config).unwrap();
                let sum: f64 = ranking.scores.iter().sum();
                assert!(
                    (sum - 1.0).abs() < 1E-4,
                    "{kind} seed={seed} alpha={alpha}: sum = {sum}"
                );
                assert!(ranking.scores.iter().all(|&x| x > 0.0));
            }
        }
    }
}

#[test]
fn test_engines_agree() {
    for seed in 0..3 {
        let graph = random_graph(200, 8, 0.1, seed);
        let config = Config::default().threshold(1E-10).block_size(7);

        let mut reference = ReferenceRank::new(&graph);
        reference.run(preds::L1Norm::try_from(1E-12).unwrap());

        let rankings = EngineKind::ALL.map(|kind| rank(&graph, kind, config).unwrap());
        for (kind, ranking) in EngineKind::ALL.iter().zip(rankings.iter()) {
            let distance = l_inf_distance(&ranking.scores, reference.rank());
            assert!(distance < 1E-8, "{kind} seed={seed}: L∞ = {distance}");
            let distance = l_inf_distance(&ranking.scores, &rankings[0].scores);
            assert!(distance < 1E-9, "{kind} seed={seed}: L∞ = {distance}");
        }
    }
}

#[test]
fn test_iteration_counts_agree() {
    let graph = random_graph(100, 4, 0.15, 42);
    let config = Config::default().block_size(13);
    let iterations = EngineKind::ALL.map(|kind| rank(&graph, kind, config).unwrap().iterations);
    assert!(iterations[0] > 1);
    assert!(iterations.iter().all(|&i| i == iterations[0]), "{iterations:?}");
}

#[test]
fn test_dead_end() {
    // 3 is a dead end, reachable from 1
    let graph = Graph::from_arcs([(1, 2), (2, 1), (1, 3)]).unwrap();
    // The same graph in which 3 links explicitly to all nodes
    let patched = Graph::from_arcs([(1, 2), (2, 1), (1, 3), (3, 1), (3, 2), (3, 3)]).unwrap();
    let alpha = 0.85;
    let config = Config::default().alpha(alpha).threshold(1E-12).block_size(2);

    for kind in EngineKind::ALL {
        let r = rank(&graph, kind, config).unwrap().scores;
        assert!(r[2] > 0.0);

        // 2 and 3 receive half of the mass of 1 and a third of the mass of 3
        assert!((r[1] - r[2]).abs() < 1E-10, "{kind}: {r:?}");
        let teleport = (1.0 - alpha) / 3.0;
        let expected = [
            teleport + alpha * (r[1] + r[2] / 3.0),
            teleport + alpha * (r[0] / 2.0 + r[2] / 3.0),
            teleport + alpha * (r[0] / 2.0 + r[2] / 3.0),
        ];
        assert!(l_inf_distance(&r, &expected) < 1E-10, "{kind}: {r:?}");

        let p = rank(&patched, kind, config).unwrap().scores;
        assert!(l_inf_distance(&r, &p) < 1E-10, "{kind}: {r:?} != {p:?}");
    }
}

#[test]
fn test_fixed_point() {
    let graph = random_graph(150, 6, 0.1, 7);
    let config = Config::default().block_size(16);
    for kind in EngineKind::ALL {
        let ranking = rank(&graph, kind, config).unwrap();
        let mut pr = PageRank::new(kind.build(&graph, &config).unwrap(), config)
            .unwrap()
            .with_scores(ranking.scores.clone())
            .unwrap();
        let step = pr.iterate();
        assert_eq!(step.iteration, 1);
        assert!(step.converged(), "{kind}: {}", step.norm_delta);
        assert!(step.norm_delta < config.threshold);
    }
}

#[test]
fn test_non_convergence() {
    let graph = random_graph(80, 5, 0.1, 3);
    let config = Config::default().threshold(1E-15).max_iter(3);
    for kind in EngineKind::ALL {
        match rank(&graph, kind, config) {
            Err(RankError::NonConvergence(err)) => {
                assert_eq!(err.iterations, 3);
                assert!(err.norm_delta > 1E-15);
                assert_eq!(err.scores.len(), 80);
                assert!((err.scores.iter().sum::<f64>() - 1.0).abs() < 1E-9);
            }
            other => panic!("{kind}: unexpected result {other:?}"),
        }
    }
}

#[test]
fn test_iterate() {
    let graph = random_graph(50, 3, 0.2, 11);
    let config = Config::default().threshold(1E-8);
    let mut pr = PageRank::new(SparseEngine::new(&graph), config).unwrap();
    assert_eq!(pr.iterations(), 0);
    assert_eq!(pr.norm_delta(), f64::INFINITY);
    assert!(pr.scores().iter().all(|&x| x == 1.0 / 50.0));

    let mut last = f64::INFINITY;
    loop {
        let step = pr.iterate();
        assert_eq!(step.iteration, pr.iterations());
        // The damped operator is a contraction
        assert!(step.norm_delta <= last * config.alpha + 1E-12);
        last = step.norm_delta;
        if step.status == Status::Converged {
            break;
        }
    }
    // Resuming a converged computation takes one more iteration
    let before = pr.iterations();
    let ranking = pr.run().unwrap();
    assert_eq!(ranking.iterations, before + 1);
}

#[test]
fn test_scan_stats() {
    let graph = random_graph(50, 4, 0.2, 5);
    let adjacency = SparseAdjacency::new(&graph);
    let n = graph.num_nodes() as u64;
    let arcs = graph.num_arcs() as u64 + adjacency.num_dead_ends() as u64 * n;
    let config = Config::default();
    let block_size = 7;
    let num_blocks = n.div_ceil(block_size as u64);

    let mut pr = PageRank::new(DenseEngine::new(&graph).unwrap(), config).unwrap();
    pr.iterate();
    assert_eq!(pr.stats().rows, n);
    assert_eq!(pr.stats().arcs, n * n);

    let mut pr = PageRank::new(SparseEngine::new(&graph), config).unwrap();
    pr.iterate();
    assert_eq!(pr.stats().rows, n);
    assert_eq!(pr.stats().arcs, arcs);
    assert_eq!(pr.stats().scans, 1);

    let mut pr = PageRank::new(BlockEngine::new(&graph, block_size).unwrap(), config).unwrap();
    pr.iterate();
    assert_eq!(pr.stats().rows, n * num_blocks);
    assert_eq!(pr.stats().arcs, arcs);
    assert_eq!(pr.stats().scans, num_blocks);

    let engine = StripeEngine::new(&graph, block_size).unwrap();
    let stripe_rows: u64 = engine.stripes().iter().map(|s| s.num_sources() as u64).sum();
    let mut pr = PageRank::new(engine, config).unwrap();
    pr.iterate();
    assert_eq!(pr.stats().rows, stripe_rows);
    assert!(stripe_rows < n * num_blocks);
    assert_eq!(pr.stats().arcs, arcs);
    assert_eq!(pr.stats().scans, num_blocks);

    pr.iterate();
    assert_eq!(pr.stats().arcs, 2 * arcs);
}

#[test]
fn test_config_errors() {
    let graph = Graph::from_arcs([(1, 2), (2, 1)]).unwrap();
    for alpha in [1.0, -0.1, f64::NAN] {
        assert!(matches!(
            rank(&graph, EngineKind::Sparse, Config::default().alpha(alpha)),
            Err(RankError::Config(ConfigError::DampingFactor(_)))
        ));
    }
    for threshold in [0.0, -1.0, f64::NAN] {
        assert!(matches!(
            Config::default().threshold(threshold).validate(),
            Err(ConfigError::Threshold(_))
        ));
    }
    assert_eq!(
        Config::default().block_size(0).validate(),
        Err(ConfigError::BlockSize)
    );
    assert_eq!(
        Config::default().max_iter(0).validate(),
        Err(ConfigError::MaxIter)
    );
    assert!(matches!(
        BlockEngine::new(&graph, 0),
        Err(ConfigError::BlockSize)
    ));
    assert!(matches!(
        StripeEngine::new(&graph, 0),
        Err(ConfigError::BlockSize)
    ));

    let pr = PageRank::new(SparseEngine::new(&graph), Config::default()).unwrap();
    assert_eq!(
        pr.with_scores(vec![1.0]).err(),
        Some(ConfigError::InitialScores {
            expected: 2,
            got: 1
        })
    );
}

#[test]
fn test_dense_too_large() {
    let n = DenseEngine::MAX_NODES + 1;
    let graph = Graph::from_arcs((1..=n).map(|v| (v, v % n + 1))).unwrap();
    assert!(matches!(
        DenseEngine::new(&graph),
        Err(ConfigError::DenseTooLarge { .. })
    ));
    let ranking = rank(&graph, EngineKind::Stripe, Config::default()).unwrap();
    assert!((ranking.scores[0] - 1.0 / n as f64).abs() < 1E-12);
}

#[test]
fn test_boxed_engine_name() {
    let graph = Graph::from_arcs([(1, 2), (2, 1)]).unwrap();
    for kind in EngineKind::ALL {
        let engine = kind.build(&graph, &Config::default()).unwrap();
        assert_eq!(engine.name(), kind.to_string());
        assert_eq!(engine.num_nodes(), 2);
    }
}
