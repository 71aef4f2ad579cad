//! Behavioural properties of the clustering engine on synthetic data.

use crate::common::{blobs, idea, numbered_ideas, random_vectors};
use ideamap::vector::{
    ClusterError, ClusteringEngine, ConvergenceStatus, KMeansConfig, compute_inertia,
};
use std::collections::HashSet;

fn seeded(seed: u64) -> ClusteringEngine {
    ClusteringEngine::new(KMeansConfig::default().with_seed(seed))
}

#[test]
fn every_idea_lands_in_exactly_one_cluster() {
    let vectors = random_vectors(40, 5, 11);
    let ideas = numbered_ideas(40);

    for k in [1, 2, 5, 13, 40, 55] {
        let outcome = seeded(k as u64).cluster(&ideas, &vectors, k).unwrap();

        assert_eq!(outcome.assignment.len(), k);
        assert_eq!(outcome.assignment.total_ideas(), ideas.len());

        let mut seen = HashSet::new();
        for (_, members) in outcome.assignment.iter() {
            for member in members {
                assert!(seen.insert(member.quotation_id), "duplicate {member}");
            }
        }
        assert_eq!(seen.len(), ideas.len());

        // Labels agree with the grouped view
        for (i, idea) in ideas.iter().enumerate() {
            let label = outcome.cluster_of(i).unwrap();
            assert!(outcome.assignment.get(label).unwrap().contains(idea));
        }
        assert!(outcome.cluster_of(ideas.len()).is_none());
    }
}

#[test]
fn returns_k_centroids_of_input_dimension() {
    let vectors = random_vectors(25, 7, 3);
    let ideas = numbered_ideas(25);

    let outcome = seeded(1).cluster(&ideas, &vectors, 6).unwrap();

    assert_eq!(outcome.k(), 6);
    assert!(outcome.centroids.iter().all(|c| c.len() == 7));
}

#[test]
fn k_equal_to_n_gives_singletons() {
    let vectors = random_vectors(12, 3, 21);
    let ideas = numbered_ideas(12);

    for seed in 0..10 {
        let outcome = seeded(seed).cluster(&ideas, &vectors, 12).unwrap();
        assert_eq!(outcome.assignment.sizes(), vec![1; 12]);
        assert!(outcome.converged());
    }
}

#[test]
fn same_seed_same_outcome() {
    let vectors = random_vectors(300, 8, 5);
    let ideas = numbered_ideas(300);

    let first = seeded(42).cluster(&ideas, &vectors, 7).unwrap();
    let second = seeded(42).cluster(&ideas, &vectors, 7).unwrap();

    assert_eq!(first, second);
}

#[test]
fn repeated_runs_on_one_engine_do_not_share_state() {
    let vectors = random_vectors(60, 4, 8);
    let ideas = numbered_ideas(60);

    let mut engine = seeded(17);
    let first = engine.cluster(&ideas, &vectors, 4).unwrap();
    let second = engine.cluster(&ideas, &vectors, 4).unwrap();

    // Each run starts cold: both satisfy the contract on their own
    for outcome in [&first, &second] {
        assert_eq!(outcome.k(), 4);
        assert_eq!(outcome.assignment.total_ideas(), 60);
        assert_eq!(outcome.iterations, outcome.inertia_history.len());
    }
}

#[test]
fn inertia_never_increases() {
    let centers = vec![vec![0.0, 0.0], vec![3.0, 3.0], vec![0.0, 4.0], vec![5.0, 0.0]];
    let vectors = blobs(&centers, 30, 2.0, 99);
    let ideas = numbered_ideas(vectors.len());

    for seed in 0..20 {
        let outcome = seeded(seed).cluster(&ideas, &vectors, 4).unwrap();

        for pair in outcome.inertia_history.windows(2) {
            assert!(
                pair[1] <= pair[0] * (1.0 + 1e-9) + 1e-9,
                "inertia rose from {} to {} (seed {seed})",
                pair[0],
                pair[1]
            );
        }

        let recomputed = compute_inertia(&vectors, &outcome.labels, &outcome.centroids);
        assert!((recomputed - outcome.inertia().unwrap()).abs() < 1e-6);
    }
}

#[test]
fn well_separated_groups_are_recovered() {
    let ideas = vec![
        idea("a1", 1),
        idea("a2", 2),
        idea("a3", 3),
        idea("b1", 4),
        idea("b2", 5),
        idea("b3", 6),
    ];
    let vectors = vec![
        vec![0.0, 0.0],
        vec![0.1, 0.0],
        vec![0.0, 0.1],
        vec![100.0, 100.0],
        vec![100.1, 100.0],
        vec![100.0, 100.1],
    ];

    for seed in 0..100 {
        let outcome = seeded(seed).cluster(&ideas, &vectors, 2).unwrap();

        let mut sizes = outcome.assignment.sizes();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![3, 3], "seed {seed}");

        // Members of each group share a label
        assert!(outcome.labels[..3].iter().all(|&l| l == outcome.labels[0]));
        assert!(outcome.labels[3..].iter().all(|&l| l == outcome.labels[3]));
        assert_ne!(outcome.labels[0], outcome.labels[3]);
    }
}

#[test]
fn more_clusters_than_ideas_is_not_an_error() {
    let ideas = numbered_ideas(3);
    let vectors = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];

    let outcome = seeded(4).cluster(&ideas, &vectors, 7).unwrap();

    assert_eq!(outcome.k(), 7);
    assert_eq!(outcome.assignment.total_ideas(), 3);
    assert!(outcome.assignment.empty_clusters().len() >= 4);
}

#[test]
fn single_cluster_is_the_mean() {
    let ideas = numbered_ideas(4);
    let vectors = vec![
        vec![0.0, 0.0],
        vec![2.0, 0.0],
        vec![0.0, 2.0],
        vec![2.0, 2.0],
    ];

    let outcome = seeded(0).cluster(&ideas, &vectors, 1).unwrap();

    assert_eq!(outcome.assignment.sizes(), vec![4]);
    assert_eq!(outcome.centroids[0], vec![1.0, 1.0]);
    assert!(outcome.labels.iter().all(|&l| l == 0));
}

#[test]
fn iteration_cap_is_reported_not_raised() {
    let vectors = random_vectors(80, 3, 2);
    let ideas = numbered_ideas(80);
    let config = KMeansConfig::default()
        .with_seed(3)
        .with_max_iterations(1)
        .with_tolerance(0.0);

    let outcome = ClusteringEngine::new(config)
        .cluster(&ideas, &vectors, 5)
        .unwrap();

    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.status, ConvergenceStatus::IterationCapReached);
    assert_eq!(outcome.assignment.total_ideas(), 80);
}

#[test]
fn contract_violations_fail_fast() {
    let ideas = numbered_ideas(2);
    let vectors = vec![vec![0.0, 1.0], vec![1.0, 0.0]];

    assert_eq!(
        seeded(0).cluster(&ideas, &vectors, 0).unwrap_err(),
        ClusterError::InvalidClusterCount(0)
    );
    assert_eq!(
        seeded(0).cluster(&ideas, &vectors[..1], 1).unwrap_err(),
        ClusterError::LengthMismatch {
            ideas: 2,
            vectors: 1
        }
    );
    assert_eq!(
        seeded(0)
            .cluster(&ideas, &[vec![0.0, 1.0], vec![1.0]], 1)
            .unwrap_err(),
        ClusterError::DimensionMismatch {
            index: 1,
            expected: 2,
            actual: 1
        }
    );
    assert_eq!(
        seeded(0).cluster(&[], &[], 2).unwrap_err(),
        ClusterError::EmptyInput
    );
    assert_eq!(
        seeded(0)
            .cluster(&ideas, &[vec![0.0, f32::NAN], vec![1.0, 0.0]], 1)
            .unwrap_err(),
        ClusterError::NonFiniteValue { index: 0 }
    );
}

#[test]
fn large_inputs_match_across_parallel_setting() {
    let centers = vec![vec![0.0; 16], vec![1.0; 16], vec![-1.0; 16]];
    let vectors = blobs(&centers, 200, 0.3, 7);
    let ideas = numbered_ideas(vectors.len());

    let parallel = ClusteringEngine::new(KMeansConfig::default().with_seed(12))
        .cluster(&ideas, &vectors, 3)
        .unwrap();
    let sequential =
        ClusteringEngine::new(KMeansConfig::default().with_seed(12).with_parallel(false))
            .cluster(&ideas, &vectors, 3)
            .unwrap();

    assert_eq!(parallel, sequential);
}
