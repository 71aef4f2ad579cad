//! Cluster, then look up each centroid's neighbours in an index.

use crate::common::{TestProject, blobs, idea, numbered_ideas};
use ideamap::retrieve::{
    FailurePolicy, NeighborResult, RetrievalError, nearest_per_centroid,
    nearest_per_centroid_concurrent, nearest_per_centroid_with, nearest_to_query,
};
use ideamap::vector::{ClusteringEngine, KMeansConfig, MemoryIdeaIndex};

#[test]
fn two_centroids_limit_three() {
    let ideas = vec![
        idea("north", 1),
        idea("north by east", 2),
        idea("east", 3),
        idea("south", 4),
    ];
    let vectors = vec![
        vec![0.0, 1.0],
        vec![0.2, 1.0],
        vec![1.0, 0.0],
        vec![0.0, -1.0],
    ];
    let index = MemoryIdeaIndex::from_ideas(&ideas, &vectors).unwrap();
    let centroids = vec![vec![0.1, 1.0], vec![1.0, 0.1]];

    let results = nearest_per_centroid(&centroids, &index, 3).unwrap();

    assert!(results.len() <= 6);
    assert_eq!(results.len(), 6);
    // First centroid's block comes first and is ordered by similarity
    assert_eq!(results[0].main_point, "north by east");
    assert_eq!(results[3].main_point, "east");
    // The same idea may show up under both centroids
    let north_by_east = results
        .iter()
        .filter(|r| r.main_point == "north by east")
        .count();
    assert_eq!(north_by_east, 2);
}

#[test]
fn centroids_from_clustering_find_their_own_members() {
    let centers = vec![vec![5.0, 0.0, 0.0], vec![0.0, 5.0, 0.0], vec![0.0, 0.0, 5.0]];
    let vectors = blobs(&centers, 10, 0.5, 3);
    let ideas = numbered_ideas(vectors.len());

    let outcome = ClusteringEngine::new(KMeansConfig::default().with_seed(8))
        .cluster(&ideas, &vectors, 3)
        .unwrap();
    let index = MemoryIdeaIndex::from_ideas(&ideas, &vectors).unwrap();

    let report =
        nearest_per_centroid_with(&outcome.centroids, &index, 2, FailurePolicy::Abort).unwrap();

    assert!(report.is_complete());
    assert_eq!(report.groups.len(), 3);
    for group in &report.groups {
        let members = outcome.assignment.get(group.centroid_index).unwrap();
        for neighbor in &group.neighbors {
            assert!(
                members.iter().any(|m| m.quotation_id == neighbor.quotation_id),
                "{} is not a member of cluster {}",
                neighbor.main_point,
                group.centroid_index
            );
        }
    }
}

#[test]
fn skip_policy_over_a_flaky_backend() {
    let index = MemoryIdeaIndex::from_ideas(
        &[idea("left", 1), idea("right", 2)],
        &[vec![-1.0, 0.0], vec![1.0, 0.0]],
    )
    .unwrap();
    let flaky = |vector: &[f32], limit: usize| -> Result<Vec<NeighborResult>, RetrievalError> {
        if vector[1] > 0.0 {
            return Err(RetrievalError::Unavailable("shard offline".to_string()));
        }
        Ok(index.search(vector, limit)?)
    };
    let centroids = vec![vec![-1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]];

    let report = nearest_per_centroid_concurrent(&centroids, &flaky, 1, FailurePolicy::Skip)
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, 1);
    let points: Vec<&str> = report.neighbors().map(|n| n.main_point.as_str()).collect();
    assert_eq!(points, vec!["left", "right"]);

    let aborted = nearest_per_centroid(&centroids, &flaky, 1).unwrap_err();
    assert!(aborted.to_string().contains("centroid 1"));
}

#[test]
fn saved_index_answers_queries() {
    let project = TestProject::new();
    let path = project.path().join("index.json");
    let ideas = numbered_ideas(3);
    let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]];

    MemoryIdeaIndex::from_ideas(&ideas, &vectors)
        .unwrap()
        .save(&path)
        .unwrap();
    let index = MemoryIdeaIndex::load(&path).unwrap();

    let results = nearest_to_query(&index, &[0.0, 1.0], 2).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].main_point, "idea-1");
    assert_eq!(results[1].main_point, "idea-2");

    assert!(nearest_to_query(&index, &[0.0, 1.0], 0).unwrap().is_empty());
}

#[test]
fn dimension_mismatch_surfaces_as_retrieval_error() {
    let index = MemoryIdeaIndex::from_ideas(&numbered_ideas(1), &[vec![1.0, 0.0]]).unwrap();

    let err = nearest_per_centroid(&[vec![1.0, 0.0, 0.0]], &index, 1).unwrap_err();
    match err {
        RetrievalError::Centroid { index, source } => {
            assert_eq!(index, 0);
            assert!(matches!(
                *source,
                RetrievalError::DimensionMismatch {
                    expected: 2,
                    actual: 3
                }
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
