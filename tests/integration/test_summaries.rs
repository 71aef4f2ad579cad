//! Summaries rendered from real clustering runs.

use crate::common::{idea, numbered_ideas, random_vectors};
use ideamap::vector::{ClusterAssignment, ClusteringEngine, KMeansConfig};
use ideamap::{render_summaries, summarize};

#[test]
fn empty_and_populated_clusters() {
    let assignment = ClusterAssignment::from_clusters(vec![
        vec![],
        vec![idea("Rents rise with demand", 1), idea("Zoning limits supply", 2)],
    ]);

    let summaries = summarize(&assignment);

    assert_eq!(summaries[&0], "Cluster 0 (0 ideas):\n");
    assert_eq!(
        summaries[&1],
        "Cluster 1 (2 ideas):\n- Rents rise with demand\n- Zoning limits supply"
    );
}

#[test]
fn one_block_per_cluster_in_member_order() {
    let vectors = random_vectors(30, 4, 6);
    let ideas = numbered_ideas(30);
    let outcome = ClusteringEngine::new(KMeansConfig::default().with_seed(2))
        .cluster(&ideas, &vectors, 5)
        .unwrap();

    let summaries = summarize(&outcome.assignment);
    assert_eq!(summaries.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);

    for (index, members) in outcome.assignment.iter() {
        let block = &summaries[&index];
        let mut lines = block.lines();

        assert_eq!(
            lines.next().unwrap(),
            format!("Cluster {index} ({} ideas):", members.len())
        );
        let bullets: Vec<&str> = lines.collect();
        let expected: Vec<String> = members
            .iter()
            .map(|m| format!("- {}", m.main_point))
            .collect();
        assert_eq!(bullets, expected);
    }

    // Members keep input order, so idea numbers ascend within each block
    for (_, members) in outcome.assignment.iter() {
        let ids: Vec<u32> = members.iter().map(|m| m.quotation_id.value()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn rendered_output_separates_blocks() {
    let assignment =
        ClusterAssignment::from_clusters(vec![vec![idea("a", 1)], vec![idea("b", 2)]]);

    let rendered = render_summaries(&summarize(&assignment));

    assert_eq!(rendered, "Cluster 0 (1 ideas):\n- a\n\nCluster 1 (1 ideas):\n- b");
}
