//! Partition of ideas into clusters.

use serde::Serialize;

use crate::types::Idea;

/// Mapping from cluster index (`0..k`) to the ideas assigned to it.
///
/// Member order inside a cluster follows the input order of the ideas.
/// Every idea handed to the clustering engine appears in exactly one
/// cluster; clusters may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterAssignment {
    clusters: Vec<Vec<Idea>>,
}

impl ClusterAssignment {
    /// Builds an assignment from per-idea cluster labels.
    ///
    /// `labels[i]` is the cluster index of `ideas[i]`; every label must be
    /// below `k`.
    pub(crate) fn from_labels(ideas: &[Idea], labels: &[usize], k: usize) -> Self {
        debug_assert_eq!(ideas.len(), labels.len());

        let mut clusters = vec![Vec::new(); k];
        for (idea, &label) in ideas.iter().zip(labels) {
            clusters[label].push(idea.clone());
        }

        Self { clusters }
    }

    /// Wraps pre-grouped member lists; list position is the cluster index.
    #[must_use]
    pub fn from_clusters(clusters: Vec<Vec<Idea>>) -> Self {
        Self { clusters }
    }

    /// Number of clusters, including empty ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Members of cluster `index`, or `None` if out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&[Idea]> {
        self.clusters.get(index).map(Vec::as_slice)
    }

    /// Iterates `(cluster_index, members)` in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Idea])> {
        self.clusters
            .iter()
            .enumerate()
            .map(|(index, members)| (index, members.as_slice()))
    }

    /// Member count per cluster.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        self.clusters.iter().map(Vec::len).collect()
    }

    /// Total number of ideas across all clusters.
    #[must_use]
    pub fn total_ideas(&self) -> usize {
        self.clusters.iter().map(Vec::len).sum()
    }

    /// Indices of clusters with no members.
    #[must_use]
    pub fn empty_clusters(&self) -> Vec<usize> {
        self.iter()
            .filter(|(_, members)| members.is_empty())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn into_inner(self) -> Vec<Vec<Idea>> {
        self.clusters
    }
}
