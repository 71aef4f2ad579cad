//! Nearest-neighbour retrieval for cluster centroids.
//!
//! The vector index is reached only through [`NeighborQuery`]. For each
//! centroid the index is queried independently and the per-centroid lists
//! are concatenated in centroid order. No deduplication or re-ranking
//! happens across centroids: the same idea may legitimately be a
//! neighbour of several centroids.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{ChunkId, Idea, QuotationId};
use crate::vector::VectorError;

/// One neighbour returned by the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborResult {
    pub main_point: String,
    pub quotation_id: QuotationId,
    pub chunk_id: ChunkId,
    /// Similarity reported by the index; higher is closer.
    pub similarity_score: f32,
}

impl NeighborResult {
    pub fn from_idea(idea: &Idea, similarity_score: f32) -> Self {
        Self {
            main_point: idea.main_point.clone(),
            quotation_id: idea.quotation_id,
            chunk_id: idea.chunk_id,
            similarity_score,
        }
    }
}

/// Errors raised while querying the vector index.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error(
        "Vector index unavailable: {0}\nSuggestion: Check that the index is reachable and has been built"
    )]
    Unavailable(String),

    #[error(
        "Query vector dimension mismatch: index expects {expected}, got {actual}\nSuggestion: Query with vectors from the model used to build the index"
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Neighbor query failed: {0}")]
    Query(String),

    #[error("Neighbor query for centroid {index} failed: {source}")]
    Centroid {
        index: usize,
        #[source]
        source: Box<RetrievalError>,
    },
}

impl From<VectorError> for RetrievalError {
    fn from(error: VectorError) -> Self {
        match error {
            VectorError::DimensionMismatch { expected, actual } => {
                Self::DimensionMismatch { expected, actual }
            }
            other => Self::Query(other.to_string()),
        }
    }
}

/// Read-only access to a vector similarity index.
///
/// Implementations return up to `limit` neighbours of `vector`, ordered by
/// descending similarity. Closures of the matching shape implement this
/// trait, so callers can wrap any index client inline.
pub trait NeighborQuery {
    fn nearest(&self, vector: &[f32], limit: usize)
    -> Result<Vec<NeighborResult>, RetrievalError>;
}

impl<F> NeighborQuery for F
where
    F: Fn(&[f32], usize) -> Result<Vec<NeighborResult>, RetrievalError>,
{
    fn nearest(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<NeighborResult>, RetrievalError> {
        self(vector, limit)
    }
}

/// What to do when one centroid's query fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop and return the first failure, in centroid order.
    #[default]
    Abort,
    /// Record the failure and keep the other centroids' results.
    Skip,
}

/// Neighbours found for a single centroid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentroidNeighbors {
    pub centroid_index: usize,
    pub neighbors: Vec<NeighborResult>,
}

/// Outcome of a multi-centroid retrieval.
#[derive(Debug, Default)]
pub struct RetrievalReport {
    /// Successful lookups in centroid order.
    pub groups: Vec<CentroidNeighbors>,
    /// Skipped centroids and why. Always empty under [`FailurePolicy::Abort`].
    pub failures: Vec<(usize, RetrievalError)>,
}

impl RetrievalReport {
    /// All neighbours, flattened in centroid order.
    pub fn neighbors(&self) -> impl Iterator<Item = &NeighborResult> {
        self.groups.iter().flat_map(|group| group.neighbors.iter())
    }

    pub fn into_neighbors(self) -> Vec<NeighborResult> {
        self.groups
            .into_iter()
            .flat_map(|group| group.neighbors)
            .collect()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.groups.iter().map(|group| group.neighbors.len()).sum()
    }

    /// True when no centroid was skipped.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Queries the index once per centroid and concatenates the results.
///
/// # Arguments
/// * `centroids` - Centroid vectors, e.g. from a clustering run
/// * `query` - Access to the vector index
/// * `limit` - Maximum neighbours per centroid
///
/// # Errors
/// The first failing centroid aborts the lookup; the error names its index.
pub fn nearest_per_centroid<Q>(
    centroids: &[Vec<f32>],
    query: &Q,
    limit: usize,
) -> Result<Vec<NeighborResult>, RetrievalError>
where
    Q: NeighborQuery + ?Sized,
{
    nearest_per_centroid_with(centroids, query, limit, FailurePolicy::Abort)
        .map(RetrievalReport::into_neighbors)
}

/// Sequential multi-centroid lookup under a caller-chosen failure policy.
pub fn nearest_per_centroid_with<Q>(
    centroids: &[Vec<f32>],
    query: &Q,
    limit: usize,
    policy: FailurePolicy,
) -> Result<RetrievalReport, RetrievalError>
where
    Q: NeighborQuery + ?Sized,
{
    let mut report = RetrievalReport::default();
    if limit == 0 {
        return Ok(report);
    }

    for (index, centroid) in centroids.iter().enumerate() {
        let result = query_centroid(query, index, centroid, limit);
        record(&mut report, index, result, policy)?;
    }

    Ok(report)
}

/// Like [`nearest_per_centroid_with`], but issues the per-centroid queries
/// concurrently on the rayon pool.
///
/// Results are merged back in centroid order whatever order the queries
/// complete in. Every query runs even under [`FailurePolicy::Abort`]; the
/// reported failure is the lowest failing centroid index.
pub fn nearest_per_centroid_concurrent<Q>(
    centroids: &[Vec<f32>],
    query: &Q,
    limit: usize,
    policy: FailurePolicy,
) -> Result<RetrievalReport, RetrievalError>
where
    Q: NeighborQuery + Sync + ?Sized,
{
    let mut report = RetrievalReport::default();
    if limit == 0 {
        return Ok(report);
    }

    let results: Vec<_> = centroids
        .par_iter()
        .enumerate()
        .map(|(index, centroid)| query_centroid(query, index, centroid, limit))
        .collect();

    for (index, result) in results.into_iter().enumerate() {
        record(&mut report, index, result, policy)?;
    }

    Ok(report)
}

/// Looks up the neighbours of a single embedded query, e.g. a free-text
/// prompt.
pub fn nearest_to_query<Q>(
    query: &Q,
    vector: &[f32],
    limit: usize,
) -> Result<Vec<NeighborResult>, RetrievalError>
where
    Q: NeighborQuery + ?Sized,
{
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut neighbors = query.nearest(vector, limit)?;
    neighbors.truncate(limit);
    debug!("Found {} neighbours for query vector", neighbors.len());
    Ok(neighbors)
}

fn query_centroid<Q>(
    query: &Q,
    index: usize,
    centroid: &[f32],
    limit: usize,
) -> Result<Vec<NeighborResult>, RetrievalError>
where
    Q: NeighborQuery + ?Sized,
{
    let mut neighbors = query.nearest(centroid, limit)?;
    // Hold the index to its contract so callers can rely on the bound
    neighbors.truncate(limit);
    debug!("Centroid {index}: {} neighbours", neighbors.len());
    Ok(neighbors)
}

fn record(
    report: &mut RetrievalReport,
    index: usize,
    result: Result<Vec<NeighborResult>, RetrievalError>,
    policy: FailurePolicy,
) -> Result<(), RetrievalError> {
    match result {
        Ok(neighbors) => {
            report.groups.push(CentroidNeighbors {
                centroid_index: index,
                neighbors,
            });
            Ok(())
        }
        Err(error) => match policy {
            FailurePolicy::Abort => Err(RetrievalError::Centroid {
                index,
                source: Box::new(error),
            }),
            FailurePolicy::Skip => {
                warn!("Skipping centroid {index}: {error}");
                report.failures.push((index, error));
                Ok(())
            }
        },
    }
}
