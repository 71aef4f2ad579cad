//! K-means clustering of idea embeddings.
//!
//! This module partitions ideas into `k` groups using Euclidean distance
//! over their embedding vectors, with K-means++ seeding followed by
//! Lloyd's alternating assign/update iterations.
//!
//! # Algorithm Details
//! - Distance metric: Euclidean (squared distance for comparisons)
//! - Initialization: K-means++ (distance-squared weighted sampling)
//! - Max iterations: 100 by default
//! - Convergence tolerance: 1e-4 on total centroid movement
//! - Ties: the lowest cluster index wins
//! - Empty clusters keep their previous centroid
//!
//! # Performance Characteristics
//! - O(n * k * d * iterations) time complexity
//! - O(k * d) space for centroids, plus one O(n) label vector
//! - Parallelizable assignment step (rayon), bit-identical to the
//!   sequential path
//!
//! Every run owns its centroid matrices. A new matrix is built in full
//! before it replaces the previous one, so the convergence check always
//! compares two complete states and no state leaks between runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::Idea;
use crate::vector::ClusterAssignment;

/// Maximum number of iterations for K-means clustering.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Convergence tolerance for centroid movement.
pub const DEFAULT_TOLERANCE: f32 = 1e-4;

/// Below this many vectors the assignment step stays on the calling thread.
pub const PARALLEL_ASSIGNMENT_THRESHOLD: usize = 256;

/// Caller contract violations, reported before any computation starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error(
        "Invalid cluster count: k must be >= 1, got {0}\nSuggestion: Request at least one cluster"
    )]
    InvalidClusterCount(usize),

    #[error(
        "Ideas and vectors length mismatch: {ideas} ideas, {vectors} vectors\nSuggestion: Provide exactly one embedding vector per idea, in the same order"
    )]
    LengthMismatch { ideas: usize, vectors: usize },

    #[error("Empty idea set provided for clustering\nSuggestion: Extract ideas before clustering")]
    EmptyInput,

    #[error(
        "Vector {index} has zero dimensions\nSuggestion: Check that embeddings were generated for every idea"
    )]
    ZeroDimension { index: usize },

    #[error(
        "Dimension mismatch at vector {index}: expected {expected}, got {actual}\nSuggestion: Ensure all vectors come from the same embedding model"
    )]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Vector {index} contains a NaN or infinite value\nSuggestion: Check the embedding provider output"
    )]
    NonFiniteValue { index: usize },
}

/// How a clustering run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceStatus {
    /// Total centroid movement dropped below the tolerance.
    Converged,
    /// The iteration cap was hit first. Informational, not an error.
    IterationCapReached,
}

/// Tuning knobs for a clustering run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansConfig {
    /// Upper bound on Lloyd iterations. At least one iteration always runs.
    pub max_iterations: usize,

    /// Stop once the Frobenius norm of the centroid change falls below this.
    pub tolerance: f32,

    /// Seed for the engine-owned PRNG. `None` draws from OS entropy.
    pub seed: Option<u64>,

    /// Run the assignment step on the rayon pool for large inputs.
    pub parallel: bool,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            seed: None,
            parallel: true,
        }
    }
}

impl KMeansConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Result of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringOutcome {
    /// Ideas grouped by the cluster they were last assigned to.
    pub assignment: ClusterAssignment,

    /// Cluster index per input idea, in input order.
    pub labels: Vec<usize>,

    /// Final centroids, one per cluster index `0..k`.
    pub centroids: Vec<Vec<f32>>,

    /// Number of Lloyd iterations actually run.
    pub iterations: usize,

    pub status: ConvergenceStatus,

    /// Sum of squared member-to-centroid distances after each update step.
    pub inertia_history: Vec<f64>,
}

impl ClusteringOutcome {
    #[must_use]
    pub fn converged(&self) -> bool {
        self.status == ConvergenceStatus::Converged
    }

    /// Number of clusters requested.
    #[must_use]
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Inertia of the final state.
    #[must_use]
    pub fn inertia(&self) -> Option<f64> {
        self.inertia_history.last().copied()
    }

    /// Cluster index of the idea at `position` in the input.
    #[must_use]
    pub fn cluster_of(&self, position: usize) -> Option<usize> {
        self.labels.get(position).copied()
    }
}

/// Clustering engine owning its configuration and random source.
///
/// Each call to [`ClusteringEngine::cluster`] is an independent run that
/// starts cold; only the PRNG stream advances between calls. Two engines
/// built from the same seeded config produce identical results on
/// identical input.
pub struct ClusteringEngine {
    config: KMeansConfig,
    rng: StdRng,
}

impl std::fmt::Debug for ClusteringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusteringEngine")
            .field("config", &self.config)
            .field("rng", &"<StdRng>")
            .finish()
    }
}

impl ClusteringEngine {
    #[must_use]
    pub fn new(config: KMeansConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng }
    }

    #[must_use]
    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    /// Partitions `ideas` into `k` clusters using their `vectors`.
    ///
    /// See [`kmeans_plus_plus_cluster`] for the contract.
    pub fn cluster(
        &mut self,
        ideas: &[Idea],
        vectors: &[Vec<f32>],
        k: usize,
    ) -> Result<ClusteringOutcome, ClusterError> {
        kmeans_plus_plus_cluster(ideas, vectors, k, &self.config, &mut self.rng)
    }
}

impl Default for ClusteringEngine {
    fn default() -> Self {
        Self::new(KMeansConfig::default())
    }
}

/// Clusters with default settings and an OS-seeded random source.
pub fn cluster(
    ideas: &[Idea],
    vectors: &[Vec<f32>],
    k: usize,
) -> Result<ClusteringOutcome, ClusterError> {
    ClusteringEngine::default().cluster(ideas, vectors, k)
}

/// Performs K-means++ seeded Lloyd clustering.
///
/// # Arguments
/// * `ideas` - Ideas to partition
/// * `vectors` - One embedding per idea, same order, same dimension
/// * `k` - Number of clusters (>= 1; may exceed the number of ideas)
/// * `config` - Iteration cap, tolerance and parallelism
/// * `rng` - Random source used for seeding only
///
/// # Errors
/// Contract violations ([`ClusterError`]) are reported before any
/// iteration. Non-convergence is not an error; inspect
/// [`ClusteringOutcome::status`].
#[must_use = "clustering results should be used or the computation is wasted"]
pub fn kmeans_plus_plus_cluster<R: Rng>(
    ideas: &[Idea],
    vectors: &[Vec<f32>],
    k: usize,
    config: &KMeansConfig,
    rng: &mut R,
) -> Result<ClusteringOutcome, ClusterError> {
    validate_inputs(ideas, vectors, k)?;

    let max_iterations = config.max_iterations.max(1);
    let tolerance = f64::from(config.tolerance);
    let parallel = config.parallel && vectors.len() >= PARALLEL_ASSIGNMENT_THRESHOLD;

    info!(
        "Clustering {} ideas into {} clusters (dimension {})",
        ideas.len(),
        k,
        vectors[0].len()
    );

    let mut centroids = initialize_centroids_kmeans_plus_plus(vectors, k, rng);
    let mut labels = Vec::new();
    let mut inertia_history = Vec::new();
    let mut status = ConvergenceStatus::IterationCapReached;
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;

        // Assignment step
        labels = assign_all(vectors, &centroids, parallel);

        // Update step: the previous matrix stays intact until the new one is complete
        let new_centroids = update_centroids(vectors, &labels, &centroids);
        let movement = calculate_centroid_movement(&centroids, &new_centroids);
        centroids = new_centroids;

        let inertia = compute_inertia(vectors, &labels, &centroids);
        inertia_history.push(inertia);
        debug!("Iteration {iterations}: centroid movement {movement:.6}, inertia {inertia:.6}");

        if movement < tolerance {
            status = ConvergenceStatus::Converged;
            break;
        }
    }

    match status {
        ConvergenceStatus::Converged => {
            info!("K-means converged after {iterations} iterations");
        }
        ConvergenceStatus::IterationCapReached => {
            warn!("K-means did not converge within {max_iterations} iterations");
        }
    }

    let assignment = ClusterAssignment::from_labels(ideas, &labels, k);
    for (index, members) in assignment.iter() {
        debug!("Cluster {index}: {} ideas", members.len());
    }

    Ok(ClusteringOutcome {
        assignment,
        labels,
        centroids,
        iterations,
        status,
        inertia_history,
    })
}

fn validate_inputs(ideas: &[Idea], vectors: &[Vec<f32>], k: usize) -> Result<(), ClusterError> {
    if k == 0 {
        return Err(ClusterError::InvalidClusterCount(k));
    }

    if ideas.len() != vectors.len() {
        return Err(ClusterError::LengthMismatch {
            ideas: ideas.len(),
            vectors: vectors.len(),
        });
    }

    if vectors.is_empty() {
        return Err(ClusterError::EmptyInput);
    }

    let dimension = vectors[0].len();
    if dimension == 0 {
        return Err(ClusterError::ZeroDimension { index: 0 });
    }

    for (index, vector) in vectors.iter().enumerate() {
        if vector.len() != dimension {
            return Err(ClusterError::DimensionMismatch {
                index,
                expected: dimension,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(ClusterError::NonFiniteValue { index });
        }
    }

    Ok(())
}

/// Initializes centroids using the K-means++ algorithm.
///
/// The first centroid is drawn uniformly; each further centroid is drawn
/// with probability proportional to the squared distance from a vector to
/// its nearest chosen centroid. If every weight is zero (all vectors sit
/// on chosen centroids, e.g. `k > n`) the draw falls back to uniform, so
/// exactly `k` centroids are always returned.
fn initialize_centroids_kmeans_plus_plus<R: Rng>(
    vectors: &[Vec<f32>],
    k: usize,
    rng: &mut R,
) -> Vec<Vec<f32>> {
    let n = vectors.len();
    let mut centroids: Vec<Vec<f32>> = Vec::with_capacity(k);

    let first_idx = rng.random_range(0..n);
    centroids.push(vectors[first_idx].clone());

    // Squared distance from each vector to its nearest chosen centroid
    let mut nearest: Vec<f64> = vectors
        .iter()
        .map(|v| squared_euclidean(v, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = nearest.iter().sum();

        let next_idx = if total > 0.0 && total.is_finite() {
            sample_proportional(&nearest, total, rng)
        } else {
            rng.random_range(0..n)
        };

        let chosen = vectors[next_idx].clone();
        for (distance, vector) in nearest.iter_mut().zip(vectors) {
            let candidate = squared_euclidean(vector, &chosen);
            if candidate < *distance {
                *distance = candidate;
            }
        }
        centroids.push(chosen);
    }

    centroids
}

/// Draws an index with probability `weights[i] / total`.
///
/// Zero-weight entries are never selected. `total` must be positive.
fn sample_proportional<R: Rng>(weights: &[f64], total: f64, rng: &mut R) -> usize {
    let target = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_positive = 0;

    for (i, &weight) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        last_positive = i;
        cumulative += weight;
        if cumulative > target {
            return i;
        }
    }

    // Rounding left the target just past the final bucket
    last_positive
}

fn assign_all(vectors: &[Vec<f32>], centroids: &[Vec<f32>], parallel: bool) -> Vec<usize> {
    if parallel {
        vectors
            .par_iter()
            .map(|vector| assign_to_nearest_centroid(vector, centroids))
            .collect()
    } else {
        vectors
            .iter()
            .map(|vector| assign_to_nearest_centroid(vector, centroids))
            .collect()
    }
}

/// Returns the index of the centroid closest to `vector`.
///
/// Exact ties resolve to the lowest index.
pub fn assign_to_nearest_centroid(vector: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best_distance = f64::INFINITY;
    let mut best_cluster = 0;

    for (i, centroid) in centroids.iter().enumerate() {
        let distance = squared_euclidean(vector, centroid);
        if distance < best_distance {
            best_distance = distance;
            best_cluster = i;
        }
    }

    best_cluster
}

/// Builds the next centroid matrix from the current labels.
///
/// Non-empty clusters move to the coordinate-wise mean of their members;
/// empty clusters carry their previous centroid over unchanged.
fn update_centroids(vectors: &[Vec<f32>], labels: &[usize], previous: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let k = previous.len();
    let dimension = previous[0].len();
    let mut sums = vec![vec![0.0f64; dimension]; k];
    let mut cluster_sizes = vec![0usize; k];

    for (vector, &label) in vectors.iter().zip(labels) {
        for (sum, &value) in sums[label].iter_mut().zip(vector) {
            *sum += f64::from(value);
        }
        cluster_sizes[label] += 1;
    }

    sums.into_iter()
        .zip(cluster_sizes)
        .zip(previous)
        .map(|((sum, size), old)| {
            if size == 0 {
                old.clone()
            } else {
                let size = size as f64;
                sum.into_iter().map(|s| (s / size) as f32).collect()
            }
        })
        .collect()
}

/// Frobenius norm of the difference between two centroid matrices.
fn calculate_centroid_movement(old: &[Vec<f32>], new: &[Vec<f32>]) -> f64 {
    old.iter()
        .zip(new)
        .map(|(old_c, new_c)| squared_euclidean(old_c, new_c))
        .sum::<f64>()
        .sqrt()
}

/// Sum of squared distances from each vector to its assigned centroid.
pub fn compute_inertia(vectors: &[Vec<f32>], labels: &[usize], centroids: &[Vec<f32>]) -> f64 {
    vectors
        .iter()
        .zip(labels)
        .map(|(vector, &label)| squared_euclidean(vector, &centroids[label]))
        .sum()
}

/// Squared Euclidean distance, accumulated in f64.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum()
}

/// Euclidean distance between two vectors.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Computes cosine similarity between two vectors.
///
/// # Returns
/// * Cosine similarity in range [-1, 1], where 1 is most similar; 0 when
///   either vector has zero length
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
