//! Vector clustering and similarity search over embedded ideas.
//!
//! The clustering engine partitions idea embeddings with k-means++ seeding
//! followed by Lloyd iterations. Everything here is synchronous and keeps
//! no global state: randomness is always an explicit, seedable generator.

mod assignment;
mod clustering;
mod embedding;
mod index;
mod types;

pub use assignment::ClusterAssignment;
pub use clustering::{
    ClusterError, ClusteringEngine, ClusteringOutcome, ConvergenceStatus, DEFAULT_MAX_ITERATIONS,
    DEFAULT_TOLERANCE, KMeansConfig, PARALLEL_ASSIGNMENT_THRESHOLD, assign_to_nearest_centroid,
    cluster, compute_inertia, cosine_similarity, euclidean_distance, kmeans_plus_plus_cluster,
    squared_euclidean,
};
#[cfg(test)]
pub use embedding::MockEmbeddingProvider;
pub use embedding::{EmbeddingProvider, embed_ideas};
pub use index::MemoryIdeaIndex;
pub use types::{VECTOR_DIMENSION_384, VectorDimension, VectorError};
