//! Semantic clustering of extracted ideas.
//!
//! Ideas (short statements with provenance) are grouped with k-means++
//! seeded Lloyd iterations over their embeddings, summarized as text
//! blocks, and each cluster centroid can be mapped back to its nearest
//! ideas through a vector index.

pub mod config;
pub mod display;
pub mod error;
pub mod io;
pub mod retrieve;
pub mod summary;
pub mod types;
pub mod vector;

// Explicit exports for better API clarity
pub use config::Settings;
pub use error::{IdeaMapError, IdeaMapResult};
pub use retrieve::{
    FailurePolicy, NeighborQuery, NeighborResult, RetrievalError, RetrievalReport,
    nearest_per_centroid, nearest_per_centroid_concurrent, nearest_per_centroid_with,
    nearest_to_query,
};
pub use summary::{render_summaries, summarize, summarize_cluster};
pub use types::{ChunkId, IdAllocator, Idea, QuotationId};
pub use vector::{
    ClusterAssignment, ClusterError, ClusteringEngine, ClusteringOutcome, ConvergenceStatus,
    KMeansConfig, MemoryIdeaIndex, cluster,
};
