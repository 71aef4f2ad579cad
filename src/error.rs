//! Error types for the idea clustering pipeline
//!
//! Each stage owns its error enum ([`ClusterError`], [`RetrievalError`],
//! [`VectorError`]); [`IdeaMapError`] wraps them for the CLI and adds the
//! file and configuration failures that only occur at the edges.

use std::path::PathBuf;
use thiserror::Error;

use crate::retrieve::RetrievalError;
use crate::vector::{ClusterError, VectorError};

/// Main error type for ideamap operations
#[derive(Error, Debug)]
pub enum IdeaMapError {
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Vector(#[from] VectorError),

    /// File system errors
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid ideas file '{path}': {reason}")]
    InvalidIdeasFile { path: PathBuf, reason: String },

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    #[error("Failed to allocate {kind} ID: maximum count reached")]
    IdExhausted { kind: &'static str },

    /// General errors for cases where we need to preserve existing behavior
    #[error("{0}")]
    General(String),
}

impl IdeaMapError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::Cluster(_) => "CLUSTER_CONTRACT_VIOLATION",
            Self::Retrieval(RetrievalError::Unavailable(_)) => "INDEX_UNAVAILABLE",
            Self::Retrieval(_) => "RETRIEVAL_ERROR",
            Self::Vector(VectorError::DimensionMismatch { .. }) => "DIMENSION_MISMATCH",
            Self::Vector(_) => "VECTOR_ERROR",
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::FileWrite { .. } => "FILE_WRITE_ERROR",
            Self::InvalidIdeasFile { .. } => "INVALID_IDEAS_FILE",
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::IdExhausted { .. } => "ID_EXHAUSTED",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// True when the caller broke an input contract, as opposed to an
    /// environmental failure.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::Cluster(_)
                | Self::Vector(VectorError::DimensionMismatch { .. })
                | Self::Vector(VectorError::CountMismatch { .. })
                | Self::InvalidIdeasFile { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Cluster(ClusterError::InvalidClusterCount(_)) => vec![
                "Pass -k with a value of at least 1",
                "Or set clustering.k in .ideamap/settings.toml",
            ],
            Self::Cluster(_) => vec![
                "Check that every idea has exactly one embedding vector",
                "Regenerate embeddings with a single model if dimensions differ",
            ],
            Self::Retrieval(_) => vec![
                "Rebuild the index with 'ideamap index'",
                "Use --skip-failures to keep results from the centroids that succeeded",
            ],
            Self::Vector(VectorError::VersionMismatch { .. }) => {
                vec!["Rebuild the index with 'ideamap index'"]
            }
            Self::FileRead { .. } => vec![
                "Check that the file exists and you have read permissions",
                "Ensure the file is not locked by another process",
            ],
            Self::InvalidIdeasFile { .. } => vec![
                "The ideas file must be a JSON array of {main_point, chunk_id, quotation_id, vector}",
                "chunk_id and quotation_id must be positive integers",
            ],
            Self::ConfigError { .. } => vec![
                "Run 'ideamap init --force' to regenerate the settings file",
                "Check IM_* environment variables for typos",
            ],
            _ => vec![],
        }
    }
}

/// Result type alias for ideamap operations
pub type IdeaMapResult<T> = Result<T, IdeaMapError>;

/// Helper trait for attaching a file path to I/O errors
pub trait ErrorContext<T> {
    /// Wrap a read failure with the offending path
    fn read_context(self, path: &std::path::Path) -> IdeaMapResult<T>;

    /// Wrap a write failure with the offending path
    fn write_context(self, path: &std::path::Path) -> IdeaMapResult<T>;
}

impl<T> ErrorContext<T> for Result<T, std::io::Error> {
    fn read_context(self, path: &std::path::Path) -> IdeaMapResult<T> {
        self.map_err(|source| IdeaMapError::FileRead {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_context(self, path: &std::path::Path) -> IdeaMapResult<T> {
        self.map_err(|source| IdeaMapError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}
