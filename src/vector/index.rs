//! In-memory cosine similarity index over embedded ideas.
//!
//! Brute-force search is fine at the scale of one document's ideas. The
//! index persists as a single versioned JSON file so `ideamap neighbors`
//! can reuse it across runs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::retrieve::{NeighborQuery, NeighborResult, RetrievalError};
use crate::types::Idea;
use crate::vector::{VectorDimension, VectorError, cosine_similarity};

/// Current on-disk format version.
const INDEX_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct IndexedIdea {
    idea: Idea,
    vector: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    dimension: usize,
    entries: Vec<IndexedIdea>,
}

/// Ideas and their embeddings, searchable by cosine similarity.
#[derive(Debug, Clone)]
pub struct MemoryIdeaIndex {
    dimension: VectorDimension,
    entries: Vec<IndexedIdea>,
}

impl MemoryIdeaIndex {
    pub fn new(dimension: VectorDimension) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    /// Builds an index from parallel idea and vector lists.
    ///
    /// The dimension is taken from the first vector.
    pub fn from_ideas(ideas: &[Idea], vectors: &[Vec<f32>]) -> Result<Self, VectorError> {
        if ideas.len() != vectors.len() {
            return Err(VectorError::CountMismatch {
                ideas: ideas.len(),
                vectors: vectors.len(),
            });
        }

        let dimension = VectorDimension::new(vectors.first().map_or(0, Vec::len))?;
        let mut index = Self::new(dimension);
        for (idea, vector) in ideas.iter().zip(vectors) {
            index.insert(idea.clone(), vector.clone())?;
        }

        Ok(index)
    }

    pub fn insert(&mut self, idea: Idea, vector: Vec<f32>) -> Result<(), VectorError> {
        self.dimension.validate_vector(&vector)?;
        self.entries.push(IndexedIdea { idea, vector });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    /// Returns up to `limit` ideas most similar to `query`, best first.
    ///
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], limit: usize) -> Result<Vec<NeighborResult>, VectorError> {
        self.dimension.validate_vector(query)?;

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.vector)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(i, score)| NeighborResult::from_idea(&self.entries[i].idea, score))
            .collect())
    }

    /// Writes the index as JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), VectorError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = IndexFile {
            version: INDEX_VERSION,
            dimension: self.dimension.get(),
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string(&file)
            .map_err(|e| VectorError::Serialization(e.to_string()))?;
        fs::write(path, json)?;

        debug!("Saved {} ideas to {}", self.entries.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, VectorError> {
        let contents = fs::read_to_string(path)?;
        let file: IndexFile = serde_json::from_str(&contents)
            .map_err(|e| VectorError::Serialization(e.to_string()))?;

        if file.version != INDEX_VERSION {
            return Err(VectorError::VersionMismatch {
                expected: INDEX_VERSION,
                actual: file.version,
            });
        }

        let mut index = Self::new(VectorDimension::new(file.dimension)?);
        for entry in file.entries {
            index.insert(entry.idea, entry.vector)?;
        }

        debug!("Loaded {} ideas from {}", index.len(), path.display());
        Ok(index)
    }
}

impl NeighborQuery for MemoryIdeaIndex {
    fn nearest(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<NeighborResult>, RetrievalError> {
        Ok(self.search(vector, limit)?)
    }
}
