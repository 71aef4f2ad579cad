//! Reader for the JSON ideas files the CLI consumes.
//!
//! An ideas file is a JSON array of records:
//!
//! ```json
//! [
//!   {"main_point": "Prices are sticky", "chunk_id": 1, "quotation_id": 4, "vector": [0.1, 0.2]},
//!   {"main_point": "Wages lag inflation", "vector": [0.3, 0.1]}
//! ]
//! ```
//!
//! Records without ids are numbered from an [`IdAllocator`], after every
//! explicit id in the file so allocated ids never collide with them.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{ErrorContext, IdeaMapError, IdeaMapResult};
use crate::types::{ChunkId, IdAllocator, Idea, QuotationId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaRecord {
    pub main_point: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotation_id: Option<u32>,
    pub vector: Vec<f32>,
}

/// Ideas and their embeddings, index-aligned.
#[derive(Debug, Clone, Default)]
pub struct IdeaSet {
    pub ideas: Vec<Idea>,
    pub vectors: Vec<Vec<f32>>,
}

impl IdeaSet {
    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }
}

pub fn load_ideas_file(path: &Path) -> IdeaMapResult<IdeaSet> {
    let contents = std::fs::read_to_string(path).read_context(path)?;
    let records: Vec<IdeaRecord> =
        serde_json::from_str(&contents).map_err(|e| IdeaMapError::InvalidIdeasFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let set = ideas_from_records(records).map_err(|reason| IdeaMapError::InvalidIdeasFile {
        path: path.to_path_buf(),
        reason,
    })?;

    debug!("Loaded {} ideas from {}", set.len(), path.display());
    Ok(set)
}

/// Converts records into ideas, allocating ids where they are missing.
///
/// Returns a human-readable reason on invalid input.
pub fn ideas_from_records(records: Vec<IdeaRecord>) -> Result<IdeaSet, String> {
    let next_free = |pick: fn(&IdeaRecord) -> Option<u32>| {
        records
            .iter()
            .filter_map(pick)
            .max()
            .map_or(Some(1), |max| max.checked_add(1))
    };

    // None once the id space is used up
    let chunk_ids = next_free(|r| r.chunk_id).and_then(IdAllocator::starting_at);
    let quotation_ids = next_free(|r| r.quotation_id).and_then(IdAllocator::starting_at);

    let mut set = IdeaSet::default();
    for (index, record) in records.into_iter().enumerate() {
        let chunk_id = match record.chunk_id {
            Some(raw) => ChunkId::new(raw)
                .ok_or_else(|| format!("record {index}: chunk_id must be positive"))?,
            None => chunk_ids
                .as_ref()
                .ok_or_else(|| format!("record {index}: chunk ids exhausted"))?
                .next_chunk_id()
                .map_err(|e| e.to_string())?,
        };
        let quotation_id = match record.quotation_id {
            Some(raw) => QuotationId::new(raw)
                .ok_or_else(|| format!("record {index}: quotation_id must be positive"))?,
            None => quotation_ids
                .as_ref()
                .ok_or_else(|| format!("record {index}: quotation ids exhausted"))?
                .next_quotation_id()
                .map_err(|e| e.to_string())?,
        };

        set.ideas
            .push(Idea::new(record.main_point, chunk_id, quotation_id));
        set.vectors.push(record.vector);
    }

    Ok(set)
}
