mod id_allocator;

pub use id_allocator::IdAllocator;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the source segment an idea was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId(pub u32);

/// Key into the side table holding the supporting quotation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuotationId(pub u32);

impl ChunkId {
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl QuotationId {
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for QuotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A short extracted statement plus its provenance.
///
/// Ideas are created once at extraction time and never mutated; the
/// clustering engine only ever clones them into cluster member lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Idea {
    pub main_point: String,
    pub chunk_id: ChunkId,
    pub quotation_id: QuotationId,
}

impl Idea {
    pub fn new(main_point: impl Into<String>, chunk_id: ChunkId, quotation_id: QuotationId) -> Self {
        Self {
            main_point: main_point.into(),
            chunk_id,
            quotation_id,
        }
    }
}

impl fmt::Display for Idea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Main Point: {}, Chunk ID: {}, Quotation ID: {}",
            self.main_point, self.chunk_id, self.quotation_id
        )
    }
}
