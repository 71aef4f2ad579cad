//! Monotonic allocator for chunk and quotation identifiers.
//!
//! Identifiers are minted from an explicit allocator object that callers
//! pass by reference. Two allocators never share state, so concurrent
//! extraction runs cannot interfere with each other's numbering.

use std::sync::atomic::{AtomicU32, Ordering};

use super::{ChunkId, QuotationId};
use crate::error::{IdeaMapError, IdeaMapResult};

/// Thread-safe counter handing out strictly increasing, non-zero ids.
///
/// This type ensures that:
/// - Ids start at 1 (never 0)
/// - Each call returns a value greater than every earlier one
/// - Exhaustion is reported as an error instead of wrapping around
#[derive(Debug)]
pub struct IdAllocator {
    next_id: AtomicU32,
}

impl IdAllocator {
    /// Creates a new allocator starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
        }
    }

    /// Creates an allocator whose first id is `start_from`.
    ///
    /// Returns `None` if `start_from` is 0.
    #[must_use]
    pub fn starting_at(start_from: u32) -> Option<Self> {
        (start_from != 0).then(|| Self {
            next_id: AtomicU32::new(start_from),
        })
    }

    /// Allocates the next raw id.
    ///
    /// `u32::MAX` is the exhaustion sentinel and is never handed out.
    pub fn next_raw(&self) -> Option<u32> {
        self.next_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_add(1)
            })
            .ok()
    }

    /// Allocates the next chunk id.
    pub fn next_chunk_id(&self) -> IdeaMapResult<ChunkId> {
        self.next_raw()
            .and_then(ChunkId::new)
            .ok_or(IdeaMapError::IdExhausted { kind: "chunk" })
    }

    /// Allocates the next quotation id.
    pub fn next_quotation_id(&self) -> IdeaMapResult<QuotationId> {
        self.next_raw()
            .and_then(QuotationId::new)
            .ok_or(IdeaMapError::IdExhausted { kind: "quotation" })
    }

    /// Returns the id the next allocation would produce.
    #[must_use]
    pub fn peek(&self) -> u32 {
        self.next_id.load(Ordering::Relaxed)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
