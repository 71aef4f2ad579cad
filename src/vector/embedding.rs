//! Embedding provider seam.
//!
//! Ideas are embedded by an external sentence model (all-MiniLM-L6-v2 in
//! production, 384 dimensions). The clustering engine never calls a model
//! itself; callers embed up front and hand vectors in. This module defines
//! the trait such backends implement and the batch helper that checks their
//! output before it reaches the engine.

use tracing::debug;

use crate::types::Idea;
use crate::vector::{VectorDimension, VectorError};

/// Generates embeddings from text.
///
/// Implementations should be thread-safe and handle batches efficiently.
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds each text, returning one vector per input in input order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError>;

    /// Dimension of every vector this provider produces.
    #[must_use]
    fn dimension(&self) -> VectorDimension;
}

/// Embeds the main point of every idea.
///
/// # Errors
/// Fails if the provider fails, returns the wrong number of vectors, or
/// returns a vector of the wrong dimension.
pub fn embed_ideas<P>(provider: &P, ideas: &[Idea]) -> Result<Vec<Vec<f32>>, VectorError>
where
    P: EmbeddingProvider + ?Sized,
{
    if ideas.is_empty() {
        return Ok(Vec::new());
    }

    let texts: Vec<&str> = ideas.iter().map(|idea| idea.main_point.as_str()).collect();
    let vectors = provider.embed(&texts)?;

    if vectors.len() != ideas.len() {
        return Err(VectorError::CountMismatch {
            ideas: ideas.len(),
            vectors: vectors.len(),
        });
    }

    let dimension = provider.dimension();
    for vector in &vectors {
        dimension.validate_vector(vector)?;
    }

    debug!("Embedded {} ideas at dimension {}", ideas.len(), dimension.get());
    Ok(vectors)
}

/// Deterministic provider for tests: keyword buckets on a constant base,
/// normalized to unit length.
#[cfg(test)]
pub struct MockEmbeddingProvider {
    dimension: VectorDimension,
}

#[cfg(test)]
impl MockEmbeddingProvider {
    #[must_use]
    pub fn with_dimension(dimension: VectorDimension) -> Self {
        Self { dimension }
    }
}

#[cfg(test)]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        let dim = self.dimension.get();
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            let mut embedding = vec![0.1; dim];

            if text.contains("price") && dim > 1 {
                embedding[0] = 0.9;
                embedding[1] = 0.8;
            }
            if text.contains("labor") && dim > 3 {
                embedding[2] = 0.85;
                embedding[3] = 0.75;
            }

            let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            for val in &mut embedding {
                *val /= magnitude;
            }

            embeddings.push(embedding);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }
}
