use ideamap::{ChunkId, Idea, QuotationId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Scratch directory for files a test writes.
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

pub fn idea(text: &str, quotation: u32) -> Idea {
    Idea::new(text, ChunkId(1), QuotationId(quotation))
}

/// Ideas named `idea-0`, `idea-1`, ... with one quotation each.
pub fn numbered_ideas(count: usize) -> Vec<Idea> {
    (0..count)
        .map(|i| idea(&format!("idea-{i}"), i as u32 + 1))
        .collect()
}

/// Gaussian-ish blobs: `per_blob` points jittered around each center.
pub fn blobs(centers: &[Vec<f32>], per_blob: usize, spread: f32, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut vectors = Vec::with_capacity(centers.len() * per_blob);

    for center in centers {
        for _ in 0..per_blob {
            vectors.push(
                center
                    .iter()
                    .map(|c| c + rng.random_range(-spread..spread))
                    .collect(),
            );
        }
    }

    vectors
}

/// Uniform random vectors in the unit cube.
pub fn random_vectors(count: usize, dimension: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..dimension).map(|_| rng.random::<f32>()).collect())
        .collect()
}

/// Serializes ideas and vectors in the CLI's ideas-file shape.
pub fn ideas_file_json(ideas: &[Idea], vectors: &[Vec<f32>]) -> String {
    let records: Vec<serde_json::Value> = ideas
        .iter()
        .zip(vectors)
        .map(|(idea, vector)| {
            serde_json::json!({
                "main_point": idea.main_point,
                "chunk_id": idea.chunk_id.value(),
                "quotation_id": idea.quotation_id.value(),
                "vector": vector,
            })
        })
        .collect();
    serde_json::to_string(&records).expect("Failed to serialize ideas")
}
