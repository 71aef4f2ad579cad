//! Configuration module for ideamap.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.ideamap/settings.toml`)
//! - Environment variable overrides
//! - CLI argument overrides (applied by the binary after loading)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `IM_` and use double underscores
//! to separate nested levels:
//! - `IM_CLUSTERING__K=12` sets `clustering.k`
//! - `IM_CLUSTERING__SEED=42` sets `clustering.seed`
//! - `IM_RETRIEVAL__SKIP_FAILURES=true` sets `retrieval.skip_failures`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ErrorContext, IdeaMapError, IdeaMapResult};
use crate::vector::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, KMeansConfig};

/// Directory holding the settings file, relative to the workspace root.
pub const CONFIG_DIR: &str = ".ideamap";

const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub clustering: ClusteringConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClusteringConfig {
    /// Number of clusters
    #[serde(default = "default_k")]
    pub k: usize,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Convergence tolerance on total centroid movement
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,

    /// Fixed seed for reproducible runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Parallel assignment for large inputs
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Size of the rayon pool used for parallel assignment
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RetrievalConfig {
    /// Neighbours returned per centroid
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Keep going when a single centroid's lookup fails
    #[serde(default)]
    pub skip_failures: bool,

    /// Query centroids concurrently
    #[serde(default)]
    pub parallel: bool,
}

fn default_version() -> u32 {
    1
}
fn default_k() -> usize {
    8
}
fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}
fn default_tolerance() -> f32 {
    DEFAULT_TOLERANCE
}
fn default_true() -> bool {
    true
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_limit() -> usize {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            clustering: ClusteringConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            seed: None,
            parallel: true,
            parallel_threads: default_parallel_threads(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            skip_failures: false,
            parallel: false,
        }
    }
}

impl ClusteringConfig {
    /// Engine configuration derived from these settings.
    pub fn to_kmeans_config(&self) -> KMeansConfig {
        let config = KMeansConfig::default()
            .with_max_iterations(self.max_iterations)
            .with_tolerance(self.tolerance)
            .with_parallel(self.parallel);

        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .ideamap directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honouring `IM_` overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nesting; single underscores stay in field names
            .merge(Env::prefixed("IM_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find the settings file by looking for a .ideamap directory,
    /// searching from the current directory up to the filesystem root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join(CONFIG_FILE))
    }

    /// Reject settings that are malformed as configuration.
    ///
    /// The cluster count is left to the engine, which reports `k = 0` as a
    /// contract violation.
    pub fn validate(&self) -> IdeaMapResult<()> {
        if !self.clustering.tolerance.is_finite() || self.clustering.tolerance < 0.0 {
            return Err(IdeaMapError::ConfigError {
                reason: format!(
                    "clustering.tolerance must be a non-negative number, got {}",
                    self.clustering.tolerance
                ),
            });
        }
        if self.clustering.parallel_threads == 0 {
            return Err(IdeaMapError::ConfigError {
                reason: "clustering.parallel_threads must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> IdeaMapResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).write_context(parent)?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| IdeaMapError::ConfigError {
            reason: format!("Failed to serialize settings: {e}"),
        })?;
        std::fs::write(path, toml_string).write_context(path)
    }

    /// Create a default settings file in the current directory
    pub fn init_config_file(force: bool) -> IdeaMapResult<PathBuf> {
        let current_dir = std::env::current_dir().map_err(|e| IdeaMapError::ConfigError {
            reason: format!("Cannot determine current directory: {e}"),
        })?;
        Self::init_config_file_in(&current_dir, force)
    }

    /// Create a commented settings file under `root/.ideamap/`
    pub fn init_config_file_in(root: &Path, force: bool) -> IdeaMapResult<PathBuf> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err(IdeaMapError::ConfigError {
                reason: "Configuration file already exists. Use --force to overwrite".to_string(),
            });
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).write_context(parent)?;
        }

        let template = format!(
            r#"# ideamap configuration

# Version of the configuration schema
version = 1

# Global debug mode
debug = false

[clustering]
# Number of clusters to form
k = {k}

# Lloyd iteration cap and convergence tolerance
max_iterations = {max_iterations}
tolerance = {tolerance}

# Fixed seed for reproducible clusters (omit for a random seed per run)
# seed = 42

# Parallel assignment step for inputs of {threshold} or more ideas
parallel = true
# parallel_threads = {threads}

[retrieval]
# Neighbours returned per centroid
limit = {limit}

# Keep results from other centroids when one lookup fails
skip_failures = false

# Query centroids concurrently
parallel = false
"#,
            k = default_k(),
            max_iterations = DEFAULT_MAX_ITERATIONS,
            tolerance = DEFAULT_TOLERANCE,
            threshold = crate::vector::PARALLEL_ASSIGNMENT_THRESHOLD,
            threads = default_parallel_threads(),
            limit = default_limit(),
        );

        std::fs::write(&config_path, template).write_context(&config_path)?;
        Ok(config_path)
    }
}
