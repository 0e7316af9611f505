//! Engine configuration.
//!
//! Tunables for scanning and duplicate detection, loadable from an optional
//! TOML file and overridable from the CLI. Settings/preset persistence is a
//! front-end concern; the engine only reads configuration, it never writes it.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default advisory size limit: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default minimum block length (in lines) for the block detector.
pub const DEFAULT_MIN_BLOCK_SIZE: usize = 3;

/// Default similarity threshold for the greedy clustering detector.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Default name of the ignore-pattern file read from the scan root.
pub const DEFAULT_IGNORE_FILE: &str = ".scanignore";

/// Engine-wide configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    /// Advisory file-size limit in bytes. Oversized files are counted but
    /// never excluded from scan results.
    pub max_file_size: u64,

    /// Whether to sample the first 1 KiB of each file for a NUL byte during
    /// scanning. Detection only feeds counters; it never filters.
    pub detect_binary: bool,

    /// Name of the ignore-pattern file looked up in the scan root.
    pub ignore_file: String,

    /// Minimum number of lines a contiguous block must span to participate
    /// in block-duplicate detection.
    pub min_block_size: usize,

    /// Pairwise similarity ratio at or above which two files are clustered.
    pub similarity_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            detect_binary: true,
            ignore_file: DEFAULT_IGNORE_FILE.to_string(),
            min_block_size: DEFAULT_MIN_BLOCK_SIZE,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            anyhow::bail!(
                "similarity_threshold must be within [0.0, 1.0], got {}",
                self.similarity_threshold
            );
        }
        if self.min_block_size == 0 {
            anyhow::bail!("min_block_size must be at least 1");
        }
        Ok(())
    }
}
