//! Scanner module for directory traversal and file discovery.
//!
//! This module provides functionality for:
//! - Recursive directory walking with ignored-subtree pruning
//! - Ignore-pattern file loading and matching
//! - Binary/text sniffing (first 1 KiB NUL-byte heuristic)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`ignore`]: Ignore-pattern file parsing and matching
//! - [`sniff`]: Binary-content heuristic
//!
//! # Example
//!
//! ```no_run
//! use corposcan::scanner::{scan, ScannerConfig};
//! use std::path::Path;
//!
//! let outcome = scan(Path::new("."), None, &ScannerConfig::default()).unwrap();
//! println!(
//!     "Found {} files ({} ignored)",
//!     outcome.counters.found, outcome.counters.ignored
//! );
//! ```

pub mod ignore;
pub mod sniff;
pub mod walker;

use std::path::PathBuf;
use std::time::SystemTime;

use serde::Serialize;

pub use ignore::IgnoreMatcher;
pub use walker::scan;

/// Immutable snapshot of a file discovered by a scan.
///
/// Snapshots are produced fresh per scan and superseded wholesale on
/// re-scan; there is no incremental diffing.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredFile {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// Best-effort binary flag (NUL byte in the first 1 KiB)
    pub is_binary: bool,
}

impl DiscoveredFile {
    /// Create a new discovered-file snapshot.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime, is_binary: bool) -> Self {
        Self {
            path,
            size,
            modified,
            is_binary,
        }
    }

    /// Whether the file passed the text heuristic.
    #[must_use]
    pub fn is_text(&self) -> bool {
        !self.is_binary
    }

    /// Lowercased extension (substring after the last `.`), if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase)
    }
}

/// Configuration for a scan operation.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Advisory size limit in bytes. Files over the limit are counted in
    /// `ScanCounters::oversized` but still returned.
    pub max_file_size: u64,
    /// Whether to run the binary sniff. Sniffing only feeds counters and
    /// the per-file annotation; it never filters.
    pub detect_binary: bool,
    /// Name of the ignore file looked up in the scan root when no explicit
    /// pattern list is supplied.
    pub ignore_file: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_file_size: crate::config::DEFAULT_MAX_FILE_SIZE,
            detect_binary: true,
            ignore_file: crate::config::DEFAULT_IGNORE_FILE.to_string(),
        }
    }
}

impl ScannerConfig {
    /// Build a scanner configuration from the engine configuration.
    #[must_use]
    pub fn from_engine(config: &crate::config::EngineConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            detect_binary: config.detect_binary,
            ignore_file: config.ignore_file.clone(),
        }
    }
}

/// Counters accumulated during a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanCounters {
    /// Files included in the result set
    pub found: usize,
    /// Files and directories excluded by ignore patterns
    pub ignored: usize,
    /// Files flagged as binary by the sniff heuristic
    pub binary_detected: usize,
    /// Files exceeding the advisory size limit (still included)
    pub oversized: usize,
    /// Per-entry IO failures that were skipped
    pub errors: usize,
}

/// Result of a scan: the discovered file set plus counters.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// All non-ignored, stat-accessible files under the root
    pub files: Vec<DiscoveredFile>,
    /// Bookkeeping counters
    pub counters: ScanCounters,
}

/// Errors that can occur when starting a scan.
///
/// Only root validity is fatal; per-entry failures during the walk are
/// absorbed into [`ScanCounters::errors`].
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The scan root was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The scan root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing the root.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
