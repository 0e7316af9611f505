//! Directory walker: recursive discovery with ignored-subtree pruning.
//!
//! # Overview
//!
//! [`scan`] walks a root directory and returns every non-ignored,
//! stat-accessible file beneath it, together with bookkeeping counters.
//! Directories matched by an ignore pattern are pruned (never descended
//! into) rather than merely omitted, so patterns like `node_modules/` cost
//! nothing and permission problems inside ignored subtrees never surface.
//!
//! Size and binary-ness are advisory metadata only: an oversized or binary
//! file is counted but still included in the result set. Per-entry IO
//! failures are logged, counted, and skipped; they never abort the walk.
//!
//! # Example
//!
//! ```no_run
//! use corposcan::scanner::{scan, ScannerConfig};
//! use std::path::Path;
//!
//! let outcome = scan(Path::new("/home/user/project"), None, &ScannerConfig::default())
//!     .expect("root must be a directory");
//! for file in &outcome.files {
//!     println!("{}: {} bytes", file.path.display(), file.size);
//! }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

use walkdir::WalkDir;

use super::ignore::IgnoreMatcher;
use super::sniff;
use super::{DiscoveredFile, ScanCounters, ScanError, ScanOutcome, ScannerConfig};

/// Walk `root` and return the discovered file set plus counters.
///
/// If `ignore_patterns` is `None`, patterns are loaded from the ignore file
/// named by `config.ignore_file` in `root`.
///
/// # Errors
///
/// - [`ScanError::NotFound`] if `root` does not exist
/// - [`ScanError::NotADirectory`] if `root` is a file
///
/// All other failures are absorbed: per-entry IO and permission errors
/// increment [`ScanCounters::errors`] and the walk continues with a
/// partial result.
pub fn scan(
    root: &Path,
    ignore_patterns: Option<Vec<String>>,
    config: &ScannerConfig,
) -> Result<ScanOutcome, ScanError> {
    let meta = fs::metadata(root).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ScanError::NotFound(root.to_path_buf()),
        _ => ScanError::Io {
            path: root.to_path_buf(),
            source: e,
        },
    })?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    // Canonicalize so every DiscoveredFile carries an absolute path.
    let root = fs::canonicalize(root).map_err(|e| ScanError::Io {
        path: root.to_path_buf(),
        source: e,
    })?;

    let patterns =
        ignore_patterns.unwrap_or_else(|| IgnoreMatcher::load(&root, &config.ignore_file));

    let mut files = Vec::new();
    let mut counters = ScanCounters::default();

    let mut it = WalkDir::new(&root).sort_by_file_name().into_iter();
    while let Some(entry) = it.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Directory-level permission errors land here; skip the
                // subtree and keep walking siblings.
                counters.errors += 1;
                log::warn!("Walk error: {}", e);
                continue;
            }
        };

        if entry.depth() == 0 {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(&root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .into_owned();

        if entry.file_type().is_dir() {
            if IgnoreMatcher::matches(&rel, &patterns) {
                log::debug!("Pruning ignored directory: {}", rel);
                counters.ignored += 1;
                it.skip_current_dir();
            }
            continue;
        }

        if !entry.file_type().is_file() {
            log::trace!("Skipping non-regular file: {}", rel);
            continue;
        }

        if IgnoreMatcher::matches(&rel, &patterns) {
            log::trace!("Ignoring file: {}", rel);
            counters.ignored += 1;
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                counters.errors += 1;
                log::warn!("Failed to stat {}: {}", entry.path().display(), e);
                continue;
            }
        };

        let size = metadata.len();
        if size > config.max_file_size {
            // Advisory only: counted, never excluded.
            counters.oversized += 1;
            log::debug!("Oversized file ({} bytes): {}", size, rel);
        }

        let is_binary = if config.detect_binary {
            match sniff::is_binary(entry.path()) {
                Ok(b) => b,
                Err(e) => {
                    log::debug!("Binary sniff failed for {}: {}", rel, e);
                    false
                }
            }
        } else {
            false
        };
        if is_binary {
            counters.binary_detected += 1;
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        files.push(DiscoveredFile::new(
            entry.path().to_path_buf(),
            size,
            modified,
            is_binary,
        ));
        counters.found += 1;
    }

    log::info!(
        "Scan complete: {} found, {} ignored, {} binary, {} oversized, {} errors",
        counters.found,
        counters.ignored,
        counters.binary_detected,
        counters.oversized,
        counters.errors
    );

    Ok(ScanOutcome { files, counters })
}
