//! Format classification: partitioning a discovered file set by extension.
//!
//! [`classify`] is a pure, total function: every discovered file lands in
//! exactly one of the `include`/`other` sets, and re-running it with a new
//! extension set recomputes the partition from scratch.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use serde::Serialize;

use crate::scanner::DiscoveredFile;

/// A partition of the corpus into `include` and `other`.
///
/// Invariant: the two sets are disjoint and their union covers every
/// discovered file exactly once. `BTreeSet` keeps enumeration order stable
/// (lexicographic by absolute path) for downstream consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Partition {
    /// Files whose extension is in the active set
    pub include: BTreeSet<PathBuf>,
    /// Everything else
    pub other: BTreeSet<PathBuf>,
}

impl Partition {
    /// Total number of files in the partition.
    #[must_use]
    pub fn len(&self) -> usize {
        self.include.len() + self.other.len()
    }

    /// Check whether the partition is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.other.is_empty()
    }
}

/// Partition `files` by extension membership in `active_extensions`.
///
/// Extensions are compared case-insensitively; a leading `.` in the active
/// set is accepted and stripped. Files without an extension are never
/// included. An empty active set puts every file in `other` - the
/// default-safe behavior, not an error.
#[must_use]
pub fn classify(files: &[DiscoveredFile], active_extensions: &HashSet<String>) -> Partition {
    let active: HashSet<String> = active_extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .collect();

    let mut partition = Partition::default();
    for file in files {
        let included = file
            .extension()
            .is_some_and(|ext| active.contains(ext.as_str()));
        if included {
            partition.include.insert(file.path.clone());
        } else {
            partition.other.insert(file.path.clone());
        }
    }

    log::debug!(
        "Classified {} files: {} included, {} other",
        partition.len(),
        partition.include.len(),
        partition.other.len()
    );
    partition
}
