//! Exact duplicate detection via whole-file content hashing.
//!
//! Every candidate file is hashed with BLAKE3 over its full byte content
//! and grouped by hex digest. Hash equality is an equivalence relation, so
//! within a run two files reported in the same group are content-identical
//! up to hash collision probability.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;

use crate::scanner::DiscoveredFile;

/// Files whose whole-file content hashes are identical.
#[derive(Debug, Clone, Serialize)]
pub struct ExactDuplicateGroup {
    /// BLAKE3 hex digest of the shared content
    pub hash: String,
    /// File size in bytes (shared by all members)
    pub size: u64,
    /// Member paths, sorted lexicographically
    pub paths: Vec<PathBuf>,
}

impl ExactDuplicateGroup {
    /// Number of duplicate copies beyond the first.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Bytes wasted by the extra copies.
    #[must_use]
    pub fn wasted_bytes(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }
}

/// Hash all candidates in parallel and group by digest.
///
/// Unreadable files are logged and skipped. Only groups with two or more
/// members are returned, sorted by digest for deterministic reports.
#[must_use]
pub fn find_exact(candidates: &[&DiscoveredFile]) -> Vec<ExactDuplicateGroup> {
    let hashed: Vec<(PathBuf, u64, String)> = candidates
        .par_iter()
        .filter_map(|file| match fs::read(&file.path) {
            Ok(bytes) => {
                let digest = blake3::hash(&bytes).to_hex().to_string();
                Some((file.path.clone(), file.size, digest))
            }
            Err(e) => {
                log::warn!("Failed to hash {}: {}", file.path.display(), e);
                None
            }
        })
        .collect();

    let mut by_hash: HashMap<String, (u64, Vec<PathBuf>)> = HashMap::new();
    for (path, size, digest) in hashed {
        let entry = by_hash.entry(digest).or_insert_with(|| (size, Vec::new()));
        entry.1.push(path);
    }

    let mut groups: Vec<ExactDuplicateGroup> = by_hash
        .into_iter()
        .filter(|(_, (_, paths))| paths.len() >= 2)
        .map(|(hash, (size, mut paths))| {
            paths.sort();
            ExactDuplicateGroup { hash, size, paths }
        })
        .collect();
    groups.sort_by(|a, b| a.hash.cmp(&b.hash));

    log::debug!("Exact detector: {} group(s)", groups.len());
    groups
}
