//! Duplicate detection across a discovered file set.
//!
//! This module provides functionality for:
//! - Exact duplicates via whole-file BLAKE3 hashing ([`exact`])
//! - Duplicated line blocks across and within files ([`blocks`])
//! - Near-duplicate files via sequence similarity ([`similarity`])
//!
//! # Architecture
//!
//! [`find_duplicates`] selects candidates (text files only, in
//! lexicographic path order), runs the requested detectors, and assembles
//! a [`DuplicateReport`] with a cross-detector summary. Detector order and
//! candidate order are fixed, so repeated runs over an unchanged corpus
//! produce identical reports.

pub mod blocks;
pub mod exact;
pub mod similarity;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzer::LanguageTable;
use crate::scanner::DiscoveredFile;
pub use blocks::{find_blocks, BlockDuplicateGroup, BlockOccurrence};
pub use exact::{find_exact, ExactDuplicateGroup};
pub use similarity::{find_similar, SimilarityGroup};

/// A duplicate-detection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectMethod {
    /// Whole-file content hashing
    Hash,
    /// Duplicated line blocks
    Content,
    /// Near-duplicate files by similarity ratio
    Similarity,
}

impl DetectMethod {
    /// All methods, in the order detectors run.
    pub const ALL: [DetectMethod; 3] = [
        DetectMethod::Hash,
        DetectMethod::Content,
        DetectMethod::Similarity,
    ];
}

impl fmt::Display for DetectMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectMethod::Hash => "hash",
            DetectMethod::Content => "content",
            DetectMethod::Similarity => "similarity",
        };
        write!(f, "{name}")
    }
}

impl FromStr for DetectMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hash" => Ok(DetectMethod::Hash),
            "content" => Ok(DetectMethod::Content),
            "similarity" => Ok(DetectMethod::Similarity),
            other => Err(format!(
                "unknown detection method '{other}' (expected hash, content, or similarity)"
            )),
        }
    }
}

/// Tuning knobs for the detectors.
#[derive(Debug, Clone)]
pub struct DuplicateConfig {
    /// Minimum line count for a reported block
    pub min_block_size: usize,
    /// Similarity ratio threshold in [0, 1]
    pub similarity_threshold: f64,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            min_block_size: crate::config::DEFAULT_MIN_BLOCK_SIZE,
            similarity_threshold: crate::config::DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl DuplicateConfig {
    /// Build detector tuning from the engine configuration.
    #[must_use]
    pub fn from_engine(config: &crate::config::EngineConfig) -> Self {
        Self {
            min_block_size: config.min_block_size,
            similarity_threshold: config.similarity_threshold,
        }
    }
}

/// Cross-detector rollup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DuplicateSummary {
    /// Groups reported by all detectors combined
    pub total_groups: usize,
    /// Groups from the hash detector
    pub exact_groups: usize,
    /// Groups from the block detector
    pub block_groups: usize,
    /// Groups from the similarity detector
    pub similarity_groups: usize,
    /// Distinct files appearing in at least one group
    pub duplicate_files: BTreeSet<PathBuf>,
    /// Number of candidate files the detectors ran over
    pub files_considered: usize,
    /// duplicate_files / files_considered (0 when no candidates)
    pub duplication_ratio: f64,
}

/// Read-only snapshot of one duplicate-detection run.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateReport {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Scan root the candidate paths live under, if known
    pub root: Option<PathBuf>,
    /// Methods that actually ran
    pub methods: Vec<DetectMethod>,
    /// Exact whole-file groups
    pub exact: Vec<ExactDuplicateGroup>,
    /// Duplicated line blocks
    pub blocks: Vec<BlockDuplicateGroup>,
    /// Near-duplicate clusters
    pub similarity: Vec<SimilarityGroup>,
    /// Cross-detector rollup
    pub summary: DuplicateSummary,
}

/// Run the requested detectors over `files` and assemble a report.
///
/// Binary-flagged files are excluded up front; candidates are processed in
/// lexicographic path order regardless of input order. Requesting a method
/// twice runs it once.
#[must_use]
pub fn find_duplicates(
    files: &[DiscoveredFile],
    root_hint: Option<&Path>,
    methods: &[DetectMethod],
    config: &DuplicateConfig,
) -> DuplicateReport {
    let mut candidates: Vec<&DiscoveredFile> = files.iter().filter(|f| f.is_text()).collect();
    candidates.sort_by(|a, b| a.path.cmp(&b.path));

    let selected: Vec<DetectMethod> = DetectMethod::ALL
        .into_iter()
        .filter(|m| methods.contains(m))
        .collect();

    log::info!(
        "Duplicate detection over {} candidate(s), methods: {}",
        candidates.len(),
        selected
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let exact = if selected.contains(&DetectMethod::Hash) {
        find_exact(&candidates)
    } else {
        Vec::new()
    };

    let blocks = if selected.contains(&DetectMethod::Content) {
        find_blocks(&candidates, &LanguageTable::new(), config.min_block_size)
    } else {
        Vec::new()
    };

    let similarity = if selected.contains(&DetectMethod::Similarity) {
        find_similar(&candidates, config.similarity_threshold)
    } else {
        Vec::new()
    };

    let summary = summarize(candidates.len(), &exact, &blocks, &similarity);

    DuplicateReport {
        generated_at: Utc::now(),
        root: root_hint.map(Path::to_path_buf),
        methods: selected,
        exact,
        blocks,
        similarity,
        summary,
    }
}

fn summarize(
    files_considered: usize,
    exact: &[ExactDuplicateGroup],
    blocks: &[BlockDuplicateGroup],
    similarity: &[SimilarityGroup],
) -> DuplicateSummary {
    let mut duplicate_files = BTreeSet::new();
    for group in exact {
        duplicate_files.extend(group.paths.iter().cloned());
    }
    for group in blocks {
        duplicate_files.extend(group.occurrences.iter().map(|o| o.path.clone()));
    }
    for group in similarity {
        duplicate_files.extend(group.paths.iter().cloned());
    }

    let duplication_ratio = if files_considered == 0 {
        0.0
    } else {
        duplicate_files.len() as f64 / files_considered as f64
    };

    DuplicateSummary {
        total_groups: exact.len() + blocks.len() + similarity.len(),
        exact_groups: exact.len(),
        block_groups: blocks.len(),
        similarity_groups: similarity.len(),
        duplicate_files,
        files_considered,
        duplication_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> DiscoveredFile {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        DiscoveredFile::new(path, content.len() as u64, SystemTime::UNIX_EPOCH, false)
    }

    #[test]
    fn test_detect_method_round_trip() {
        for method in DetectMethod::ALL {
            assert_eq!(method.to_string().parse::<DetectMethod>(), Ok(method));
        }
        assert!("fuzzy".parse::<DetectMethod>().is_err());
    }

    #[test]
    fn test_only_requested_detectors_run() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write_file(dir.path(), "a.txt", "same\n"),
            write_file(dir.path(), "b.txt", "same\n"),
        ];

        let report = find_duplicates(
            &files,
            Some(dir.path()),
            &[DetectMethod::Hash],
            &DuplicateConfig::default(),
        );
        assert_eq!(report.methods, vec![DetectMethod::Hash]);
        assert_eq!(report.exact.len(), 1);
        assert!(report.blocks.is_empty());
        assert!(report.similarity.is_empty());
    }

    #[test]
    fn test_binary_files_excluded_from_candidates() {
        let dir = TempDir::new().unwrap();
        let a = write_file(dir.path(), "a.txt", "same\n");
        let mut b = write_file(dir.path(), "b.txt", "same\n");
        b.is_binary = true;

        let report = find_duplicates(
            &[a, b],
            Some(dir.path()),
            &[DetectMethod::Hash],
            &DuplicateConfig::default(),
        );
        assert!(report.exact.is_empty());
        assert_eq!(report.summary.files_considered, 1);
    }

    #[test]
    fn test_duplicate_methods_deduplicated() {
        let dir = TempDir::new().unwrap();
        let files = vec![write_file(dir.path(), "a.txt", "x\n")];

        let report = find_duplicates(
            &files,
            None,
            &[DetectMethod::Hash, DetectMethod::Hash],
            &DuplicateConfig::default(),
        );
        assert_eq!(report.methods, vec![DetectMethod::Hash]);
    }

    #[test]
    fn test_summary_counts_distinct_files() {
        let dir = TempDir::new().unwrap();
        let shared = "alpha()\nbeta()\ngamma()\n";
        let files = vec![
            write_file(dir.path(), "a.py", shared),
            write_file(dir.path(), "b.py", shared),
            write_file(dir.path(), "c.py", "different_entirely()\n"),
        ];

        let report = find_duplicates(
            &files,
            Some(dir.path()),
            &DetectMethod::ALL,
            &DuplicateConfig::default(),
        );
        // a and b hit in every detector; still counted once each.
        assert_eq!(report.summary.duplicate_files.len(), 2);
        assert_eq!(report.summary.files_considered, 3);
        assert!((report.summary.duplication_ratio - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            report.summary.total_groups,
            report.summary.exact_groups
                + report.summary.block_groups
                + report.summary.similarity_groups
        );
    }

    #[test]
    fn test_empty_corpus() {
        let report = find_duplicates(&[], None, &DetectMethod::ALL, &DuplicateConfig::default());
        assert_eq!(report.summary.files_considered, 0);
        assert_eq!(report.summary.duplication_ratio, 0.0);
        assert!(report.summary.duplicate_files.is_empty());
    }
}
