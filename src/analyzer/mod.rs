//! Content analyzer: per-file and per-corpus statistics.
//!
//! This module provides functionality for:
//! - Per-language line counts (total/comment/code/empty)
//! - Category breakdown over the whole corpus
//! - Directory-structure metrics and a size-distribution histogram
//!
//! # Architecture
//!
//! - [`languages`]: static extension metadata tables with overlay support
//! - [`lines`]: the per-line classification state machine
//! - [`analyze`]: assembles an [`AnalysisReport`] from a discovered file set
//!
//! Reports are produced fresh per invocation and never mutated after
//! construction. Per-file IO failures are swallowed; an unreadable file
//! contributes zero lines.

pub mod languages;
pub mod lines;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scanner::DiscoveredFile;
pub use languages::{Category, LanguageSpec, LanguageTable};
pub use lines::{classify_lines, count_lines, LineCounts, LineKind};

/// Aggregated statistics for one language extension.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageProfile {
    /// Human-readable language name
    pub name: String,
    /// Category bucket
    pub category: Category,
    /// Number of files
    pub files: usize,
    /// Total size in bytes
    pub total_size: u64,
    /// Aggregated line counts
    pub lines: LineCounts,
}

/// Corpus-wide totals and ratios.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusTotals {
    /// Number of files analyzed
    pub total_files: usize,
    /// Total bytes across all files
    pub total_bytes: u64,
    /// Total lines across language-known text files
    pub total_lines: usize,
    /// Mean file size in bytes
    pub average_file_size: f64,
    /// comment_lines / total_lines (0 when no lines)
    pub comment_ratio: f64,
    /// code_lines / total_lines (0 when no lines)
    pub code_ratio: f64,
    /// empty_lines / total_lines (0 when no lines)
    pub empty_ratio: f64,
}

/// Directory-structure metrics relative to the scan root.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StructureSummary {
    /// Deepest file, in directory levels below the root
    pub max_depth: usize,
    /// Number of distinct directories holding files
    pub directory_count: usize,
    /// Mean files per directory
    pub avg_files_per_directory: f64,
}

/// Size-distribution histogram, as percentages of total file count.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SizeHistogram {
    /// Files under 1 KiB
    pub under_1kib: f64,
    /// 1 KiB to 10 KiB
    pub kib_1_to_10: f64,
    /// 10 KiB to 100 KiB
    pub kib_10_to_100: f64,
    /// 100 KiB to 1 MiB
    pub kib_100_to_1mib: f64,
    /// 1 MiB and above
    pub over_1mib: f64,
}

/// Read-only snapshot of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Corpus-wide totals
    pub totals: CorpusTotals,
    /// Per-extension profiles, keyed by lowercase extension
    pub languages: BTreeMap<String, LanguageProfile>,
    /// File counts per category bucket (covers every file)
    pub categories: BTreeMap<Category, usize>,
    /// Directory-structure metrics
    pub structure: StructureSummary,
    /// Size distribution over five buckets
    pub size_histogram: SizeHistogram,
}

/// Analyze a file set using the built-in language tables.
#[must_use]
pub fn analyze(files: &[DiscoveredFile], root_hint: &Path) -> AnalysisReport {
    analyze_with_table(files, root_hint, &LanguageTable::new())
}

/// Analyze a file set with a caller-supplied language table.
#[must_use]
pub fn analyze_with_table(
    files: &[DiscoveredFile],
    root_hint: &Path,
    table: &LanguageTable,
) -> AnalysisReport {
    let mut languages: BTreeMap<String, LanguageProfile> = BTreeMap::new();
    let mut categories: BTreeMap<Category, usize> = BTreeMap::new();
    let mut corpus_lines = LineCounts::default();
    let mut total_bytes = 0u64;

    for file in files {
        total_bytes += file.size;

        let ext = file.extension();
        let category = ext
            .as_deref()
            .map_or(Category::Other, languages::category_for);
        *categories.entry(category).or_insert(0) += 1;

        let Some(ext) = ext else { continue };
        let Some(spec) = table.lookup(&ext) else {
            continue;
        };
        if file.is_binary {
            log::trace!("Skipping binary file in line counts: {}", file.path.display());
            continue;
        }

        let counts = match read_lossy(&file.path) {
            Ok(content) => lines::count_lines(&content, Some(&spec)),
            Err(e) => {
                // Unreadable files contribute zero lines, never abort.
                log::debug!("Failed to read {}: {}", file.path.display(), e);
                LineCounts::default()
            }
        };

        corpus_lines.add(counts);
        let profile = languages.entry(ext).or_insert_with(|| LanguageProfile {
            name: spec.name.clone(),
            category: spec.category,
            files: 0,
            total_size: 0,
            lines: LineCounts::default(),
        });
        profile.files += 1;
        profile.total_size += file.size;
        profile.lines.add(counts);
    }

    let totals = build_totals(files.len(), total_bytes, corpus_lines);
    let structure = build_structure(files, root_hint);
    let size_histogram = build_histogram(files);

    log::info!(
        "Analysis complete: {} files, {} languages, {} lines",
        totals.total_files,
        languages.len(),
        totals.total_lines
    );

    AnalysisReport {
        generated_at: Utc::now(),
        totals,
        languages,
        categories,
        structure,
        size_histogram,
    }
}

/// Read a file's content, replacing invalid UTF-8 sequences.
fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn build_totals(total_files: usize, total_bytes: u64, lines: LineCounts) -> CorpusTotals {
    let ratio = |count: usize| {
        if lines.total == 0 {
            0.0
        } else {
            count as f64 / lines.total as f64
        }
    };
    CorpusTotals {
        total_files,
        total_bytes,
        total_lines: lines.total,
        average_file_size: if total_files == 0 {
            0.0
        } else {
            total_bytes as f64 / total_files as f64
        },
        comment_ratio: ratio(lines.comment),
        code_ratio: ratio(lines.code),
        empty_ratio: ratio(lines.empty),
    }
}

fn build_structure(files: &[DiscoveredFile], root_hint: &Path) -> StructureSummary {
    let mut max_depth = 0usize;
    let mut directories: BTreeSet<std::path::PathBuf> = BTreeSet::new();

    for file in files {
        let rel = file.path.strip_prefix(root_hint).unwrap_or(&file.path);
        let depth = rel.components().count().saturating_sub(1);
        max_depth = max_depth.max(depth);
        directories.insert(rel.parent().unwrap_or(Path::new("")).to_path_buf());
    }

    let directory_count = directories.len();
    StructureSummary {
        max_depth,
        directory_count,
        avg_files_per_directory: if directory_count == 0 {
            0.0
        } else {
            files.len() as f64 / directory_count as f64
        },
    }
}

fn build_histogram(files: &[DiscoveredFile]) -> SizeHistogram {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    let mut buckets = [0usize; 5];
    for file in files {
        let idx = match file.size {
            s if s < KIB => 0,
            s if s < 10 * KIB => 1,
            s if s < 100 * KIB => 2,
            s if s < MIB => 3,
            _ => 4,
        };
        buckets[idx] += 1;
    }

    let total = files.len();
    let pct = |count: usize| {
        if total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / total as f64
        }
    };
    SizeHistogram {
        under_1kib: pct(buckets[0]),
        kib_1_to_10: pct(buckets[1]),
        kib_10_to_100: pct(buckets[2]),
        kib_100_to_1mib: pct(buckets[3]),
        over_1mib: pct(buckets[4]),
    }
}
