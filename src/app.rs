//! Application logic: drives the coordinator from parsed CLI arguments.
//!
//! `run_app` is the seam between the clap surface and the engine. Each
//! subcommand builds an engine configuration (file config plus CLI
//! overrides), runs the relevant coordinator operations, and renders the
//! resulting report as text or JSON. Root-validity errors propagate as
//! [`ScanError`] so `main` can map them to the invalid-root exit code;
//! per-file problems only downgrade the exit code to partial success.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bytesize::ByteSize;
use serde::Serialize;

use crate::cli::{AnalyzeArgs, Cli, Commands, DupesArgs, OutputFormat, ScanArgs};
use crate::config::EngineConfig;
use crate::coordinator::Coordinator;
use crate::duplicates::{DetectMethod, DuplicateReport};
use crate::error::ExitCode;
use crate::logging;
use crate::scanner::{DiscoveredFile, ScanCounters, ScanError};

/// Run the application with parsed CLI arguments.
///
/// # Errors
///
/// Returns an error for invalid roots, unreadable configuration, and
/// engine failures. Non-fatal per-file errors are reported through the
/// [`ExitCode::PartialSuccess`] return value instead.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Scan(args) => run_scan(config, &args),
        Commands::Analyze(args) => run_analyze(config, &args),
        Commands::Dupes(args) => run_dupes(config, &args),
    }
}

/// Validate the scan root up front so root errors keep their type.
///
/// The coordinator runs the scan on a worker thread and can only surface
/// failures as a status string; the CLI needs the [`ScanError`] itself to
/// pick the right exit code.
fn check_root(path: &Path) -> Result<(), ScanError> {
    let metadata = fs::metadata(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ScanError::NotFound(path.to_path_buf())
        } else {
            ScanError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Load a project into a fresh coordinator and wait for the scan.
fn load(
    config: EngineConfig,
    root: &Path,
    ignore_patterns: Option<Vec<String>>,
) -> Result<Coordinator> {
    check_root(root)?;
    let coordinator = Coordinator::new(config);
    coordinator.load_project(root.to_path_buf(), ignore_patterns)?;
    coordinator.wait_idle();

    let status = coordinator.status();
    if let Some(cause) = status.strip_prefix("Error loading project: ") {
        anyhow::bail!("project load failed: {cause}");
    }
    Ok(coordinator)
}

fn exit_code_for(counters: &ScanCounters) -> ExitCode {
    if counters.errors > 0 {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    }
}

fn run_scan(mut config: EngineConfig, args: &ScanArgs) -> Result<ExitCode> {
    if let Some(size) = args.max_file_size {
        config.max_file_size = size;
    }
    if args.no_detect_binary {
        config.detect_binary = false;
    }
    let patterns = if args.ignore_patterns.is_empty() {
        None
    } else {
        Some(args.ignore_patterns.clone())
    };

    let coordinator = load(config, &args.path, patterns)?;
    let files = coordinator.files();
    let counters = coordinator.counters();

    match args.output {
        OutputFormat::Json => print_json(&ScanRender {
            root: &args.path,
            counters: &counters,
            files: &files,
        })?,
        OutputFormat::Text => render_scan_text(&args.path, &files, &counters),
    }
    Ok(exit_code_for(&counters))
}

fn run_analyze(config: EngineConfig, args: &AnalyzeArgs) -> Result<ExitCode> {
    let coordinator = load(config, &args.path, None)?;

    if !args.extensions.is_empty() {
        let active: HashSet<String> = args.extensions.iter().cloned().collect();
        coordinator.classify(active)?;
        coordinator.wait_idle();
    }

    coordinator.analyze()?;
    coordinator.wait_idle();
    let report = coordinator
        .last_analysis()
        .context("analysis produced no report")?;

    match args.output {
        OutputFormat::Json => print_json(report.as_ref())?,
        OutputFormat::Text => {
            render_analysis_text(&report);
            if !args.extensions.is_empty() {
                let (include, other) = coordinator.partition_counts();
                println!("Partition: {include} included, {other} other");
            }
        }
    }
    Ok(exit_code_for(&coordinator.counters()))
}

fn run_dupes(mut config: EngineConfig, args: &DupesArgs) -> Result<ExitCode> {
    if let Some(min) = args.min_block_size {
        config.min_block_size = min;
    }
    if let Some(threshold) = args.threshold {
        config.similarity_threshold = threshold;
    }
    config.validate()?;

    let methods: Vec<DetectMethod> = if args.methods.is_empty() {
        DetectMethod::ALL.to_vec()
    } else {
        args.methods.iter().copied().map(Into::into).collect()
    };

    let coordinator = load(config, &args.path, None)?;
    coordinator.find_duplicates(methods)?;
    coordinator.wait_idle();
    let report = coordinator
        .last_duplicates()
        .context("duplicate detection produced no report")?;

    match args.output {
        OutputFormat::Json => print_json(report.as_ref())?,
        OutputFormat::Text => render_dupes_text(&report),
    }
    Ok(exit_code_for(&coordinator.counters()))
}

#[derive(Serialize)]
struct ScanRender<'a> {
    root: &'a Path,
    counters: &'a ScanCounters,
    files: &'a [DiscoveredFile],
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}

fn render_scan_text(root: &Path, files: &[DiscoveredFile], counters: &ScanCounters) {
    println!("Scan of {}", root.display());
    for file in files {
        let marker = if file.is_binary { " [binary]" } else { "" };
        println!("  {} ({}){}", file.path.display(), ByteSize(file.size), marker);
    }
    let total: u64 = files.iter().map(|f| f.size).sum();
    println!(
        "{} files, {} total ({} ignored, {} binary, {} oversized, {} errors)",
        counters.found,
        ByteSize(total),
        counters.ignored,
        counters.binary_detected,
        counters.oversized,
        counters.errors
    );
}

fn render_analysis_text(report: &crate::analyzer::AnalysisReport) {
    let totals = &report.totals;
    println!(
        "{} files, {} ({} avg), {} lines",
        totals.total_files,
        ByteSize(totals.total_bytes),
        ByteSize(totals.average_file_size as u64),
        totals.total_lines
    );
    println!(
        "Lines: {:.1}% code, {:.1}% comment, {:.1}% empty",
        totals.code_ratio * 100.0,
        totals.comment_ratio * 100.0,
        totals.empty_ratio * 100.0
    );

    if !report.languages.is_empty() {
        println!("Languages:");
        for (ext, profile) in &report.languages {
            println!(
                "  {:<12} {:>5} file(s) {:>10}  {} lines",
                format!("{} (.{ext})", profile.name),
                profile.files,
                ByteSize(profile.total_size).to_string(),
                profile.lines.total
            );
        }
    }

    println!("Categories:");
    for (category, count) in &report.categories {
        println!("  {:<14} {count}", category.label());
    }

    println!(
        "Structure: depth {}, {} directories, {:.1} files/dir",
        report.structure.max_depth,
        report.structure.directory_count,
        report.structure.avg_files_per_directory
    );
    let hist = &report.size_histogram;
    println!(
        "Sizes: <1KiB {:.0}% | 1-10KiB {:.0}% | 10-100KiB {:.0}% | 100KiB-1MiB {:.0}% | >1MiB {:.0}%",
        hist.under_1kib, hist.kib_1_to_10, hist.kib_10_to_100, hist.kib_100_to_1mib, hist.over_1mib
    );
}

fn render_dupes_text(report: &DuplicateReport) {
    for group in &report.exact {
        println!(
            "Exact: {} copies of {} ({} wasted)",
            group.paths.len(),
            ByteSize(group.size),
            ByteSize(group.wasted_bytes())
        );
        for path in &group.paths {
            println!("  {}", path.display());
        }
    }

    for group in &report.blocks {
        println!(
            "Block: {} lines at {} location(s)",
            group.line_count,
            group.occurrences.len()
        );
        for occ in &group.occurrences {
            println!(
                "  {}:{}-{}",
                occ.path.display(),
                occ.start_line,
                occ.end_line
            );
        }
    }

    for group in &report.similarity {
        println!(
            "Similar: {} file(s), average similarity {:.2}",
            group.paths.len(),
            group.average_similarity
        );
        for path in &group.paths {
            println!("  {}", path.display());
        }
    }

    let summary = &report.summary;
    println!(
        "{} group(s) ({} exact, {} block, {} similar) across {} of {} file(s), {:.1}% duplication",
        summary.total_groups,
        summary.exact_groups,
        summary.block_groups,
        summary.similarity_groups,
        summary.duplicate_files.len(),
        summary.files_considered,
        summary.duplication_ratio * 100.0
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_check_root_missing() {
        let err = check_root(Path::new("/definitely/not/there")).unwrap_err();
        assert!(matches!(err, ScanError::NotFound(_)));
    }

    #[test]
    fn test_check_root_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "x").unwrap();
        let err = check_root(&file).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }

    #[test]
    fn test_check_root_ok() {
        let dir = TempDir::new().unwrap();
        assert!(check_root(dir.path()).is_ok());
    }

    #[test]
    fn test_exit_code_partial_on_errors() {
        let mut counters = ScanCounters::default();
        assert_eq!(exit_code_for(&counters), ExitCode::Success);
        counters.errors = 1;
        assert_eq!(exit_code_for(&counters), ExitCode::PartialSuccess);
    }
}
