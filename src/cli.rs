//! Command-line interface definitions for corposcan.
//!
//! This module defines all CLI arguments, subcommands, and options using the
//! clap derive API. Global options (verbosity, config file, error format)
//! apply to every subcommand; each engine operation gets its own subcommand.
//!
//! # Example
//!
//! ```bash
//! # Scan a project and print the file inventory
//! corposcan scan ./project
//!
//! # Analyze with JSON output for scripting
//! corposcan analyze ./project --output json
//!
//! # Duplicate detection with selected methods
//! corposcan dupes ./project --method hash --method similarity
//!
//! # Verbose mode for debugging
//! corposcan -v scan ./project
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::duplicates::DetectMethod;

/// File corpus indexing and duplicate-detection engine.
///
/// corposcan walks a project directory, classifies the discovered files,
/// computes content statistics, and detects duplicate or near-duplicate
/// content using BLAKE3 hashing and sequence similarity.
#[derive(Debug, Parser)]
#[command(name = "corposcan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "PATH", env = "CORPOSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for corposcan.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory and print the discovered file inventory
    Scan(ScanArgs),
    /// Analyze file contents and report corpus statistics
    Analyze(AnalyzeArgs),
    /// Detect duplicate and near-duplicate content
    Dupes(DupesArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Ignore patterns (can be specified multiple times)
    ///
    /// When present these replace the patterns from the ignore file.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Advisory size limit (e.g., 1MB, 10MiB); larger files are flagged
    /// but never excluded
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_file_size: Option<u64>,

    /// Skip the binary-content sniff
    #[arg(long)]
    pub no_detect_binary: bool,
}

/// Arguments for the analyze subcommand.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Directory to analyze
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Extensions to include in the partition (can be specified multiple
    /// times; leading dot optional, case-insensitive)
    #[arg(short, long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,
}

/// Arguments for the dupes subcommand.
#[derive(Debug, Args)]
pub struct DupesArgs {
    /// Directory to check for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Detection methods to run (defaults to all)
    #[arg(short, long = "method", value_name = "METHOD")]
    pub methods: Vec<DetectMethodArg>,

    /// Minimum line count for a reported block
    #[arg(long, value_name = "N")]
    pub min_block_size: Option<usize>,

    /// Similarity ratio threshold between 0 and 1
    #[arg(long, value_name = "RATIO")]
    pub threshold: Option<f64>,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Detection method as a CLI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DetectMethodArg {
    /// Whole-file content hashing
    Hash,
    /// Duplicated line blocks
    Content,
    /// Near-duplicate files by similarity
    Similarity,
}

impl From<DetectMethodArg> for DetectMethod {
    fn from(arg: DetectMethodArg) -> Self {
        match arg {
            DetectMethodArg::Hash => DetectMethod::Hash,
            DetectMethodArg::Content => DetectMethod::Content,
            DetectMethodArg::Similarity => DetectMethod::Similarity,
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes B, KB, KiB, MB, MiB, GB, GiB, case-insensitive; bare
/// numbers are bytes.
///
/// # Errors
///
/// Returns an error for empty strings, invalid numbers, and unknown
/// suffixes.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" => 1_000,
        "KIB" => 1_024,
        "MB" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
