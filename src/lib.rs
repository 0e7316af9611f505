//! corposcan - File Corpus Indexing & Duplicate-Detection Engine
//!
//! A cross-platform Rust library and CLI for walking a project directory,
//! classifying discovered files, computing per-file and per-corpus content
//! statistics, and detecting duplicate or near-duplicate content using
//! content hashing (BLAKE3) and sequence similarity.

pub mod analyzer;
pub mod classify;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod scanner;

mod app;

pub use app::run_app;
