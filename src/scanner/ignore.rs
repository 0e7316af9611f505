//! Ignore-pattern file loading and path matching.
//!
//! The ignore file lives in the scan root, one shell-glob pattern per line.
//! Blank lines and `#`-prefixed lines are skipped. Matching is a boolean OR
//! over the loaded patterns; a path is excluded as soon as any pattern
//! matches it.
//!
//! # Pattern rules
//!
//! - `build/` (trailing slash): matches any path under that directory,
//!   as a path-segment prefix.
//! - `/dist*` (leading slash): anchored shell-glob match against the whole
//!   relative path.
//! - `__pycache__` (no slash): matches if any single path segment equals the
//!   literal pattern, or the pattern matches the full path as a glob.
//! - everything else: shell-glob match against the full relative path.

use std::fs;
use std::path::Path;

use glob::Pattern;

/// Pure matcher over relative path strings.
///
/// All functions are side-effect free; a missing or unreadable ignore file
/// is not an error, it degrades to an empty pattern list.
#[derive(Debug)]
pub struct IgnoreMatcher;

impl IgnoreMatcher {
    /// Load ignore patterns from `root/file_name`.
    ///
    /// Returns the ordered list of patterns. A missing or unreadable file
    /// is logged as a warning and treated as "no patterns".
    #[must_use]
    pub fn load(root: &Path, file_name: &str) -> Vec<String> {
        let path = root.join(file_name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                if path.exists() {
                    log::warn!("Failed to read ignore file {}: {}", path.display(), e);
                } else {
                    log::debug!("No ignore file at {}", path.display());
                }
                return Vec::new();
            }
        };

        let patterns: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();

        log::debug!(
            "Loaded {} ignore pattern(s) from {}",
            patterns.len(),
            path.display()
        );
        patterns
    }

    /// Check whether `relative` (a path relative to the scan root) is
    /// excluded by any of `patterns`.
    #[must_use]
    pub fn matches(relative: &str, patterns: &[String]) -> bool {
        let rel = normalize(relative);
        patterns.iter().any(|p| Self::pattern_matches(&rel, p))
    }

    /// Apply one pattern according to the rules in the module docs.
    fn pattern_matches(rel: &str, pattern: &str) -> bool {
        if let Some(prefix) = pattern.strip_suffix('/') {
            // Directory pattern: path-segment prefix match.
            return rel == prefix || rel.starts_with(&format!("{prefix}/"));
        }

        if let Some(anchored) = pattern.strip_prefix('/') {
            return glob_match(anchored, rel);
        }

        if !pattern.contains('/') {
            if rel.split('/').any(|segment| segment == pattern) {
                return true;
            }
            return glob_match(pattern, rel);
        }

        glob_match(pattern, rel)
    }
}

/// Shell-glob match (`*`, `?`, `[seq]`); invalid patterns match nothing.
fn glob_match(pattern: &str, text: &str) -> bool {
    match Pattern::new(pattern) {
        Ok(p) => p.matches(text),
        Err(e) => {
            log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            false
        }
    }
}

/// Normalize path separators to `/` for matching on Windows.
fn normalize(path: &str) -> String {
    if cfg!(windows) {
        path.replace('\\', "/")
    } else {
        path.to_string()
    }
}
