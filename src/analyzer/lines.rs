//! Per-line classification into empty, comment, and code lines.
//!
//! The classifier is a small state machine over physical lines, not a
//! lexer. Comment tokens inside string literals are misattributed, and for
//! languages whose multi-line open/close tokens are identical (Python's
//! triple quote) the result is an approximation. That imprecision is an
//! accepted property of the engine, not a bug to fix here.

use serde::Serialize;

use super::languages::LanguageSpec;

/// Classification of one physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    /// Trimmed content is empty
    Empty,
    /// Single-line comment or part of a multi-line comment
    Comment,
    /// Everything else
    Code,
}

/// Line totals for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineCounts {
    /// Total physical lines
    pub total: usize,
    /// Comment lines
    pub comment: usize,
    /// Code lines
    pub code: usize,
    /// Empty lines
    pub empty: usize,
}

impl LineCounts {
    /// Accumulate another file's counts into this one.
    pub fn add(&mut self, other: LineCounts) {
        self.total += other.total;
        self.comment += other.comment;
        self.code += other.code;
        self.empty += other.empty;
    }
}

/// Classify every line of `content` using the language's comment tokens.
///
/// With no language descriptor only the empty/code distinction applies.
/// Rules, applied top to bottom per line:
///
/// 1. Empty trimmed content is an empty line.
/// 2. Inside a multi-line comment every line is a comment line, up to and
///    including the line carrying the close token.
/// 3. A line containing the multi-line open token is a comment line; the
///    comment terminates on the same line only if the close token appears
///    after the open token.
/// 4. A line starting with the single-line token is a comment line.
/// 5. Everything else is code.
#[must_use]
pub fn classify_lines(content: &str, spec: Option<&LanguageSpec>) -> Vec<LineKind> {
    let line_comment = spec.and_then(|s| s.line_comment.as_deref());
    let block_comment = spec.and_then(|s| s.block_comment.as_ref());

    let mut kinds = Vec::new();
    let mut in_block = false;

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            kinds.push(LineKind::Empty);
            continue;
        }

        if in_block {
            kinds.push(LineKind::Comment);
            if let Some((_, close)) = block_comment {
                if trimmed.contains(close.as_str()) {
                    in_block = false;
                }
            }
            continue;
        }

        if let Some((open, close)) = block_comment {
            if let Some(idx) = trimmed.find(open.as_str()) {
                kinds.push(LineKind::Comment);
                // Terminates on the same line only if the close token
                // appears after the open token.
                let rest = &trimmed[idx + open.len()..];
                if !rest.contains(close.as_str()) {
                    in_block = true;
                }
                continue;
            }
        }

        if let Some(token) = line_comment {
            if trimmed.starts_with(token) {
                kinds.push(LineKind::Comment);
                continue;
            }
        }

        kinds.push(LineKind::Code);
    }

    kinds
}

/// Count line kinds for `content`.
#[must_use]
pub fn count_lines(content: &str, spec: Option<&LanguageSpec>) -> LineCounts {
    let mut counts = LineCounts::default();
    for kind in classify_lines(content, spec) {
        counts.total += 1;
        match kind {
            LineKind::Empty => counts.empty += 1,
            LineKind::Comment => counts.comment += 1,
            LineKind::Code => counts.code += 1,
        }
    }
    counts
}
