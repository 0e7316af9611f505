//! Block-level duplicate detection.
//!
//! Each candidate file is segmented into contiguous blocks of lines, with a
//! boundary on every empty or comment-only line (comment classification
//! reuses [`crate::analyzer::lines`]). Blocks shorter than the configured
//! minimum are discarded; surviving blocks are hashed and grouped across
//! the whole corpus. Occurrences within a single file count too, which
//! deliberately surfaces intra-file repetition.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::analyzer::{classify_lines, LanguageTable, LineKind};
use crate::scanner::DiscoveredFile;

/// Maximum number of characters kept in a group's content preview.
pub const PREVIEW_LEN: usize = 200;

/// One location of a duplicated block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockOccurrence {
    /// File containing the block
    pub path: PathBuf,
    /// 1-based first line of the block
    pub start_line: usize,
    /// 1-based last line of the block (inclusive)
    pub end_line: usize,
}

/// A block of lines that occurs two or more times across the corpus.
#[derive(Debug, Clone, Serialize)]
pub struct BlockDuplicateGroup {
    /// BLAKE3 hex digest of the block text
    pub hash: String,
    /// Number of lines in the block
    pub line_count: usize,
    /// Every location of the block, in file-then-line order
    pub occurrences: Vec<BlockOccurrence>,
    /// Truncated block content
    pub preview: String,
}

/// A segmented block inside one file.
struct Block {
    start_line: usize,
    end_line: usize,
    text: String,
}

/// Find duplicated line blocks across `candidates`.
///
/// Candidates must already be in a fixed (lexicographic) order so that
/// occurrence order is deterministic. Unreadable files are skipped.
#[must_use]
pub fn find_blocks(
    candidates: &[&DiscoveredFile],
    table: &LanguageTable,
    min_block_size: usize,
) -> Vec<BlockDuplicateGroup> {
    let mut by_hash: HashMap<String, (usize, Vec<BlockOccurrence>, String)> = HashMap::new();

    for file in candidates {
        let content = match fs::read(&file.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                log::warn!("Failed to read {}: {}", file.path.display(), e);
                continue;
            }
        };

        let spec = file.extension().and_then(|ext| table.lookup(&ext));
        for block in segment(&content, spec.as_ref()) {
            let line_count = block.end_line - block.start_line + 1;
            if line_count < min_block_size {
                continue;
            }
            let digest = blake3::hash(block.text.as_bytes()).to_hex().to_string();
            let entry = by_hash
                .entry(digest)
                .or_insert_with(|| (line_count, Vec::new(), preview_of(&block.text)));
            entry.1.push(BlockOccurrence {
                path: file.path.clone(),
                start_line: block.start_line,
                end_line: block.end_line,
            });
        }
    }

    let mut groups: Vec<BlockDuplicateGroup> = by_hash
        .into_iter()
        .filter(|(_, (_, occurrences, _))| occurrences.len() >= 2)
        .map(|(hash, (line_count, occurrences, preview))| BlockDuplicateGroup {
            hash,
            line_count,
            occurrences,
            preview,
        })
        .collect();
    groups.sort_by(|a, b| a.hash.cmp(&b.hash));

    log::debug!("Block detector: {} group(s)", groups.len());
    groups
}

/// Split `content` into maximal runs of non-empty, non-comment lines.
fn segment(content: &str, spec: Option<&crate::analyzer::LanguageSpec>) -> Vec<Block> {
    let lines: Vec<&str> = content.lines().collect();
    let kinds = classify_lines(content, spec);

    let mut blocks = Vec::new();
    let mut run_start: Option<usize> = None;

    for (idx, kind) in kinds.iter().enumerate() {
        match kind {
            LineKind::Code => {
                run_start.get_or_insert(idx);
            }
            LineKind::Empty | LineKind::Comment => {
                if let Some(start) = run_start.take() {
                    blocks.push(make_block(&lines, start, idx - 1));
                }
            }
        }
    }
    if let Some(start) = run_start {
        blocks.push(make_block(&lines, start, lines.len() - 1));
    }

    blocks
}

fn make_block(lines: &[&str], start: usize, end: usize) -> Block {
    Block {
        start_line: start + 1,
        end_line: end + 1,
        text: lines[start..=end].join("\n"),
    }
}

/// First [`PREVIEW_LEN`] characters of the block text.
fn preview_of(text: &str) -> String {
    text.chars().take(PREVIEW_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> DiscoveredFile {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        DiscoveredFile::new(path, content.len() as u64, SystemTime::UNIX_EPOCH, false)
    }

    #[test]
    fn test_segment_boundaries_on_blank_and_comment() {
        let spec = crate::analyzer::languages::builtin("py").unwrap();
        let content = "a = 1\nb = 2\n\nc = 3\n# sep\nd = 4\ne = 5\n";
        let blocks = segment(content, Some(&spec));

        assert_eq!(blocks.len(), 3);
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (1, 2));
        assert_eq!((blocks[1].start_line, blocks[1].end_line), (4, 4));
        assert_eq!((blocks[2].start_line, blocks[2].end_line), (6, 7));
        assert_eq!(blocks[2].text, "d = 4\ne = 5");
    }

    #[test]
    fn test_min_block_size_three_excludes_pairs() {
        let dir = TempDir::new().unwrap();
        let content = "x = 1\ny = 2\n";
        let a = write_file(dir.path(), "a.py", content);
        let b = write_file(dir.path(), "b.py", content);

        let table = LanguageTable::new();
        assert!(find_blocks(&[&a, &b], &table, 3).is_empty());
        // Same corpus with min_block_size 2 reports the pair.
        let groups = find_blocks(&[&a, &b], &table, 2);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].line_count, 2);
        assert_eq!(groups[0].occurrences.len(), 2);
    }

    #[test]
    fn test_cross_file_block_group() {
        let dir = TempDir::new().unwrap();
        let shared = "one()\ntwo()\nthree()\n";
        let a = write_file(dir.path(), "a.py", &format!("{shared}\nunique_a()\n"));
        let b = write_file(dir.path(), "b.py", &format!("prefix()\n\n{shared}"));

        let table = LanguageTable::new();
        let groups = find_blocks(&[&a, &b], &table, 3);
        assert_eq!(groups.len(), 1);

        let group = &groups[0];
        assert_eq!(group.line_count, 3);
        assert_eq!(group.occurrences[0].start_line, 1);
        assert_eq!(group.occurrences[0].end_line, 3);
        assert_eq!(group.occurrences[1].start_line, 3);
        assert_eq!(group.occurrences[1].end_line, 5);
    }

    #[test]
    fn test_intra_file_repetition_detected() {
        let dir = TempDir::new().unwrap();
        let content = "a()\nb()\nc()\n\na()\nb()\nc()\n";
        let a = write_file(dir.path(), "solo.py", content);

        let table = LanguageTable::new();
        let groups = find_blocks(&[&a], &table, 3);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].occurrences.len(), 2);
        assert_eq!(groups[0].occurrences[0].path, groups[0].occurrences[1].path);
    }

    #[test]
    fn test_comment_lines_never_inside_blocks() {
        let dir = TempDir::new().unwrap();
        let content = "a()\n# note\nb()\nc()\nd()\n";
        let a = write_file(dir.path(), "a.py", content);
        let b = write_file(dir.path(), "b.py", content);

        let table = LanguageTable::new();
        let groups = find_blocks(&[&a, &b], &table, 3);
        // Only the b/c/d block is long enough; `a()` alone is too short.
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].preview, "b()\nc()\nd()");
    }

    #[test]
    fn test_preview_truncated() {
        let long_line = "x".repeat(PREVIEW_LEN * 2);
        assert_eq!(preview_of(&long_line).chars().count(), PREVIEW_LEN);
    }

    #[test]
    fn test_unknown_extension_blocks_split_on_blank_only() {
        let spec = None;
        let content = "# not a comment here\ndata\n\nmore\n";
        let blocks = segment(content, spec);
        // Without a language spec the `#` line is ordinary code.
        assert_eq!(blocks.len(), 2);
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (1, 2));
    }
}
