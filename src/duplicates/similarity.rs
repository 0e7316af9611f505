//! Near-duplicate detection via pairwise sequence similarity.
//!
//! Every candidate pair is compared with a difflib-compatible
//! Ratcliff/Obershelp ratio over lines ([`similar::TextDiff`]). Clustering
//! is greedy and leader-based: files are visited in a fixed lexicographic
//! order, each unprocessed file opens a group, and later unprocessed files
//! join if their ratio **to the leader** meets the threshold. The relation
//! is therefore not transitive - a file over-threshold against a member
//! but under-threshold against the leader stays out. Downstream consumers
//! rely on these exact grouping semantics; do not replace this with a
//! transitive closure without a behavior sign-off.
//!
//! The pair scan is O(n^2) in candidate count. Leader comparisons run
//! under rayon, which changes nothing observable: the outer iteration that
//! decides group leadership stays strictly ordered.

use std::fs;
use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;
use similar::TextDiff;

use crate::scanner::DiscoveredFile;

/// Files clustered by similarity to a group leader.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityGroup {
    /// Member paths; the first entry is the group leader
    pub paths: Vec<PathBuf>,
    /// Mean ratio over all member pairs
    pub average_similarity: f64,
}

/// Ratcliff/Obershelp-style ratio over the two texts' lines, in [0, 1].
#[must_use]
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    f64::from(TextDiff::from_lines(a, b).ratio())
}

/// Greedily cluster `candidates` by similarity to group leaders.
///
/// Candidates must already be sorted lexicographically by path; the order
/// determines which files become leaders. Unreadable files are skipped.
#[must_use]
pub fn find_similar(candidates: &[&DiscoveredFile], threshold: f64) -> Vec<SimilarityGroup> {
    // Load every candidate's text up front; failures drop the candidate.
    let contents: Vec<(PathBuf, String)> = candidates
        .iter()
        .filter_map(|file| match fs::read(&file.path) {
            Ok(bytes) => Some((
                file.path.clone(),
                String::from_utf8_lossy(&bytes).into_owned(),
            )),
            Err(e) => {
                log::warn!("Failed to read {}: {}", file.path.display(), e);
                None
            }
        })
        .collect();

    let mut processed = vec![false; contents.len()];
    let mut groups = Vec::new();

    for leader in 0..contents.len() {
        if processed[leader] {
            continue;
        }
        processed[leader] = true;

        let followers: Vec<usize> = ((leader + 1)..contents.len())
            .filter(|&j| !processed[j])
            .collect();

        // Ratios against the leader only; evaluation order does not affect
        // membership, so this is safe to parallelize.
        let ratios: Vec<(usize, f64)> = followers
            .par_iter()
            .map(|&j| (j, similarity_ratio(&contents[leader].1, &contents[j].1)))
            .collect();

        let mut members = vec![leader];
        for (j, ratio) in ratios {
            if ratio >= threshold {
                members.push(j);
                processed[j] = true;
            }
        }

        if members.len() < 2 {
            continue;
        }

        groups.push(SimilarityGroup {
            paths: members.iter().map(|&i| contents[i].0.clone()).collect(),
            average_similarity: mean_pairwise(&contents, &members),
        });
    }

    log::debug!("Similarity detector: {} group(s)", groups.len());
    groups
}

/// Mean ratio over all C(n, 2) member pairs.
fn mean_pairwise(contents: &[(PathBuf, String)], members: &[usize]) -> f64 {
    let mut sum = 0.0;
    let mut pairs = 0usize;
    for (i, &a) in members.iter().enumerate() {
        for &b in &members[i + 1..] {
            sum += similarity_ratio(&contents[a].1, &contents[b].1);
            pairs += 1;
        }
    }
    if pairs == 0 {
        0.0
    } else {
        sum / pairs as f64
    }
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

    /// Twenty distinct lines; `edit` replaces a slice with unique junk.
    fn variant(tag: &str, replaced: std::ops::Range<usize>) -> String {
        (0..20)
            .map(|i| {
                if replaced.contains(&i) {
                    format!("{tag} replacement line {i}\n")
                } else {
                    format!("common line number {i}\n")
                }
            })
            .collect()
    }

    #[test]
    fn test_identical_files_ratio_one() {
        assert!((similarity_ratio("a\nb\nc\n", "a\nb\nc\n") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_files_ratio_zero() {
        assert!(similarity_ratio("a\nb\n", "x\ny\n") < 1e-6);
    }

    #[test]
    fn test_identical_files_grouped() {
        let dir = TempDir::new().unwrap();
        let content = variant("", 0..0);
        let a = write_file(dir.path(), "a.txt", &content);
        let b = write_file(dir.path(), "b.txt", &content);

        let groups = find_similar(&[&a, &b], 0.9);
        assert_eq!(groups.len(), 1);
        assert!((groups[0].average_similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_below_threshold_not_grouped() {
        let dir = TempDir::new().unwrap();
        let a = write_file(dir.path(), "a.txt", &variant("a", 0..10));
        let b = write_file(dir.path(), "b.txt", &variant("b", 0..10));

        assert!(find_similar(&[&a, &b], 0.75).is_empty());
    }

    #[test]
    fn test_greedy_clustering_is_not_transitive() {
        let dir = TempDir::new().unwrap();
        // sim(A, B) = 0.8, sim(B, C) = 0.8, sim(A, C) = 0.6:
        // B shares 16/20 lines with both, A and C differ in 8 lines.
        let a = write_file(dir.path(), "a.txt", &variant("a", 0..4));
        let b = write_file(dir.path(), "b.txt", &variant("b", 20..20));
        let c = write_file(dir.path(), "c.txt", &variant("c", 4..8));

        let groups = find_similar(&[&a, &b, &c], 0.75);

        // A leads; B joins (0.8 >= 0.75); C is compared to leader A only
        // (0.6) and stays out despite matching B.
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paths.len(), 2);
        assert!(groups[0].paths[0].ends_with("a.txt"));
        assert!(groups[0].paths[1].ends_with("b.txt"));
    }

    #[test]
    fn test_average_is_mean_over_all_pairs() {
        let dir = TempDir::new().unwrap();
        // Three files pairwise >= threshold but not identical.
        let a = write_file(dir.path(), "a.txt", &variant("a", 0..1));
        let b = write_file(dir.path(), "b.txt", &variant("b", 1..2));
        let c = write_file(dir.path(), "c.txt", &variant("c", 2..3));

        let groups = find_similar(&[&a, &b, &c], 0.75);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paths.len(), 3);
        // Each pair shares 18/20 lines: ratio 0.9 for all three pairs.
        assert!((groups[0].average_similarity - 0.9).abs() < 1e-3);
    }

    #[test]
    fn test_leader_order_is_lexicographic_input_order() {
        let dir = TempDir::new().unwrap();
        let content = variant("", 0..0);
        let a = write_file(dir.path(), "a.txt", &content);
        let b = write_file(dir.path(), "b.txt", &content);
        let c = write_file(dir.path(), "c.txt", &content);

        let groups = find_similar(&[&a, &b, &c], 0.9);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].paths[0].ends_with("a.txt"));
        assert_eq!(groups[0].paths.len(), 3);
    }

    #[test]
    fn test_unreadable_candidate_skipped() {
        let dir = TempDir::new().unwrap();
        let content = variant("", 0..0);
        let a = write_file(dir.path(), "a.txt", &content);
        let b = write_file(dir.path(), "b.txt", &content);
        let ghost = DiscoveredFile::new(
            dir.path().join("gone.txt"),
            1,
            SystemTime::UNIX_EPOCH,
            false,
        );

        let groups = find_similar(&[&a, &b, &ghost], 0.9);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paths.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(find_similar(&[], 0.8).is_empty());
    }
}
