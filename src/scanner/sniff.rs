//! Binary-content heuristic.
//!
//! A file is considered binary if its first 1 KiB contains a NUL byte.
//! This is best-effort bookkeeping, not authoritative detection: UTF-16
//! text trips it and NUL-free binaries evade it. The scanner uses it only
//! for counters and annotations, never for filtering.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of bytes sampled from the start of each file.
pub const SNIFF_LEN: usize = 1024;

/// Check whether the file at `path` looks binary.
///
/// Returns `Ok(true)` if a NUL byte appears within the first [`SNIFF_LEN`]
/// bytes. IO errors propagate to the caller, which decides whether to skip
/// or count them.
pub fn is_binary(path: &Path) -> std::io::Result<bool> {
    let mut file = File::open(path)?;
    let mut buf = [0u8; SNIFF_LEN];
    let n = file.read(&mut buf)?;
    Ok(buf[..n].contains(&0))
}
