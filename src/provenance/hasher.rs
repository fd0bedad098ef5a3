//! PF-013: BLAKE3 hashing of generated files.
//!
//! `stable_hash` ignores banner lines so two exports of the same job compare
//! equal regardless of when they ran.

use crate::emitters::is_timestamp_line;
use std::path::Path;

/// Hash lines, skipping timestamp lines. Returns `"blake3:{hex}"`.
pub fn stable_hash(lines: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();
    for line in lines.iter().filter(|l| !is_timestamp_line(l)) {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    format!("blake3:{}", hasher.finalize().to_hex())
}

/// Stable hash of a file on disk.
pub fn stable_hash_file(path: &Path) -> Result<String, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    Ok(stable_hash(&lines))
}
