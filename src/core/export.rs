//! PF-016: Export: atomic file writes, the output manifest, drift checks.
//!
//! Each file is written to a temp sibling and renamed into place, so a reader
//! never sees a half-written program. A file set is not transactional: an
//! error part way leaves the files already renamed.

use super::error::GenerationError;
use super::types::{FileEntry, Manufacturer, OutputManifest, Regime};
use crate::emitters::join_lines;
use crate::provenance::eventlog::STATE_DIR;
use crate::provenance::hasher;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Manifest file name inside the state directory.
pub const MANIFEST_FILE: &str = "postforge.lock.yaml";

/// One file written by `export`.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub name: String,
    pub path: PathBuf,
    /// Stable hash (timestamp lines excluded)
    pub hash: String,
    pub lines: usize,
}

/// Write `content` to `path` atomically (write to temp, then rename).
pub fn write_file_atomic(path: &Path, content: &str) -> Result<(), GenerationError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GenerationError::io(parent, e))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, content).map_err(|e| GenerationError::io(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| GenerationError::io(path, e))?;
    Ok(())
}

/// Write every file of an emission into `dir`. Stops at the first failure.
pub fn export(
    files: &IndexMap<String, Vec<String>>,
    dir: &Path,
) -> Result<Vec<ExportedFile>, GenerationError> {
    let mut written = Vec::with_capacity(files.len());
    for (name, lines) in files {
        let path = dir.join(name);
        write_file_atomic(&path, &join_lines(lines))?;
        tracing::debug!(path = %path.display(), lines = lines.len(), "wrote file");
        written.push(ExportedFile {
            name: name.clone(),
            path,
            hash: hasher::stable_hash(lines),
            lines: lines.len(),
        });
    }
    Ok(written)
}

/// Derive the manifest path for an output directory.
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(STATE_DIR).join(MANIFEST_FILE)
}

/// Build the manifest describing one export.
pub fn new_manifest(
    job: &str,
    manufacturer: Manufacturer,
    generated_at: &str,
    regime: Regime,
    instruction_count: usize,
    files: &[ExportedFile],
) -> OutputManifest {
    OutputManifest {
        schema: "1.0".to_string(),
        job: job.to_string(),
        manufacturer,
        generated_at: generated_at.to_string(),
        generator: format!("postforge {}", env!("CARGO_PKG_VERSION")),
        regime,
        instruction_count,
        files: files
            .iter()
            .map(|f| {
                (
                    f.name.clone(),
                    FileEntry {
                        hash: f.hash.clone(),
                        lines: f.lines,
                    },
                )
            })
            .collect(),
    }
}

/// Load the manifest of an output directory. Returns None if there is none.
pub fn load_manifest(dir: &Path) -> Result<Option<OutputManifest>, GenerationError> {
    let path = manifest_path(dir);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path).map_err(|e| GenerationError::io(&path, e))?;
    let manifest = serde_yaml_ng::from_str(&content).map_err(|e| {
        GenerationError::Parse(format!("invalid manifest {}: {}", path.display(), e))
    })?;
    Ok(Some(manifest))
}

/// Save the manifest atomically.
pub fn save_manifest(dir: &Path, manifest: &OutputManifest) -> Result<(), GenerationError> {
    let yaml = serde_yaml_ng::to_string(manifest)
        .map_err(|e| GenerationError::Parse(format!("serialize error: {}", e)))?;
    write_file_atomic(&manifest_path(dir), &yaml)
}

/// State of one manifest entry on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Unchanged,
    Modified { actual: String },
    Missing,
}

/// Compare each manifest entry against the file on disk.
pub fn check_files(dir: &Path, manifest: &OutputManifest) -> Vec<(String, FileStatus)> {
    manifest
        .files
        .iter()
        .map(|(name, entry)| {
            let path = dir.join(name);
            let status = if !path.exists() {
                FileStatus::Missing
            } else {
                match hasher::stable_hash_file(&path) {
                    Ok(actual) if actual == entry.hash => FileStatus::Unchanged,
                    Ok(actual) => FileStatus::Modified { actual },
                    Err(e) => FileStatus::Modified {
                        actual: format!("ERROR:{}", e),
                    },
                }
            };
            (name.clone(), status)
        })
        .collect()
}
