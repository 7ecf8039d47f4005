use std::fs;
use std::io::{self, Write};
use std::path::Path;

use episode_core::HarvestEntry;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Bare direct URLs, one per line, the import format of download managers.
pub fn render_link_list(entries: &[HarvestEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{}\n", entry.direct_url))
        .collect()
}

/// `"<episode>: <url>"` lines.
pub fn render_labeled_list(entries: &[HarvestEntry]) -> String {
    entries.iter().map(|entry| format!("{entry}\n")).collect()
}

/// Atomically writes `content` to `path` by writing a sibling temp file then renaming.
pub fn write_atomically(path: &Path, content: &str) -> Result<(), PersistError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}
