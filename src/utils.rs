//! Utility functions for logging and corpus directory preparation.

use crate::errors::StorageError;
use crate::storage::is_record_file;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` bytes (backing off to a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Prepare an empty, writable corpus directory.
///
/// Record files of a previous corpus at `path` are removed so that the new
/// crawl's ids start from 1 without stale records. The directory is created
/// if missing and probed with a throwaway file.
///
/// # Errors
///
/// [`StorageError::ForeignEntry`] if `path` holds anything other than corpus
/// record files, in which case nothing is removed. [`StorageError::Io`] if
/// the directory cannot be cleared, created, or written to.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn prepare_environment(path: &Path) -> Result<(), StorageError> {
    if path.exists() {
        let mut stale = Vec::new();
        let mut entries = fs::read_dir(path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !entry.file_type().await?.is_file() || !is_record_file(&name) {
                return Err(StorageError::ForeignEntry {
                    dir: path.display().to_string(),
                    entry: name,
                });
            }
            stale.push(entry.path());
        }
        if !stale.is_empty() {
            warn!(records = stale.len(), "Removing previous corpus records");
        }
        for file in stale {
            fs::remove_file(file).await?;
        }
    }
    fs::create_dir_all(path).await?;

    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Corpus directory is ready");
    Ok(())
}
