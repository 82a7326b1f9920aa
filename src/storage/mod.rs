//! On-disk record store for the corpus.
//!
//! Every article owns up to three files in a single directory, all keyed by
//! the decimal article id:
//!
//! ```text
//! assets/
//! ├── 1_raw.txt        # extracted body text
//! ├── 1_meta.json      # ArticleMeta
//! ├── 1_processed.txt  # annotated text
//! └── 2_raw.txt ...
//! ```
//!
//! Writes overwrite, so repeating a write for the same id is harmless.

pub mod validate;

use crate::errors::StorageError;
use crate::models::ArticleMeta;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

pub const RAW_SUFFIX: &str = "_raw.txt";
pub const META_SUFFIX: &str = "_meta.json";
pub const ANNOTATED_SUFFIX: &str = "_processed.txt";

static LEADING_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)").unwrap());

/// Parse the leading decimal id of a record file name.
///
/// Returns `None` when the name lacks `suffix` or does not start with digits.
pub fn record_id(file_name: &str, suffix: &str) -> Option<u32> {
    if !file_name.ends_with(suffix) {
        return None;
    }
    LEADING_ID
        .captures(file_name)
        .and_then(|c| c[1].parse::<u32>().ok())
}

/// Whether `file_name` is one of the three per-article record files.
pub fn is_record_file(file_name: &str) -> bool {
    [RAW_SUFFIX, META_SUFFIX, ANNOTATED_SUFFIX]
        .iter()
        .any(|suffix| record_id(file_name, suffix).is_some())
}

/// Reads and writes article records under one directory.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_path(&self, id: u32) -> PathBuf {
        self.root.join(format!("{id}{RAW_SUFFIX}"))
    }

    pub fn meta_path(&self, id: u32) -> PathBuf {
        self.root.join(format!("{id}{META_SUFFIX}"))
    }

    pub fn annotated_path(&self, id: u32) -> PathBuf {
        self.root.join(format!("{id}{ANNOTATED_SUFFIX}"))
    }

    /// Raw-text records keyed by id, with the file each id was read from.
    ///
    /// The id is the leading number of the file name, so `01_raw.txt` is
    /// listed as id 1 at its own path.
    #[instrument(level = "debug", skip_all, fields(root = %self.root.display()))]
    pub async fn list_raw(&self) -> Result<BTreeMap<u32, PathBuf>, StorageError> {
        let mut records = BTreeMap::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if let Some(id) = record_id(&name.to_string_lossy(), RAW_SUFFIX) {
                records.insert(id, entry.path());
            }
        }
        debug!(count = records.len(), "Listed raw-text records");
        Ok(records)
    }

    /// Ids that have a raw-text record.
    pub async fn list_ids(&self) -> Result<BTreeSet<u32>, StorageError> {
        Ok(self.list_raw().await?.into_keys().collect())
    }

    pub async fn read_raw(&self, id: u32) -> Result<String, StorageError> {
        self.read_raw_at(id, &self.raw_path(id)).await
    }

    /// Read the raw text of article `id` from a file found by [`list_raw`](Self::list_raw).
    pub async fn read_raw_at(&self, id: u32, path: &Path) -> Result<String, StorageError> {
        match fs::read_to_string(path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::RecordNotFound { id }),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove_raw(&self, id: u32) -> Result<(), StorageError> {
        fs::remove_file(self.raw_path(id)).await?;
        debug!(id, "Removed raw text");
        Ok(())
    }

    pub async fn write_raw(&self, id: u32, text: &str) -> Result<(), StorageError> {
        fs::write(self.raw_path(id), text).await?;
        debug!(id, bytes = text.len(), "Wrote raw text");
        Ok(())
    }

    pub async fn write_meta(&self, id: u32, meta: &ArticleMeta) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(meta)?;
        fs::write(self.meta_path(id), json).await?;
        debug!(id, "Wrote metadata");
        Ok(())
    }

    pub async fn write_annotated(&self, id: u32, text: &str) -> Result<(), StorageError> {
        fs::write(self.annotated_path(id), text).await?;
        debug!(id, bytes = text.len(), "Wrote annotated text");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;
    use tempfile::tempdir;

    #[test]
    fn test_record_id() {
        assert_eq!(record_id("7_raw.txt", RAW_SUFFIX), Some(7));
        assert_eq!(record_id("012_raw.txt", RAW_SUFFIX), Some(12));
        assert_eq!(record_id("7_meta.json", RAW_SUFFIX), None);
        assert_eq!(record_id("7_meta.json", META_SUFFIX), Some(7));
        assert_eq!(record_id("abc_raw.txt", RAW_SUFFIX), None);
        assert_eq!(record_id("7_processed.txt", RAW_SUFFIX), None);
    }

    #[test]
    fn test_is_record_file() {
        assert!(is_record_file("3_raw.txt"));
        assert!(is_record_file("3_meta.json"));
        assert!(is_record_file("3_processed.txt"));
        assert!(!is_record_file("notes_raw.txt"));
        assert!(!is_record_file("3.txt"));
        assert!(!is_record_file(".bashrc"));
    }

    #[tokio::test]
    async fn test_list_raw_keeps_file_paths() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        std::fs::write(dir.path().join("01_raw.txt"), "padded").unwrap();
        store.write_raw(2, "plain").await.unwrap();

        let records = store.list_raw().await.unwrap();
        assert_eq!(records[&1], dir.path().join("01_raw.txt"));
        assert_eq!(store.read_raw_at(1, &records[&1]).await.unwrap(), "padded");
        assert_eq!(store.read_raw_at(2, &records[&2]).await.unwrap(), "plain");
    }

    #[tokio::test]
    async fn test_raw_round_trip_and_overwrite() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        store.write_raw(7, "first version\n").await.unwrap();
        assert_eq!(store.read_raw(7).await.unwrap(), "first version\n");

        store.write_raw(7, "second version\n").await.unwrap();
        assert_eq!(store.read_raw(7).await.unwrap(), "second version\n");
    }

    #[tokio::test]
    async fn test_read_missing_record() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let err = store.read_raw(42).await.unwrap_err();
        assert!(matches!(err, StorageError::RecordNotFound { id: 42 }));
    }

    #[tokio::test]
    async fn test_list_ids_only_counts_raw_records() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let article = Article::new(2, None);

        store.write_raw(1, "a").await.unwrap();
        store.write_raw(2, "b").await.unwrap();
        store.write_meta(2, &article.meta()).await.unwrap();
        store.write_annotated(3, "c<S>()").await.unwrap();

        let ids: Vec<u32> = store.list_ids().await.unwrap().into_iter().collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_write_meta_is_json() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let mut article = Article::new(5, Some("https://example.com/5".to_string()));
        article.title = "Title".to_string();

        store.write_meta(5, &article.meta()).await.unwrap();
        let raw = std::fs::read_to_string(store.meta_path(5)).unwrap();
        let meta: ArticleMeta = serde_json::from_str(&raw).unwrap();
        assert_eq!(meta, article.meta());
    }
}
