//! Dataset validation run before any pipeline work touches a corpus.

use super::{META_SUFFIX, RAW_SUFFIX, record_id};
use crate::errors::DatasetError;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

/// Check that `path` holds a consistent corpus.
///
/// # Errors
///
/// - [`DatasetError::PathNotFound`] if `path` does not exist
/// - [`DatasetError::NotADirectory`] if it is not a directory
/// - [`DatasetError::EmptyDirectory`] if it has no entries
/// - [`DatasetError::InconsistentDataset`] if raw and metadata records are not
///   paired 1:1, or the raw ids are not a contiguous range without duplicates
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn validate_dataset(path: &Path) -> Result<(), DatasetError> {
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(DatasetError::PathNotFound(shown));
    }
    if !path.is_dir() {
        return Err(DatasetError::NotADirectory(shown));
    }

    let names = fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>, _>>()?;
    if names.is_empty() {
        return Err(DatasetError::EmptyDirectory(shown));
    }

    let raw_names: Vec<&String> = names.iter().filter(|n| n.ends_with(RAW_SUFFIX)).collect();
    let meta_names: Vec<&String> = names.iter().filter(|n| n.ends_with(META_SUFFIX)).collect();

    if raw_names.is_empty() && meta_names.is_empty() {
        return Err(DatasetError::InconsistentDataset(
            "no raw-text or metadata records".to_string(),
        ));
    }
    if raw_names.len() != meta_names.len() {
        return Err(DatasetError::InconsistentDataset(format!(
            "{} raw-text records but {} metadata records",
            raw_names.len(),
            meta_names.len()
        )));
    }

    let raw_ids = ids_of(&raw_names, RAW_SUFFIX)?;
    let meta_ids = ids_of(&meta_names, META_SUFFIX)?;

    if let Some(dup) = raw_ids.iter().duplicates().next() {
        return Err(DatasetError::InconsistentDataset(format!(
            "duplicate raw-text id {dup}"
        )));
    }

    let (min_id, max_id) = raw_ids
        .iter()
        .copied()
        .minmax()
        .into_option()
        .ok_or_else(|| DatasetError::InconsistentDataset("no raw-text records".to_string()))?;
    if (max_id - min_id) as usize + 1 != raw_ids.len() {
        return Err(DatasetError::InconsistentDataset(format!(
            "raw-text ids {min_id}..={max_id} have gaps"
        )));
    }

    let raw_set: BTreeSet<u32> = raw_ids.into_iter().collect();
    let meta_set: BTreeSet<u32> = meta_ids.into_iter().collect();
    if raw_set != meta_set {
        let unpaired = raw_set.symmetric_difference(&meta_set).join(", ");
        return Err(DatasetError::InconsistentDataset(format!(
            "raw-text and metadata ids differ at {unpaired}"
        )));
    }

    info!(records = raw_set.len(), min_id, max_id, "Dataset is valid");
    Ok(())
}

fn ids_of(names: &[&String], suffix: &str) -> Result<Vec<u32>, DatasetError> {
    names
        .iter()
        .map(|name| {
            record_id(name, suffix).ok_or_else(|| {
                DatasetError::InconsistentDataset(format!("{name} has no numeric id prefix"))
            })
        })
        .collect()
}
