//! Rediscovery of stored articles from a corpus directory.

use crate::errors::DatasetError;
use crate::models::Article;
use crate::storage::RecordStore;
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Index of the articles present in a record store.
///
/// Callers are expected to run
/// [`validate_dataset`](crate::storage::validate::validate_dataset) first;
/// `load` only checks that the directory holds something it recognizes.
#[derive(Debug, Clone)]
pub struct CorpusManager {
    store: RecordStore,
}

impl CorpusManager {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Build an id-keyed map of article shells, one per raw-text record.
    ///
    /// Shells carry only the id and the path of their raw-text record: no url,
    /// metadata, or text. The raw text is read later by whoever annotates the
    /// article.
    ///
    /// # Errors
    ///
    /// [`DatasetError::UnknownDataset`] if the directory cannot be scanned or
    /// holds no raw-text records.
    #[instrument(level = "info", skip_all, fields(root = %self.store.root().display()))]
    pub async fn load(&self) -> Result<BTreeMap<u32, Article>, DatasetError> {
        let unknown = || DatasetError::UnknownDataset(self.store.root().display().to_string());

        let records = self.store.list_raw().await.map_err(|_| unknown())?;
        if records.is_empty() {
            return Err(unknown());
        }

        let articles: BTreeMap<u32, Article> = records
            .into_iter()
            .map(|(id, path)| {
                let mut shell = Article::new(id, None);
                shell.raw_path = Some(path);
                (id, shell)
            })
            .collect();
        info!(count = articles.len(), "Registered corpus articles");
        Ok(articles)
    }
}
