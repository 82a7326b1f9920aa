//! Error types for every stage of the corpus pipeline.
//!
//! Errors are grouped by the layer that raises them:
//!
//! | Enum | Raised by | Fatal? |
//! |------|-----------|--------|
//! | [`DatasetError`] | dataset validation, corpus rediscovery | yes, before any pipeline work |
//! | [`StorageError`] | the record store | per record |
//! | [`ScrapeError`] | crawling and article extraction | yes, except fetch and date errors of a single article |
//! | [`ConfigError`] | crawler config validation | yes |
//! | [`TaggerError`] | morphological taggers | per article |
//! | [`PipelineError`] | the annotation stage | per article |

use thiserror::Error;

/// Corpus-level failures detected while checking or scanning a dataset directory.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset path not found: {0}")]
    PathNotFound(String),

    #[error("Dataset path is not a directory: {0}")]
    NotADirectory(String),

    #[error("Dataset directory is empty: {0}")]
    EmptyDirectory(String),

    #[error("Inconsistent dataset: {0}")]
    InconsistentDataset(String),

    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reading or writing individual records.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found for article {id}")]
    RecordNotFound { id: u32 },

    #[error("Refusing to clear {dir}: {entry} is not a corpus record")]
    ForeignEntry { dir: String, entry: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while discovering or extracting articles.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Date does not match day.month.year: {raw:?}")]
    DateFormat { raw: String },

    #[error("Cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Crawler configuration problems, one kind per rule.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Incorrect base_urls: {0}")]
    IncorrectUrl(String),

    #[error("total_articles_to_find_and_parse out of range: {0} > {max}", max = crate::config::MAX_TOTAL_ARTICLES)]
    NumberOfArticlesOutOfRange(u64),

    #[error("Incorrect number of articles: {0}")]
    IncorrectNumberOfArticles(String),

    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse config: {0}")]
    Parse(String),
}

/// Failures of a morphological tagger backend.
#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("Tagger binary not found: {0}")]
    ToolNotFound(String),

    #[error("Tagger failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed tagger output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the annotation stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Tagger(#[from] TaggerError),
}
