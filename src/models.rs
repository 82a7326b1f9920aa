//! Data models for corpus articles and their annotated representations.
//!
//! - [`Article`]: one corpus entry, either freshly extracted or rediscovered from disk
//! - [`ArticleMeta`]: the metadata record persisted next to the raw text
//! - [`AnnotatedToken`]: one surface token with its lemma and two tag sets

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Sentinel stored as the author, since the source pages never expose one.
pub const UNKNOWN_AUTHOR: &str = "NOT FOUND";

/// A news article in the corpus.
///
/// The `id` is fixed at construction. `raw_text` is filled once by the
/// extractor (or read back from the store before annotation); the annotation
/// stage only ever sets `annotated_text`.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    id: u32,
    /// The source URL, absent for articles rediscovered from disk.
    pub url: Option<String>,
    pub title: String,
    pub author: String,
    /// Publication date, absent when the page did not carry one.
    pub date: Option<NaiveDate>,
    pub topics: Vec<String>,
    /// Body text, one paragraph per line.
    pub raw_text: String,
    /// Space-joined token renderings, present after annotation.
    pub annotated_text: Option<String>,
    /// Raw-text record this article was rediscovered from.
    pub raw_path: Option<PathBuf>,
}

impl Article {
    /// Create an empty article for `id`.
    pub fn new(id: u32, url: Option<String>) -> Self {
        Self {
            id,
            url,
            title: String::new(),
            author: UNKNOWN_AUTHOR.to_string(),
            date: None,
            topics: Vec::new(),
            raw_text: String::new(),
            annotated_text: None,
            raw_path: None,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Project the persisted metadata fields.
    pub fn meta(&self) -> ArticleMeta {
        ArticleMeta {
            id: self.id,
            url: self.url.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            date: self.date,
            topics: self.topics.clone(),
        }
    }
}

/// Metadata record written as `{id}_meta.json`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArticleMeta {
    pub id: u32,
    pub url: Option<String>,
    pub title: String,
    pub author: String,
    /// Serialized as `YYYY-MM-DD`.
    pub date: Option<NaiveDate>,
    pub topics: Vec<String>,
}

/// A surface token annotated by both taggers.
///
/// Rendered as `lemma<primary_tags>(secondary_tags)`; an empty secondary
/// field means the context-free tagger had no analysis for the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedToken {
    pub original_word: String,
    pub normalized_form: String,
    pub tags_primary: String,
    pub tags_secondary: String,
}

impl fmt::Display for AnnotatedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}<{}>({})",
            self.normalized_form, self.tags_primary, self.tags_secondary
        )
    }
}
