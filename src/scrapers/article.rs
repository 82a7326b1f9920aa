//! Single-article extraction.
//!
//! Article pages are expected to carry:
//!
//! | Field | Selector | Notes |
//! |-------|----------|-------|
//! | body | `div.entry-content p` | each paragraph trimmed, one per line |
//! | title | `h1.entry-title` | first match |
//! | topics | `a[rel="tag"]` | document order |
//! | date | `time.entry-date` | `day.month.year`, e.g. `05.03.2021` |
//!
//! The author is never exposed by these pages and is stored as
//! [`UNKNOWN_AUTHOR`](crate::models::UNKNOWN_AUTHOR).

use super::Fetcher;
use crate::errors::ScrapeError;
use crate::models::Article;
use crate::storage::RecordStore;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("div.entry-content p").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1.entry-title").unwrap());
static TOPICS: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"a[rel="tag"]"#).unwrap());
static DATE: Lazy<Selector> = Lazy::new(|| Selector::parse("time.entry-date").unwrap());

pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Fetches article pages and persists what it extracts.
#[derive(Debug)]
pub struct ArticleParser<'a, F> {
    fetcher: &'a F,
    store: &'a RecordStore,
    delay: Duration,
}

impl<'a, F: Fetcher> ArticleParser<'a, F> {
    pub fn new(fetcher: &'a F, store: &'a RecordStore, delay: Duration) -> Self {
        Self {
            fetcher,
            store,
            delay,
        }
    }

    /// Fetch `url`, build the [`Article`] with the given `id`, and write its
    /// raw text and metadata records.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::Fetch`] if the page cannot be fetched,
    /// [`ScrapeError::DateFormat`] if the date element is malformed, and
    /// [`ScrapeError::Storage`] if either record cannot be written. A raw-text
    /// record whose metadata could not be written is removed again.
    ///
    /// The pause after the fetch happens whether or not the fetch succeeded.
    #[instrument(level = "info", skip_all, fields(%url, id = id))]
    pub async fn extract(&self, url: &str, id: u32) -> Result<Article, ScrapeError> {
        let fetched = self.fetcher.fetch(url).await;
        sleep(self.delay).await;
        let html = fetched?;

        let article = parse_article(&html, url, id)?;
        self.store.write_raw(id, &article.raw_text).await?;
        if let Err(e) = self.store.write_meta(id, &article.meta()).await {
            if let Err(cleanup) = self.store.remove_raw(id).await {
                warn!(error = %cleanup, "Cannot remove unpaired raw-text record");
            }
            return Err(e.into());
        }

        info!(
            title = %article.title,
            bytes = article.raw_text.len(),
            topics = article.topics.len(),
            "Extracted article"
        );
        Ok(article)
    }
}

/// Build an [`Article`] from a fetched page.
pub fn parse_article(html: &str, url: &str, id: u32) -> Result<Article, ScrapeError> {
    let document = Html::parse_document(html);
    let mut article = Article::new(id, Some(url.to_string()));

    for paragraph in document.select(&PARAGRAPHS) {
        article.raw_text.push_str(element_text(paragraph).trim());
        article.raw_text.push('\n');
    }

    article.title = document
        .select(&TITLE)
        .next()
        .map(|title| element_text(title).trim().to_string())
        .unwrap_or_default();

    article.topics = document.select(&TOPICS).map(element_text).collect();

    article.date = document
        .select(&DATE)
        .next()
        .map(|date| unify_date_format(&element_text(date)))
        .transpose()?;

    Ok(article)
}

/// Parse a `day.month.year` date such as `05.03.2021`.
pub fn unify_date_format(raw: &str) -> Result<NaiveDate, ScrapeError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| ScrapeError::DateFormat {
        raw: raw.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}
