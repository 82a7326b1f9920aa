//! Crawling and article extraction for entry-title style news sites.
//!
//! Scraping follows a two-phase pattern:
//!
//! 1. **Discovery** ([`crawler`]): walk the seed pages and collect article URLs
//! 2. **Extraction** ([`article`]): fetch each URL, parse text and metadata,
//!    and persist them to the record store
//!
//! Both phases fetch through the [`Fetcher`] trait, so the HTTP client and its
//! identity header are passed in explicitly. Everything runs sequentially with
//! a fixed pause after each request.

pub mod article;
pub mod crawler;

#[cfg(test)]
pub mod testing;

use crate::config::CrawlerConfig;
use crate::errors::ScrapeError;
use crate::storage::RecordStore;
use article::ArticleParser;
use crawler::Crawler;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Capability to fetch a page body by URL.
pub trait Fetcher {
    /// Fetch `url` and return its body, or [`ScrapeError::Fetch`] on any
    /// transport failure or non-success status.
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

/// [`Fetcher`] backed by a `reqwest` client with a fixed user agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(ScrapeError::Client)?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let t0 = Instant::now();
        let fail = |e: reqwest::Error| ScrapeError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(fail)?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Fetch returned non-success status");
            return Err(ScrapeError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }
        let body = response.text().await.map_err(fail)?;
        debug!(bytes = body.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "Fetched page");
        Ok(body)
    }
}

/// Outcome counts of one crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub discovered: usize,
    pub extracted: usize,
    pub failed: usize,
}

/// Discover article URLs and extract each one into `store`.
///
/// Ids are handed out from 1 in order of successful extraction, so a failed
/// article never leaves a gap in the corpus.
///
/// # Errors
///
/// Discovery failures and storage failures are returned. An article that
/// cannot be fetched or carries a malformed date is logged and skipped.
#[instrument(level = "info", skip_all, fields(root = %store.root().display()))]
pub async fn build_corpus<F: Fetcher>(
    fetcher: &F,
    store: &RecordStore,
    config: &CrawlerConfig,
) -> Result<CrawlSummary, ScrapeError> {
    let crawler = Crawler::new(fetcher, config.request_delay).with_seed_limit(config.seeds_to_visit);
    let urls = crawler
        .discover(
            &config.base_urls,
            config.total_articles,
            config.max_articles_per_seed,
        )
        .await?;

    let parser = ArticleParser::new(fetcher, store, config.request_delay);
    let mut summary = CrawlSummary {
        discovered: urls.len(),
        ..CrawlSummary::default()
    };
    let mut next_id: u32 = 1;

    for url in &urls {
        match parser.extract(url, next_id).await {
            Ok(_) => {
                summary.extracted += 1;
                next_id += 1;
            }
            Err(e @ ScrapeError::Storage(_)) => {
                error!(%url, error = %e, "Cannot store article; aborting crawl");
                return Err(e);
            }
            Err(e) => {
                error!(%url, error = %e, "Article extraction failed; skipping");
                summary.failed += 1;
            }
        }
    }

    info!(
        discovered = summary.discovered,
        extracted = summary.extracted,
        failed = summary.failed,
        "Crawl complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_USER_AGENT;
    use crate::storage::validate::validate_dataset;
    use std::time::Duration;
    use super::testing::StaticFetcher;

    fn article_page(title: &str, date: &str) -> String {
        format!(
            r#"<h1 class="entry-title">{title}</h1><time class="entry-date">{date}</time>
               <div class="entry-content"><p>{title} body.</p></div>"#
        )
    }

    fn config(total: usize) -> CrawlerConfig {
        CrawlerConfig {
            base_urls: vec!["https://news.example/".to_string()],
            total_articles: total,
            max_articles_per_seed: 10,
            seeds_to_visit: None,
            request_delay: Duration::ZERO,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    #[tokio::test]
    async fn test_build_corpus_skips_failures_without_gaps() {
        let seed = r#"
            <h1 class="entry-title"><a href="/one/">1</a></h1>
            <h1 class="entry-title"><a href="/gone/">2</a></h1>
            <h1 class="entry-title"><a href="/bad-date/">3</a></h1>
            <h1 class="entry-title"><a href="/four/">4</a></h1>
        "#;
        let fetcher = StaticFetcher::default()
            .with_page("https://news.example/", seed)
            .with_page("https://news.example/one/", &article_page("One", "01.02.2021"))
            .with_page("https://news.example/bad-date/", &article_page("Bad", "yesterday"))
            .with_page("https://news.example/four/", &article_page("Four", "04.02.2021"));

        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let summary = build_corpus(&fetcher, &store, &config(10)).await.unwrap();

        assert_eq!(
            summary,
            CrawlSummary {
                discovered: 4,
                extracted: 2,
                failed: 2
            }
        );
        assert_eq!(store.read_raw(1).await.unwrap(), "One body.\n");
        assert_eq!(store.read_raw(2).await.unwrap(), "Four body.\n");
        assert!(validate_dataset(dir.path()).is_ok());
    }

    #[tokio::test]
    async fn test_build_corpus_propagates_seed_failure() {
        let fetcher = StaticFetcher::default();
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        let err = build_corpus(&fetcher, &store, &config(10)).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_build_corpus_pauses_after_failed_articles() {
        let seed = r#"
            <h1 class="entry-title"><a href="/gone-1/">1</a></h1>
            <h1 class="entry-title"><a href="/gone-2/">2</a></h1>
            <h1 class="entry-title"><a href="/gone-3/">3</a></h1>
        "#;
        let fetcher = StaticFetcher::default().with_page("https://news.example/", seed);
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let delay = Duration::from_millis(30);
        let config = CrawlerConfig {
            request_delay: delay,
            ..config(10)
        };

        let started = std::time::Instant::now();
        let summary = build_corpus(&fetcher, &store, &config).await.unwrap();
        assert_eq!(summary.failed, 3);
        assert_eq!(fetcher.requests.borrow().len(), 4);
        assert!(started.elapsed() >= delay * 4);
    }

    #[tokio::test]
    async fn test_build_corpus_storage_failure_is_fatal() {
        let seed = r#"<h1 class="entry-title"><a href="/one/">1</a></h1>"#;
        let fetcher = StaticFetcher::default()
            .with_page("https://news.example/", seed)
            .with_page("https://news.example/one/", &article_page("One", "01.02.2021"));
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("never-created"));

        let err = build_corpus(&fetcher, &store, &config(10)).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Storage(_)));
    }

    #[test]
    fn test_invalid_user_agent_is_a_client_error() {
        let err = HttpFetcher::new("bad\nagent").unwrap_err();
        assert!(matches!(err, ScrapeError::Client(_)));
        assert!(err.to_string().starts_with("Cannot build HTTP client"));
    }
}
