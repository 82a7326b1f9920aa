//! Article URL discovery from seed pages.
//!
//! A seed page lists articles as `h1.entry-title` headings, each wrapping a
//! link to the article:
//!
//! ```html
//! <h1 class="entry-title"><a href="/2021/03/05/some-story/">Some story</a></h1>
//! ```
//!
//! Links are resolved against the seed URL and deduplicated by the resolved
//! URL string.

use super::Fetcher;
use crate::errors::ScrapeError;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1.entry-title").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Discovers article URLs by visiting seed pages in order.
#[derive(Debug)]
pub struct Crawler<'a, F> {
    fetcher: &'a F,
    delay: Duration,
    seeds_to_visit: Option<usize>,
}

impl<'a, F: Fetcher> Crawler<'a, F> {
    /// Create a crawler that pauses for `delay` after each seed fetch and
    /// visits every seed it is given.
    pub fn new(fetcher: &'a F, delay: Duration) -> Self {
        Self {
            fetcher,
            delay,
            seeds_to_visit: None,
        }
    }

    /// Visit only the first `limit` seeds (`None` visits all of them).
    pub fn with_seed_limit(mut self, limit: Option<usize>) -> Self {
        self.seeds_to_visit = limit;
        self
    }

    /// Collect at most `max_total` distinct article URLs, taking at most
    /// `max_per_seed` headings from each visited seed.
    ///
    /// # Errors
    ///
    /// A seed that cannot be fetched aborts the whole crawl with
    /// [`ScrapeError::Fetch`]; no partial result is returned.
    #[instrument(level = "info", skip_all, fields(seeds = seed_urls.len(), max_total = max_total, max_per_seed = max_per_seed))]
    pub async fn discover(
        &self,
        seed_urls: &[String],
        max_total: usize,
        max_per_seed: usize,
    ) -> Result<Vec<String>, ScrapeError> {
        let limit = self.seeds_to_visit.unwrap_or(seed_urls.len());
        let mut urls: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for seed in seed_urls.iter().take(limit) {
            if urls.len() >= max_total {
                debug!(%seed, "Article cap reached; not visiting remaining seeds");
                break;
            }

            let fetched = self.fetcher.fetch(seed).await;
            sleep(self.delay).await;
            let html = fetched?;

            let mut added = 0usize;
            for link in article_links(&html, seed, max_per_seed) {
                if urls.len() >= max_total {
                    break;
                }
                if seen.insert(link.clone()) {
                    urls.push(link);
                    added += 1;
                }
            }
            info!(%seed, added, total = urls.len(), "Crawled seed page");
        }

        if let Some(skipped) = seed_urls.len().checked_sub(limit).filter(|n| *n > 0) {
            debug!(skipped, "Seeds beyond the visit limit were not crawled");
        }
        info!(count = urls.len(), "Discovered article URLs");
        Ok(urls)
    }
}

/// Extract article links from the first `max_per_seed` headings of a seed page.
///
/// Headings without a usable link are skipped but still use up a slot.
pub fn article_links(html: &str, seed_url: &str, max_per_seed: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = Url::parse(seed_url).ok();

    document
        .select(&HEADING)
        .take(max_per_seed)
        .filter_map(|heading| {
            let href = heading.select(&LINK).next()?.value().attr("href")?;
            let resolved = match &base {
                Some(base) => base.join(href),
                None => Url::parse(href),
            };
            match resolved {
                Ok(mut url) => {
                    url.set_fragment(None);
                    Some(url.to_string())
                }
                Err(e) => {
                    warn!(%href, error = %e, "Skipping unresolvable article link");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::testing::StaticFetcher;

    fn seed_page(hrefs: &[&str]) -> String {
        let headings: String = hrefs
            .iter()
            .map(|h| format!(r#"<h1 class="entry-title"><a href="{h}">Story</a></h1>"#))
            .collect();
        format!(
            r#"<html><body><h1 class="site-title"><a href="/">Site</a></h1>{headings}</body></html>"#
        )
    }

    fn seeds(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_article_links_resolves_and_caps() {
        let html = seed_page(&["/a/", "https://other.example/b/", "/c/#comments", "/d/"]);
        let links = article_links(&html, "https://news.example/", 3);
        assert_eq!(
            links,
            vec![
                "https://news.example/a/",
                "https://other.example/b/",
                "https://news.example/c/",
            ]
        );
    }

    #[test]
    fn test_heading_without_link_uses_a_slot() {
        let html = r#"<h1 class="entry-title">No link</h1><h1 class="entry-title"><a href="/x/">X</a></h1>"#;
        assert!(article_links(html, "https://news.example/", 1).is_empty());
        assert_eq!(article_links(html, "https://news.example/", 2), vec!["https://news.example/x/"]);
    }

    #[tokio::test]
    async fn test_zero_total_returns_nothing() {
        let fetcher = StaticFetcher::default().with_page("https://news.example/", &seed_page(&["/a/"]));
        let crawler = Crawler::new(&fetcher, Duration::ZERO);
        let urls = crawler
            .discover(&seeds(&["https://news.example/"]), 0, 10)
            .await
            .unwrap();
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn test_empty_seed_list() {
        let fetcher = StaticFetcher::default();
        let crawler = Crawler::new(&fetcher, Duration::ZERO);
        assert!(crawler.discover(&[], 10, 10).await.unwrap().is_empty());
        assert!(fetcher.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_caps_per_seed_and_total() {
        let fetcher = StaticFetcher::default()
            .with_page("https://news.example/1", &seed_page(&["/a/", "/b/", "/c/"]))
            .with_page("https://news.example/2", &seed_page(&["/d/", "/e/", "/f/"]));
        let crawler = Crawler::new(&fetcher, Duration::ZERO);

        let urls = crawler
            .discover(&seeds(&["https://news.example/1", "https://news.example/2"]), 3, 2)
            .await
            .unwrap();
        assert_eq!(
            urls,
            vec![
                "https://news.example/a/",
                "https://news.example/b/",
                "https://news.example/d/",
            ]
        );
    }

    #[tokio::test]
    async fn test_visits_all_seeds_by_default() {
        let fetcher = StaticFetcher::default()
            .with_page("https://news.example/1", &seed_page(&["/a/"]))
            .with_page("https://news.example/2", &seed_page(&["/b/"]));
        let crawler = Crawler::new(&fetcher, Duration::ZERO);

        let urls = crawler
            .discover(&seeds(&["https://news.example/1", "https://news.example/2"]), 10, 10)
            .await
            .unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(fetcher.requests.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_seed_limit_of_one_stops_after_first_seed() {
        let fetcher = StaticFetcher::default()
            .with_page("https://news.example/1", &seed_page(&["/a/"]))
            .with_page("https://news.example/2", &seed_page(&["/b/"]));
        let crawler = Crawler::new(&fetcher, Duration::ZERO).with_seed_limit(Some(1));

        let urls = crawler
            .discover(&seeds(&["https://news.example/1", "https://news.example/2"]), 10, 10)
            .await
            .unwrap();
        assert_eq!(urls, vec!["https://news.example/a/"]);
        assert_eq!(*fetcher.requests.borrow(), vec!["https://news.example/1"]);
    }

    #[tokio::test]
    async fn test_dedup_by_resolved_url() {
        let fetcher = StaticFetcher::default()
            .with_page("https://news.example/1", &seed_page(&["/a/", "https://news.example/a/"]))
            .with_page("https://news.example/2", &seed_page(&["/a/#top", "/b/"]));
        let crawler = Crawler::new(&fetcher, Duration::ZERO);

        let urls = crawler
            .discover(&seeds(&["https://news.example/1", "https://news.example/2"]), 10, 10)
            .await
            .unwrap();
        assert_eq!(urls, vec!["https://news.example/a/", "https://news.example/b/"]);
    }

    #[tokio::test]
    async fn test_seed_fetch_failure_is_fatal() {
        let fetcher = StaticFetcher::default().with_page("https://news.example/1", &seed_page(&["/a/"]));
        let crawler = Crawler::new(&fetcher, Duration::ZERO);

        let err = crawler
            .discover(&seeds(&["https://news.example/1", "https://news.example/missing"]), 10, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }));
    }
}
