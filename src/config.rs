//! Crawler configuration loading and validation.
//!
//! The config file is JSON (or YAML, chosen by a `.yaml`/`.yml` extension):
//!
//! ```json
//! {
//!   "base_urls": ["https://news.example.com/"],
//!   "total_articles_to_find_and_parse": 10,
//!   "max_number_articles_to_get_from_one_seed": 5,
//!   "seeds_to_visit": 1,
//!   "request_delay_secs": 5,
//!   "user_agent": "Mozilla/5.0 ..."
//! }
//! ```
//!
//! The file is read into an untyped value first so each rule can report its
//! own [`ConfigError`] kind instead of a generic deserialization failure.

use crate::errors::ConfigError;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Upper bound for `total_articles_to_find_and_parse`.
pub const MAX_TOTAL_ARTICLES: u64 = 101;

pub const DEFAULT_REQUEST_DELAY_SECS: u64 = 5;

/// Identity sent with every request unless the config overrides it.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/88.0.4324.111 YaBrowser/21.2.1.107 Yowser/2.5 Safari/537.36";

/// Validated crawler settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlerConfig {
    pub base_urls: Vec<String>,
    pub total_articles: usize,
    pub max_articles_per_seed: usize,
    /// How many seeds to visit; `None` visits all of them.
    pub seeds_to_visit: Option<usize>,
    pub request_delay: Duration,
    pub user_agent: String,
}

/// Read and validate a crawler config file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<CrawlerConfig, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let value: Value = if is_yaml {
        serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
    } else {
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
    };

    let config = validate_config(&value)?;
    info!(
        seeds = config.base_urls.len(),
        total = config.total_articles,
        per_seed = config.max_articles_per_seed,
        "Loaded crawler config"
    );
    Ok(config)
}

/// Validate an already-parsed config value.
///
/// Rules are checked in a fixed order: seed URLs, then the total range, then
/// presence and type of both counts.
pub fn validate_config(value: &Value) -> Result<CrawlerConfig, ConfigError> {
    let base_urls = match value.get("base_urls") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) if Url::parse(s).is_ok() => Ok(s.clone()),
                Value::String(s) => Err(ConfigError::IncorrectUrl(format!("not an absolute URL: {s}"))),
                other => Err(ConfigError::IncorrectUrl(format!("not a string: {other}"))),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ConfigError::IncorrectUrl("expected a list".to_string())),
        None => return Err(ConfigError::IncorrectUrl("missing".to_string())),
    };
    if base_urls.is_empty() {
        return Err(ConfigError::IncorrectUrl("empty list".to_string()));
    }

    let total = value.get("total_articles_to_find_and_parse");
    if let Some(n) = total.and_then(Value::as_u64) {
        if n > MAX_TOTAL_ARTICLES {
            return Err(ConfigError::NumberOfArticlesOutOfRange(n));
        }
    }

    let total_articles = count_field(total, "total_articles_to_find_and_parse")?;
    let max_articles_per_seed = count_field(
        value.get("max_number_articles_to_get_from_one_seed"),
        "max_number_articles_to_get_from_one_seed",
    )?;

    let seeds_to_visit = match value.get("seeds_to_visit") {
        None | Some(Value::Null) => None,
        Some(v) => Some(count_field(Some(v), "seeds_to_visit")?),
    };

    let request_delay = match value.get("request_delay_secs") {
        None | Some(Value::Null) => Duration::from_secs(DEFAULT_REQUEST_DELAY_SECS),
        Some(v) => v
            .as_f64()
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
            .ok_or_else(|| ConfigError::Parse(format!("request_delay_secs is invalid: {v}")))?,
    };

    let user_agent = match value.get("user_agent") {
        None | Some(Value::Null) => DEFAULT_USER_AGENT.to_string(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(v) => return Err(ConfigError::Parse(format!("user_agent is invalid: {v}"))),
    };

    Ok(CrawlerConfig {
        base_urls,
        total_articles,
        max_articles_per_seed,
        seeds_to_visit,
        request_delay,
        user_agent,
    })
}

fn count_field(value: Option<&Value>, name: &str) -> Result<usize, ConfigError> {
    match value {
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| ConfigError::IncorrectNumberOfArticles(format!("{name} must be a non-negative integer, got {v}"))),
        None => Err(ConfigError::IncorrectNumberOfArticles(format!("{name} is missing"))),
    }
}
