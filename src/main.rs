//! # Awful News Corpus
//!
//! Builds a small morphologically annotated news corpus: articles are crawled
//! from a fixed set of seed pages, stored as raw text plus metadata, and later
//! annotated token by token with a lemma and two independent tag sets.
//!
//! ## Usage
//!
//! ```sh
//! awful_news_corpus crawl -c crawler_config.json -a ./assets
//! awful_news_corpus annotate -a ./assets -l ./lexicon.tsv
//! ```
//!
//! ## Architecture
//!
//! The application runs one of two sequential stages:
//! 1. **Crawl**: discover article URLs from the seeds, then fetch, parse and
//!    store each article under a sequential id
//! 2. **Annotate**: validate the corpus, rediscover its articles, and tag each
//!    raw text with a primary and a secondary morphological tagger

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod corpus;
mod errors;
mod models;
mod morphology;
mod pipeline;
mod scrapers;
mod storage;
mod utils;

use cli::{Cli, Command, PrimaryBackend};
use corpus::CorpusManager;
use morphology::lexicon::LexiconTagger;
use morphology::mystem::MystemTagger;
use morphology::{PrimaryTagger, SecondaryTagger};
use pipeline::{Annotator, PipelineRunner};
use scrapers::HttpFetcher;
use storage::RecordStore;
use storage::validate::validate_dataset;
use utils::prepare_environment;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("awful_news_corpus starting up");

    let args = Cli::parse();
    debug!(?args.command, "Parsed CLI arguments");

    let result = match args.command {
        Command::Crawl { config, assets } => crawl(&config, &assets).await,
        Command::Validate { assets } => validate_dataset(&assets).map_err(Into::into),
        Command::Annotate {
            assets,
            lexicon,
            primary,
            mystem_bin,
        } => annotate(&assets, &lexicon, primary, &mystem_bin).await,
    };

    if let Err(e) = &result {
        error!(error = %e, "Run failed");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    result
}

#[instrument(level = "info", skip_all)]
async fn crawl(config_path: &Path, assets: &Path) -> Result<(), Box<dyn Error>> {
    let config = config::load_config(config_path)?;
    let fetcher = HttpFetcher::new(&config.user_agent)?;

    prepare_environment(assets).await?;
    let store = RecordStore::new(assets);
    let summary = scrapers::build_corpus(&fetcher, &store, &config).await?;
    let records = store.list_ids().await?.len();

    info!(
        records,
        discovered = summary.discovered,
        extracted = summary.extracted,
        failed = summary.failed,
        path = %assets.display(),
        "Corpus written"
    );
    Ok(())
}

#[instrument(level = "info", skip_all)]
async fn annotate(
    assets: &Path,
    lexicon_path: &Path,
    primary: PrimaryBackend,
    mystem_bin: &str,
) -> Result<(), Box<dyn Error>> {
    validate_dataset(assets)?;
    let lexicon = LexiconTagger::load(lexicon_path).await?;
    let store = RecordStore::new(assets);
    let corpus = CorpusManager::new(store.clone());

    match primary {
        PrimaryBackend::Mystem => {
            let mystem = MystemTagger::new(mystem_bin);
            run_pipeline(&mystem, &lexicon, &store, &corpus).await
        }
        PrimaryBackend::Lexicon => run_pipeline(&lexicon, &lexicon, &store, &corpus).await,
    }
}

async fn run_pipeline<P: PrimaryTagger, S: SecondaryTagger>(
    primary: &P,
    secondary: &S,
    store: &RecordStore,
    corpus: &CorpusManager,
) -> Result<(), Box<dyn Error>> {
    let runner = PipelineRunner::new(Annotator::new(primary, secondary, store));
    let summary = runner.run(corpus).await?;
    info!(
        annotated = summary.annotated,
        skipped = summary.skipped,
        "Annotation finished"
    );
    Ok(())
}
