//! Command-line interface definitions for Awful News Corpus.
//!
//! Paths can be provided via command-line flags or environment variables.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for the Awful News Corpus application.
///
/// # Examples
///
/// ```sh
/// # Crawl seed pages into ./assets
/// awful_news_corpus crawl -c crawler_config.json -a ./assets
///
/// # Check a corpus without touching it
/// awful_news_corpus validate -a ./assets
///
/// # Annotate with mystem as primary and a lexicon as secondary tagger
/// awful_news_corpus annotate -a ./assets --lexicon ./lexicon.tsv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Discover articles from the seed pages and store them as a corpus
    Crawl {
        /// Crawler config file (JSON, or YAML by extension)
        #[arg(short, long, env = "CRAWLER_CONFIG")]
        config: PathBuf,

        /// Corpus directory; replaced by this crawl
        #[arg(short, long, env = "ASSETS_PATH")]
        assets: PathBuf,
    },

    /// Check a corpus directory for consistency
    Validate {
        /// Corpus directory
        #[arg(short, long, env = "ASSETS_PATH")]
        assets: PathBuf,
    },

    /// Annotate every stored article with lemmas and morphological tags
    Annotate {
        /// Corpus directory
        #[arg(short, long, env = "ASSETS_PATH")]
        assets: PathBuf,

        /// Tab-separated lexicon used by the secondary tagger
        #[arg(short, long, env = "MORPH_LEXICON")]
        lexicon: PathBuf,

        /// Which backend acts as the primary tagger
        #[arg(long, value_enum, default_value_t = PrimaryBackend::Mystem)]
        primary: PrimaryBackend,

        /// Path or name of the mystem executable
        #[arg(long, env = "MYSTEM_BIN", default_value = "mystem")]
        mystem_bin: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimaryBackend {
    /// Context-aware analysis by the external mystem binary
    Mystem,
    /// Dictionary lookup in the lexicon
    Lexicon,
}
