//! Annotation stage: turn stored raw text into tagged token sequences.
//!
//! For each article the [`Annotator`] runs the primary tagger over the raw
//! text, keeps every token that received both a lemma and a tag set, asks the
//! secondary tagger about the same surface form, and stores the rendered
//! tokens joined by single spaces.
//!
//! ```text
//! Cats run fast.  →  cat<NOUN,pl>(NOUN,pl) run<VERB>(NOUN,sg) fast<ADV>(ADV)
//! ```

use crate::corpus::CorpusManager;
use crate::errors::{PipelineError, TaggerError};
use crate::models::{AnnotatedToken, Article};
use crate::morphology::{PrimaryTagger, SecondaryTagger};
use crate::storage::RecordStore;
use crate::utils::truncate_for_log;
use tracing::{debug, info, instrument, warn};

/// Combines a primary and a secondary tagger and persists the result.
#[derive(Debug)]
pub struct Annotator<'a, P, S> {
    primary: &'a P,
    secondary: &'a S,
    store: &'a RecordStore,
}

impl<'a, P: PrimaryTagger, S: SecondaryTagger> Annotator<'a, P, S> {
    pub fn new(primary: &'a P, secondary: &'a S, store: &'a RecordStore) -> Self {
        Self {
            primary,
            secondary,
            store,
        }
    }

    /// Tag `text`, dropping tokens the primary tagger could not analyze.
    ///
    /// A token the secondary tagger does not know keeps an empty secondary
    /// tag set.
    pub async fn process(&self, text: &str) -> Result<Vec<AnnotatedToken>, TaggerError> {
        let analyses = self.primary.analyze(text).await?;
        let total = analyses.len();

        let tokens: Vec<AnnotatedToken> = analyses
            .into_iter()
            .filter_map(|analysis| {
                let (lemma, tags) = (analysis.lemma?, analysis.tags?);
                if analysis.text.is_empty() || lemma.is_empty() || tags.is_empty() {
                    return None;
                }
                let tags_secondary = self.secondary.best_tag(&analysis.text).unwrap_or_default();
                Some(AnnotatedToken {
                    original_word: analysis.text,
                    normalized_form: lemma,
                    tags_primary: tags,
                    tags_secondary,
                })
            })
            .collect();

        debug!(tokens = tokens.len(), dropped = total - tokens.len(), "Tagged text");
        Ok(tokens)
    }

    /// Annotate `article.raw_text`, set `article.annotated_text`, and write
    /// the annotated record. The raw text is left untouched.
    #[instrument(level = "info", skip_all, fields(id = article.id()))]
    pub async fn annotate(&self, article: &mut Article) -> Result<(), PipelineError> {
        let tokens = self.process(&article.raw_text).await?;
        let rendered = tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");

        self.store.write_annotated(article.id(), &rendered).await?;
        info!(
            tokens = tokens.len(),
            preview = %truncate_for_log(&rendered, 120),
            "Annotated article"
        );
        article.annotated_text = Some(rendered);
        Ok(())
    }
}

/// Outcome counts of one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub annotated: usize,
    pub skipped: usize,
}

/// Drives the annotator over every article in a corpus.
#[derive(Debug)]
pub struct PipelineRunner<'a, P, S> {
    annotator: Annotator<'a, P, S>,
}

impl<'a, P: PrimaryTagger, S: SecondaryTagger> PipelineRunner<'a, P, S> {
    pub fn new(annotator: Annotator<'a, P, S>) -> Self {
        Self { annotator }
    }

    /// Annotate every article `corpus` knows about.
    ///
    /// # Errors
    ///
    /// Only corpus-level failures abort the run. An article whose raw text
    /// cannot be read or tagged is logged and counted as skipped.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self, corpus: &CorpusManager) -> Result<RunSummary, PipelineError> {
        let articles = corpus.load().await?;
        let mut summary = RunSummary::default();

        for (id, mut article) in articles {
            let read = match article.raw_path.as_deref() {
                Some(path) => corpus.store().read_raw_at(id, path).await,
                None => corpus.store().read_raw(id).await,
            };
            article.raw_text = match read {
                Ok(text) => text,
                Err(e) => {
                    warn!(id, error = %e, "Cannot read raw text; skipping article");
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.annotator.annotate(&mut article).await {
                Ok(()) => summary.annotated += 1,
                Err(e) => {
                    warn!(id, error = %e, "Annotation failed; skipping article");
                    summary.skipped += 1;
                }
            }
        }

        info!(
            annotated = summary.annotated,
            skipped = summary.skipped,
            "Pipeline run complete"
        );
        Ok(summary)
    }
}
