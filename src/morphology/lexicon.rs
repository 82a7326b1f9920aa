//! Dictionary tagger loaded from a tab-separated lexicon.
//!
//! Each non-empty, non-`#` line describes one analysis of a word form:
//!
//! ```text
//! form<TAB>lemma<TAB>tags[<TAB>score]
//! коты	кот	NOUN,anim,masc plur,nomn	0.9
//! ```
//!
//! Forms are matched case-insensitively. When a form has several analyses the
//! highest score wins; equal scores keep file order.

use super::{PrimaryAnalysis, PrimaryTagger, SecondaryTagger};
use crate::errors::TaggerError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, instrument};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{L}+(?:[-']\p{L}+)*").unwrap());

#[derive(Debug, Clone, PartialEq)]
struct LexiconEntry {
    lemma: String,
    tags: String,
    score: f64,
}

/// In-memory form → analyses table.
#[derive(Debug, Clone, Default)]
pub struct LexiconTagger {
    entries: HashMap<String, Vec<LexiconEntry>>,
}

impl LexiconTagger {
    /// Load a lexicon file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, TaggerError> {
        let text = tokio::fs::read_to_string(path).await?;
        let lexicon = Self::parse(&text)?;
        info!(forms = lexicon.entries.len(), "Loaded lexicon");
        Ok(lexicon)
    }

    /// Parse lexicon text.
    pub fn parse(text: &str) -> Result<Self, TaggerError> {
        let mut entries: HashMap<String, Vec<LexiconEntry>> = HashMap::new();

        for (n, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let (form, lemma, tags, score) = match fields.as_slice() {
                [form, lemma, tags] => (*form, *lemma, *tags, 0.0),
                [form, lemma, tags, score] => {
                    let score = score.trim().parse::<f64>().map_err(|_| {
                        TaggerError::Failed(format!("lexicon line {}: bad score {score:?}", n + 1))
                    })?;
                    (*form, *lemma, *tags, score)
                }
                _ => {
                    return Err(TaggerError::Failed(format!(
                        "lexicon line {}: expected 3 or 4 tab-separated fields",
                        n + 1
                    )));
                }
            };
            entries
                .entry(form.trim().to_lowercase())
                .or_default()
                .push(LexiconEntry {
                    lemma: lemma.trim().to_string(),
                    tags: tags.trim().to_string(),
                    score,
                });
        }

        for analyses in entries.values_mut() {
            // stable: ties keep file order
            analyses.sort_by(|a, b| b.score.total_cmp(&a.score));
        }
        Ok(Self { entries })
    }

    fn best(&self, word: &str) -> Option<&LexiconEntry> {
        self.entries.get(&word.to_lowercase())?.first()
    }
}

impl SecondaryTagger for LexiconTagger {
    fn best_tag(&self, word: &str) -> Option<String> {
        self.best(word).map(|e| e.tags.clone())
    }
}

impl PrimaryTagger for LexiconTagger {
    async fn analyze(&self, text: &str) -> Result<Vec<PrimaryAnalysis>, TaggerError> {
        Ok(WORD
            .find_iter(text)
            .map(|m| {
                let best = self.best(m.as_str());
                PrimaryAnalysis {
                    text: m.as_str().to_string(),
                    lemma: best.map(|e| e.lemma.clone()),
                    tags: best.map(|e| e.tags.clone()),
                }
            })
            .collect())
    }
}
