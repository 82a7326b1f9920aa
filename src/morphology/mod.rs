//! Morphological tagger backends.
//!
//! Annotation queries two independent taggers:
//!
//! - a **primary**, context-aware tagger that walks the whole text and yields
//!   each surface token with its lemma and tag set ([`PrimaryTagger`])
//! - a **secondary**, context-free tagger that returns its best-ranked tag set
//!   for a single word form ([`SecondaryTagger`])
//!
//! | Backend | Module | Primary | Secondary |
//! |---------|--------|---------|-----------|
//! | Yandex Mystem (external binary) | [`mystem`] | yes | no |
//! | TSV lexicon | [`lexicon`] | yes (dictionary lookup) | yes |

pub mod lexicon;
pub mod mystem;

use crate::errors::TaggerError;

/// One surface token as reported by a primary tagger.
///
/// Either analysis field may be missing when the tagger recognized the token
/// but could not analyze it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryAnalysis {
    pub text: String,
    pub lemma: Option<String>,
    pub tags: Option<String>,
}

/// Context-aware tagger run over a whole text.
pub trait PrimaryTagger {
    async fn analyze(&self, text: &str) -> Result<Vec<PrimaryAnalysis>, TaggerError>;
}

/// Context-free tagger queried one word form at a time.
pub trait SecondaryTagger {
    /// Tag set of the best-ranked analysis of `word`, if any.
    fn best_tag(&self, word: &str) -> Option<String>;
}
