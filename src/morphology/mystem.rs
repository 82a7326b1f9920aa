//! Primary tagger backed by the external `mystem` binary.
//!
//! The text is piped to `mystem --format json -i -d -c -e utf-8`, which prints
//! one JSON array per input line:
//!
//! ```json
//! [{"analysis":[{"lex":"кот","gr":"S,муж,од=(вин,мн|им,мн)"}],"text":"Коты"},{"text":" "}]
//! ```
//!
//! Only the first (disambiguated) analysis of each token is used.

use super::{PrimaryAnalysis, PrimaryTagger};
use crate::errors::TaggerError;
use serde::Deserialize;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

const MYSTEM_ARGS: [&str; 7] = ["--format", "json", "-i", "-d", "-c", "-e", "utf-8"];

#[derive(Debug, Deserialize)]
struct MystemToken {
    text: Option<String>,
    #[serde(default)]
    analysis: Vec<MystemAnalysis>,
}

#[derive(Debug, Deserialize)]
struct MystemAnalysis {
    lex: Option<String>,
    gr: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MystemLine {
    Many(Vec<MystemToken>),
    One(MystemToken),
}

/// Runs `mystem` as a subprocess for each text.
#[derive(Debug, Clone)]
pub struct MystemTagger {
    binary: String,
}

impl MystemTagger {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl PrimaryTagger for MystemTagger {
    #[instrument(level = "debug", skip_all, fields(binary = %self.binary, bytes = text.len()))]
    async fn analyze(&self, text: &str) -> Result<Vec<PrimaryAnalysis>, TaggerError> {
        let t0 = Instant::now();
        let mut child = Command::new(&self.binary)
            .args(MYSTEM_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => TaggerError::ToolNotFound(self.binary.clone()),
                _ => TaggerError::Io(e),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TaggerError::Failed("mystem stdin unavailable".to_string()))?;
        let input = text.as_bytes().to_vec();
        let feed = async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        };

        let ((), output) = tokio::try_join!(feed, child.wait_with_output())?;
        if !output.status.success() {
            return Err(TaggerError::Failed(format!(
                "mystem exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let tokens = parse_output(&String::from_utf8_lossy(&output.stdout))?;
        debug!(
            tokens = tokens.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "mystem analysis finished"
        );
        Ok(tokens)
    }
}

/// Parse mystem's line-oriented JSON output.
///
/// Entries without a `text` field (mystem's line separators) are discarded.
fn parse_output(stdout: &str) -> Result<Vec<PrimaryAnalysis>, TaggerError> {
    let mut tokens = Vec::new();
    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let parsed: MystemLine = serde_json::from_str(line)?;
        let items = match parsed {
            MystemLine::Many(items) => items,
            MystemLine::One(item) => vec![item],
        };
        tokens.extend(items.into_iter().filter_map(|item| {
            let text = item.text?;
            let first = item.analysis.into_iter().next();
            let (lemma, tags) = match first {
                Some(a) => (a.lex, a.gr),
                None => (None, None),
            };
            Some(PrimaryAnalysis { text, lemma, tags })
        }));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array_lines() {
        let out = concat!(
            r#"[{"analysis":[{"lex":"кот","gr":"S,муж,од=им,мн"},{"lex":"кота","gr":"S"}],"text":"Коты"},{"text":" "},"#,
            r#"{"analysis":[],"text":"Бжж"},{"text":"\n"}]"#,
            "\n",
            r#"[{"analysis":[{"lex":"бежать","gr":"V,несов=непрош,мн,изъяв,3-л"}],"text":"бегут"}]"#,
            "\n"
        );
        let tokens = parse_output(out).unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].text, "Коты");
        assert_eq!(tokens[0].lemma.as_deref(), Some("кот"));
        assert_eq!(tokens[0].tags.as_deref(), Some("S,муж,од=им,мн"));
        assert_eq!(tokens[1].text, " ");
        assert_eq!(tokens[1].lemma, None);
        assert_eq!(tokens[2].lemma, None);
        assert_eq!(tokens[4].lemma.as_deref(), Some("бежать"));
    }

    #[test]
    fn test_parse_object_lines() {
        let out = "{\"analysis\":[{\"lex\":\"кот\",\"gr\":\"S\"}],\"text\":\"кот\"}\n\n";
        let tokens = parse_output(out).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].tags.as_deref(), Some("S"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_output("not json"), Err(TaggerError::Json(_))));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let tagger = MystemTagger::new("/definitely/not/a/mystem/binary");
        assert!(matches!(
            tagger.analyze("text").await,
            Err(TaggerError::ToolNotFound(_))
        ));
    }
}
