// Knowledge Lookup Service
// Encyclopedia REST summary client used as the fallback stage of the
// fact verification chain

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

use super::capabilities::{CapabilityError, KnowledgeLookup, LookupOutcome};
use super::config_store::KnowledgeConfig;

const SUMMARY_SENTENCES: usize = 2;

pub struct WikipediaLookup {
    client: Client,
    base_url: Url,
}

impl WikipediaLookup {
    pub fn new(config: &KnowledgeConfig) -> Result<Self, CapabilityError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| CapabilityError::JsonError(format!("invalid knowledge URL: {}", e)))?;

        Ok(Self { client, base_url })
    }

    fn summary_url(&self, query: &str) -> Result<Url, CapabilityError> {
        let title = query.trim().replace(' ', "_");
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CapabilityError::JsonError("knowledge URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["api", "rest_v1", "page", "summary", title.as_str()]);
        url.set_query(Some("redirect=true"));
        Ok(url)
    }
}

#[async_trait]
impl KnowledgeLookup for WikipediaLookup {
    async fn lookup(&self, query: &str) -> Result<LookupOutcome, CapabilityError> {
        let url = self.summary_url(query)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "knowledge.lookup");

        if status == StatusCode::NOT_FOUND {
            return Ok(LookupOutcome::NotFound);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| CapabilityError::JsonError(e.to_string()))?;

        parse_summary(&data)
    }
}

/// Map a page-summary body to a lookup outcome.
fn parse_summary(data: &Value) -> Result<LookupOutcome, CapabilityError> {
    if data.get("type").and_then(|t| t.as_str()) == Some("disambiguation") {
        return Ok(LookupOutcome::Ambiguous);
    }

    let extract = data
        .get("extract")
        .and_then(|e| e.as_str())
        .filter(|e| !e.trim().is_empty())
        .ok_or(CapabilityError::MissingContent)?;

    Ok(LookupOutcome::Match {
        summary: leading_sentences(extract, SUMMARY_SENTENCES),
    })
}

static SENTENCE_END: OnceLock<Regex> = OnceLock::new();

fn sentence_end_re() -> &'static Regex {
    SENTENCE_END.get_or_init(|| Regex::new(r"[.!?](?:\s+|$)").unwrap())
}

/// Clip text to its first `count` sentences.
fn leading_sentences(text: &str, count: usize) -> String {
    let text = text.trim();
    let mut taken = 0;
    for m in sentence_end_re().find_iter(text) {
        taken += 1;
        if taken == count {
            return text[..m.end()].trim_end().to_string();
        }
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_sentences_clips_to_two() {
        let text = "First sentence. Second sentence! Third sentence.";
        assert_eq!(
            leading_sentences(text, 2),
            "First sentence. Second sentence!"
        );
    }

    #[test]
    fn test_leading_sentences_short_text_unchanged() {
        assert_eq!(leading_sentences("Only one sentence.", 2), "Only one sentence.");
    }

    #[test]
    fn test_leading_sentences_ignores_inner_periods_without_space() {
        let text = "Version 2.5 shipped today. A second note follows. Tail.";
        assert_eq!(
            leading_sentences(text, 2),
            "Version 2.5 shipped today. A second note follows."
        );
    }

    #[test]
    fn test_parse_summary_direct_match() {
        let data = serde_json::json!({
            "type": "standard",
            "extract": "Karnataka is a state in southern India. It borders the Arabian Sea. More text here."
        });
        match parse_summary(&data).unwrap() {
            LookupOutcome::Match { summary } => {
                assert_eq!(
                    summary,
                    "Karnataka is a state in southern India. It borders the Arabian Sea."
                );
            }
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_summary_disambiguation() {
        let data = serde_json::json!({"type": "disambiguation", "extract": "May refer to:"});
        assert_eq!(parse_summary(&data).unwrap(), LookupOutcome::Ambiguous);
    }

    #[test]
    fn test_parse_summary_missing_extract_is_error() {
        let data = serde_json::json!({"type": "standard"});
        assert!(parse_summary(&data).is_err());
    }

    #[test]
    fn test_summary_url_encodes_title() {
        let lookup = WikipediaLookup::new(&KnowledgeConfig::default()).unwrap();
        let url = lookup.summary_url("The sun rises in the east").unwrap();
        assert!(url
            .as_str()
            .ends_with("/api/rest_v1/page/summary/The_sun_rises_in_the_east?redirect=true"));
    }
}
