use crate::crawler::{FetchOutcome, LINK_CANDIDATES, MAX_FOLLOWUPS, SUMMARY_CHARS};
use crate::intent::CrawlContext;
use crate::oracle::{complete_as, to_prompt_json, OraclePrompt, OracleTask, ReasoningClient};
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const FOLLOWUP_MAX_TOKENS: u32 = 400;

/// A follow-up URL chosen by the oracle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowupLink {
    pub url: Url,
    pub reasoning: String,
}

#[derive(Debug, Default, Deserialize)]
struct FollowupResponse {
    #[serde(default)]
    recommended_links: Vec<Value>,
}

/// Reads one `recommended_links` entry: `{url, reasoning}` or a bare URL string
fn read_entry(entry: &Value) -> Option<(&str, &str)> {
    match entry {
        Value::String(url) => Some((url.as_str(), "")),
        Value::Object(object) => {
            let url = object.get("url")?.as_str()?;
            let reasoning = object.get("reasoning").and_then(|r| r.as_str()).unwrap_or("");
            Some((url, reasoning))
        }
        _ => None,
    }
}

/// Ranks the primary page's links through the oracle
pub struct FollowupSelector {
    oracle: Arc<dyn ReasoningClient>,
    timeout: Duration,
}

impl FollowupSelector {
    pub fn new(oracle: Arc<dyn ReasoningClient>, timeout: Duration) -> Self {
        Self { oracle, timeout }
    }

    /// Returns at most [`MAX_FOLLOWUPS`] follow-up links, in recommendation order
    ///
    /// Entries that are not absolute http(s) URLs, repeat an earlier entry or
    /// point back at the primary page are skipped. An oracle failure yields
    /// an empty list.
    pub async fn select(
        &self,
        primary: &FetchOutcome,
        context: &CrawlContext,
        strategy: &Strategy,
    ) -> Vec<FollowupLink> {
        let prompt = self.build_prompt(primary, context, strategy);

        let response = match complete_as::<FollowupResponse>(self.oracle.as_ref(), &prompt, self.timeout).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Follow-up link analysis failed, skipping follow-ups: {}", e);
                return Vec::new();
            }
        };

        let primary_url = Url::parse(&primary.url).ok();
        let mut seen = HashSet::new();
        let mut selected = Vec::new();

        for entry in &response.recommended_links {
            if selected.len() == MAX_FOLLOWUPS {
                break;
            }

            let Some((raw, reasoning)) = read_entry(entry) else {
                tracing::debug!("Ignoring unreadable follow-up entry: {}", entry);
                continue;
            };

            let url = match Url::parse(raw.trim()) {
                Ok(url) if url.scheme() == "http" || url.scheme() == "https" => url,
                _ => {
                    tracing::debug!("Ignoring invalid follow-up URL: {}", raw);
                    continue;
                }
            };

            if primary_url.as_ref() == Some(&url) || !seen.insert(url.clone()) {
                continue;
            }

            selected.push(FollowupLink {
                url,
                reasoning: reasoning.to_string(),
            });
        }

        tracing::debug!("Selected {} follow-up links", selected.len());
        selected
    }

    fn build_prompt(&self, primary: &FetchOutcome, context: &CrawlContext, strategy: &Strategy) -> OraclePrompt {
        let summary: String = primary.content.chars().take(SUMMARY_CHARS).collect();
        let candidates: Vec<&String> = primary.links.iter().take(LINK_CANDIDATES).collect();

        let user = format!(
            "Based on the primary crawl results and user context, identify the {} most valuable \
             follow-up links to crawl for additional insights.\n\n\
             Primary Content Summary: {}...\n\
             User Intent: {}\n\
             Strategy Focus: {}\n\n\
             Available Links: {}\n\n\
             Respond with a JSON object: {{\"recommended_links\": [{{\"url\": <url>, \"reasoning\": <why>}}]}}.",
            MAX_FOLLOWUPS,
            summary,
            context.user_intent,
            strategy.description(),
            to_prompt_json(&candidates),
        );

        OraclePrompt::new(OracleTask::FollowupRanking, user, FOLLOWUP_MAX_TOKENS)
    }
}
