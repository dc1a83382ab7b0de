//! Proactive discovery
//!
//! Suggests URLs worth crawling on a domain, given the caller's interests and
//! what has been learned so far. Nothing is fetched here.

use crate::learning::PatternStore;
use crate::oracle::{complete_as, to_prompt_json, OraclePrompt, OracleTask, ReasoningClient};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const DISCOVERY_MAX_TOKENS: u32 = 800;

/// Number of suggestions asked of the oracle
const SUGGESTION_COUNT: usize = 5;

/// A candidate URL with the oracle's reasoning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub url: String,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Deserialize)]
struct DiscoveryResponse {
    #[serde(default)]
    suggested_urls: Vec<Value>,
}

/// Suggests crawl candidates for a domain through the oracle
pub struct DiscoveryEngine {
    oracle: Arc<dyn ReasoningClient>,
    patterns: Arc<PatternStore>,
    timeout: Duration,
}

impl DiscoveryEngine {
    pub fn new(oracle: Arc<dyn ReasoningClient>, patterns: Arc<PatternStore>, timeout: Duration) -> Self {
        Self {
            oracle,
            patterns,
            timeout,
        }
    }

    /// Returns the oracle's suggestions for `domain`
    ///
    /// An oracle failure returns an empty list, the same as "no suggestions".
    /// Entries without a URL are dropped; bare strings are accepted as URLs.
    pub async fn discover(&self, domain: &str, interests: &[String]) -> Vec<Opportunity> {
        let prompt = self.build_prompt(domain, interests);

        let response = match complete_as::<DiscoveryResponse>(self.oracle.as_ref(), &prompt, self.timeout).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Proactive discovery for {} failed: {}", domain, e);
                return Vec::new();
            }
        };

        let opportunities: Vec<Opportunity> = response
            .suggested_urls
            .into_iter()
            .filter_map(|entry| match entry {
                Value::String(url) => Some(Opportunity {
                    url,
                    reasoning: String::new(),
                }),
                other => serde_json::from_value::<Opportunity>(other).ok(),
            })
            .filter(|opportunity| !opportunity.url.trim().is_empty())
            .collect();

        tracing::info!("Discovery for {} returned {} suggestions", domain, opportunities.len());
        opportunities
    }

    fn build_prompt(&self, domain: &str, interests: &[String]) -> OraclePrompt {
        let user = format!(
            "Based on the domain \"{}\" and user interests {}, suggest {} high-value URLs \
             that would likely contain relevant information.\n\n\
             Consider:\n\
             - Common URL patterns for this domain type\n\
             - Likely content structures\n\
             - Related subtopics worth exploring\n\n\
             Our successful patterns from previous crawls:\n{}\n\n\
             Respond with a JSON object: {{\"suggested_urls\": [{{\"url\": <url>, \"reasoning\": <why>}}]}}.",
            domain,
            to_prompt_json(interests),
            SUGGESTION_COUNT,
            to_prompt_json(&self.patterns.snapshot()),
        );

        OraclePrompt::new(OracleTask::Discovery, user, DISCOVERY_MAX_TOKENS)
    }
}
