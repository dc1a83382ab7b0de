use super::{CrawlContext, Intent};
use crate::learning::PatternStore;
use crate::oracle::{complete_as, to_prompt_json, OraclePrompt, OracleTask, ReasoningClient};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

const INTENT_MAX_TOKENS: u32 = 1000;

const INTENT_SYSTEM_PROMPT: &str = "You are an expert web crawling strategist. \
Analyze the user's query and determine the primary intent (research, monitoring, \
discovery or extraction), content type preferences, depth requirements, urgency \
and success criteria. Respond with a single JSON object with the keys \
\"primary_intent\", \"domain_insights\" (object), \"recommended_patterns\" \
(array of strings), \"avoid_patterns\" (array of strings) and optionally \
\"time_budget_secs\" (integer).";

#[derive(Debug, Deserialize)]
struct IntentResponse {
    /// Missing means research, like any unrecognised label
    #[serde(default)]
    primary_intent: String,
    #[serde(default)]
    domain_insights: Value,
    #[serde(default, deserialize_with = "string_items")]
    recommended_patterns: Vec<String>,
    #[serde(default, deserialize_with = "string_items")]
    avoid_patterns: Vec<String>,
    #[serde(default)]
    time_budget_secs: Option<u64>,
}

/// Reads a list of patterns, dropping entries that are not strings
///
/// `null` reads as an empty list; anything other than a list is an error.
fn string_items<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(pattern) => Some(pattern),
            other => {
                tracing::debug!("Dropping non-string pattern: {}", other);
                None
            }
        })
        .collect())
}

impl IntentResponse {
    fn into_context(self) -> CrawlContext {
        let domain_knowledge = match self.domain_insights {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                tracing::debug!("Discarding non-object domain insights: {}", other);
                Map::new()
            }
        };

        CrawlContext {
            user_intent: Intent::from_label(&self.primary_intent),
            domain_knowledge,
            success_patterns: self.recommended_patterns,
            failure_patterns: self.avoid_patterns,
            time_budget_secs: self.time_budget_secs.filter(|secs| *secs > 0),
        }
    }
}

/// Interprets free-text crawl requests through the oracle
pub struct IntentAnalyzer {
    oracle: Arc<dyn ReasoningClient>,
    patterns: Arc<PatternStore>,
    timeout: Duration,
}

impl IntentAnalyzer {
    pub fn new(oracle: Arc<dyn ReasoningClient>, patterns: Arc<PatternStore>, timeout: Duration) -> Self {
        Self {
            oracle,
            patterns,
            timeout,
        }
    }

    /// Builds the crawl context for `query`
    ///
    /// Never fails: any oracle problem yields [`CrawlContext::fallback`].
    pub async fn analyze(&self, query: &str, context: Option<&Map<String, Value>>) -> CrawlContext {
        let prompt = self.build_prompt(query, context);

        match complete_as::<IntentResponse>(self.oracle.as_ref(), &prompt, self.timeout).await {
            Ok(response) => {
                let context = response.into_context();
                tracing::debug!(
                    "Intent analysis: {} ({} success / {} failure patterns)",
                    context.user_intent,
                    context.success_patterns.len(),
                    context.failure_patterns.len()
                );
                context
            }
            Err(e) => {
                tracing::warn!("Intent analysis failed, using fallback context: {}", e);
                CrawlContext::fallback()
            }
        }
    }

    fn build_prompt(&self, query: &str, context: Option<&Map<String, Value>>) -> OraclePrompt {
        let empty = Map::new();
        let user = format!(
            "User Query: \"{}\"\n\
             Additional Context: {}\n\n\
             Previous successful patterns from our database:\n{}\n\n\
             Provide strategic analysis for optimal crawling approach.",
            query,
            to_prompt_json(context.unwrap_or(&empty)),
            to_prompt_json(&self.patterns.snapshot()),
        );

        OraclePrompt::new(OracleTask::IntentAnalysis, user, INTENT_MAX_TOKENS)
            .with_system(INTENT_SYSTEM_PROMPT)
    }
}
