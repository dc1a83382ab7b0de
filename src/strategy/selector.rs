use super::{Strategy, StrategyCatalog, StrategyKind, StrategyModification};
use crate::intent::CrawlContext;
use crate::oracle::{complete_as, to_prompt_json, OraclePrompt, OracleTask, ReasoningClient};
use crate::url::{classify_host, extract_domain};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const STRATEGY_MAX_TOKENS: u32 = 500;

#[derive(Debug, Deserialize)]
struct StrategyDecision {
    selected_strategy: String,
    #[serde(default)]
    modifications: Value,
}

/// Picks a catalog strategy for one run, optionally modified
pub struct StrategySelector {
    catalog: Arc<StrategyCatalog>,
    oracle: Arc<dyn ReasoningClient>,
    timeout: Duration,
}

impl StrategySelector {
    pub fn new(catalog: Arc<StrategyCatalog>, oracle: Arc<dyn ReasoningClient>, timeout: Duration) -> Self {
        Self {
            catalog,
            oracle,
            timeout,
        }
    }

    /// Selects the strategy for crawling `target`
    ///
    /// Falls back to the unmodified `deep_research` entry if the oracle fails
    /// or names a strategy outside the catalog.
    pub async fn select(&self, context: &CrawlContext, target: &Url) -> Strategy {
        let prompt = self.build_prompt(context, target);

        let decision = match complete_as::<StrategyDecision>(self.oracle.as_ref(), &prompt, self.timeout).await {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!("Strategy selection failed, using deep_research: {}", e);
                return self.catalog.default_strategy().clone();
            }
        };

        let Some(kind) = StrategyKind::from_key(&decision.selected_strategy) else {
            tracing::warn!(
                "Oracle selected unknown strategy '{}', using deep_research",
                decision.selected_strategy
            );
            return self.catalog.default_strategy().clone();
        };

        let modification = StrategyModification::from_value(&decision.modifications);
        let strategy = self.catalog.get(kind);

        if modification.is_empty() {
            tracing::debug!("Selected strategy {}", kind);
            strategy.clone()
        } else {
            tracing::debug!("Selected strategy {} with {:?}", kind, modification);
            strategy.apply(&modification)
        }
    }

    fn build_prompt(&self, context: &CrawlContext, target: &Url) -> OraclePrompt {
        let hints = extract_domain(target)
            .map(|host| classify_host(&host))
            .unwrap_or_default();

        let user = format!(
            "Select the optimal crawling strategy based on:\n\n\
             User Intent: {}\n\
             Target URL: {}\n\
             Domain Type: {}\n\
             Success Patterns: {}\n\n\
             Available Strategies:\n{}\n\n\
             Respond with a JSON object: {{\"selected_strategy\": <strategy key>, \
             \"modifications\": {{\"depth_limit\": <int>, \"additional_patterns\": [<string>], \
             \"follow_links\": <bool>}}}}. Modifications are optional.",
            context.user_intent,
            target,
            to_prompt_json(&hints),
            to_prompt_json(&context.success_patterns),
            to_prompt_json(&self.catalog.to_json()),
        );

        OraclePrompt::new(OracleTask::StrategySelection, user, STRATEGY_MAX_TOKENS)
    }
}
