//! Pipeline orchestration
//!
//! The [`Orchestrator`] is the only component callers talk to. It runs the
//! adaptive crawl (intent → strategy → execution → learning) and the
//! stand-alone discovery flow. Caller-input errors are the only errors it
//! returns; everything else is recovered inside the pipeline.

use crate::config::Config;
use crate::crawler::{CrawlExecutor, CrawlResult, FollowupSelector, HttpFetcher, PageFetcher};
use crate::discovery::{DiscoveryEngine, Opportunity};
use crate::intent::IntentAnalyzer;
use crate::learning::{LearningRecord, LearningRecorder, PatternStore, MAX_HISTORY_WINDOW};
use crate::oracle::{AnthropicClient, ReasoningClient};
use crate::storage::{open_store, LearningStore};
use crate::strategy::{StrategyCatalog, StrategySelector};
use crate::url::{normalize_domain, parse_target_url};
use crate::{CrawlerError, Result};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tunables the pipeline components are built with
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub oracle_timeout: Duration,
    pub fetch_timeout: Duration,
    pub render_javascript: bool,
    pub history_window: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            oracle_timeout: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(30),
            render_javascript: false,
            history_window: MAX_HISTORY_WINDOW,
        }
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            oracle_timeout: config.oracle.timeout(),
            fetch_timeout: config.crawler.fetch_timeout(),
            render_javascript: config.crawler.render_javascript,
            history_window: config.learning.history_window,
        }
    }
}

/// Composes the pipeline components into the two caller-facing flows
pub struct Orchestrator {
    analyzer: IntentAnalyzer,
    selector: StrategySelector,
    executor: CrawlExecutor,
    recorder: LearningRecorder,
    discovery: DiscoveryEngine,
    patterns: Arc<PatternStore>,
    store: Arc<dyn LearningStore>,
}

impl Orchestrator {
    /// Wires the pipeline around the given collaborators
    ///
    /// The pattern store and history window start empty; call
    /// [`load_learned_state`](Self::load_learned_state) to seed them.
    pub fn new(
        options: PipelineOptions,
        oracle: Arc<dyn ReasoningClient>,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn LearningStore>,
    ) -> Self {
        let catalog = Arc::new(StrategyCatalog::builtin());
        let patterns = Arc::new(PatternStore::new());

        Self {
            analyzer: IntentAnalyzer::new(oracle.clone(), patterns.clone(), options.oracle_timeout),
            selector: StrategySelector::new(catalog, oracle.clone(), options.oracle_timeout),
            executor: CrawlExecutor::new(
                fetcher,
                FollowupSelector::new(oracle.clone(), options.oracle_timeout),
                options.fetch_timeout,
                options.render_javascript,
            ),
            recorder: LearningRecorder::new(store.clone(), patterns.clone(), options.history_window),
            discovery: DiscoveryEngine::new(oracle, patterns.clone(), options.oracle_timeout),
            patterns,
            store,
        }
    }

    /// Builds the default stack from a configuration
    ///
    /// Uses the Anthropic client, the HTTP fetcher and the SQLite store at
    /// `learning.database-path`, then loads previously learned state.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let oracle = AnthropicClient::new(config.oracle.clone())?;
        let fetcher = HttpFetcher::new(&config.user_agent)?;
        let store = open_store(Path::new(&config.learning.database_path))?;

        let orchestrator = Self::new(
            PipelineOptions::from(config),
            Arc::new(oracle),
            Arc::new(fetcher),
            Arc::new(store),
        );
        orchestrator.load_learned_state().await;

        Ok(orchestrator)
    }

    /// Seeds the pattern store and history window from the learning store
    ///
    /// Failures are logged; the pipeline then starts with empty state.
    pub async fn load_learned_state(&self) {
        match self.store.load_learned_patterns().await {
            Ok(patterns) => {
                tracing::info!("Loaded {} learned patterns", patterns.len());
                for (pattern_type, data) in patterns {
                    self.patterns.upsert(pattern_type, data);
                }
            }
            Err(e) => tracing::warn!("Could not load learned patterns: {}", e),
        }

        match self.store.recent_learning_records(MAX_HISTORY_WINDOW).await {
            Ok(records) => self.recorder.preload(records),
            Err(e) => tracing::warn!("Could not load learning history: {}", e),
        }
    }

    /// Runs one adaptive crawl of `url` for the request `query`
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::InvalidInput`] if `url` is not an absolute
    /// http(s) URL. No phase runs in that case.
    pub async fn adaptive_crawl(
        &self,
        url: &str,
        query: &str,
        context: Option<Map<String, Value>>,
    ) -> Result<CrawlResult> {
        let started = Instant::now();

        let target = parse_target_url(url)
            .map_err(|e| CrawlerError::InvalidInput(format!("invalid target URL: {}", e)))?;

        tracing::info!("Adaptive crawl of {} for \"{}\"", target, query);

        let crawl_context = self.analyzer.analyze(query, context.as_ref()).await;
        tracing::info!("Intent: {}", crawl_context.user_intent);

        let strategy = self.selector.select(&crawl_context, &target).await;
        tracing::info!("Strategy: {}", strategy.name());

        let result = self
            .executor
            .execute(&target, &strategy, &crawl_context, started)
            .await;

        self.recorder
            .record(&target, query, &strategy, &result, started.elapsed())
            .await;

        Ok(result)
    }

    /// Suggests URLs worth crawling on `domain`
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::InvalidInput`] if `domain` is not a plausible
    /// host name.
    pub async fn proactive_discovery(&self, domain: &str, interests: &[String]) -> Result<Vec<Opportunity>> {
        let domain = normalize_domain(domain)
            .map_err(|e| CrawlerError::InvalidInput(format!("invalid domain: {}", e)))?;

        tracing::info!("Proactive discovery on {} ({} interests)", domain, interests.len());
        Ok(self.discovery.discover(&domain, interests).await)
    }

    /// The in-memory learning window, oldest first
    pub fn learning_history(&self) -> Vec<LearningRecord> {
        self.recorder.recent_history()
    }

    /// Reads up to `limit` persisted learning records, newest first
    pub async fn stored_history(&self, limit: usize) -> Result<Vec<LearningRecord>> {
        Ok(self.store.recent_learning_records(limit).await?)
    }

    pub fn pattern_store(&self) -> &PatternStore {
        &self.patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleTask;
    use crate::strategy::StrategyKind;
    use crate::testing::{StubFetcher, StubOracle, StubStore};
    use serde_json::json;

    fn orchestrator(oracle: StubOracle, fetcher: StubFetcher, store: Arc<StubStore>) -> Orchestrator {
        Orchestrator::new(
            PipelineOptions::default(),
            Arc::new(oracle),
            Arc::new(fetcher),
            store,
        )
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_any_phase() {
        let oracle = Arc::new(StubOracle::new());
        let fetcher = Arc::new(StubFetcher::new());
        let store = Arc::new(StubStore::new());
        let orchestrator = Orchestrator::new(
            PipelineOptions::default(),
            oracle.clone(),
            fetcher.clone(),
            store.clone(),
        );

        for bad in ["", "   ", "not a url", "ftp://example.com/file", "mailto:a@example.com"] {
            let result = orchestrator.adaptive_crawl(bad, "find deals", None).await;
            assert!(
                matches!(result, Err(CrawlerError::InvalidInput(_))),
                "{:?} should be rejected",
                bad
            );
        }

        assert!(oracle.prompts().is_empty());
        assert!(fetcher.calls().is_empty());
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_url_errors_carry_their_cause() {
        let orchestrator = orchestrator(StubOracle::failing(), StubFetcher::new(), Arc::new(StubStore::new()));

        match orchestrator.adaptive_crawl("ftp://example.com/file", "q", None).await {
            Err(CrawlerError::InvalidInput(message)) => {
                assert!(message.starts_with("invalid target URL"));
                assert!(message.contains("ftp"));
            }
            other => panic!("expected InvalidInput, got {:?}", other.map(|r| r.primary.url)),
        }

        match orchestrator.proactive_discovery("", &[]).await {
            Err(CrawlerError::InvalidInput(message)) => assert!(message.starts_with("invalid domain")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_domain_is_rejected() {
        let oracle = Arc::new(StubOracle::new());
        let orchestrator = Orchestrator::new(
            PipelineOptions::default(),
            oracle.clone(),
            Arc::new(StubFetcher::new()),
            Arc::new(StubStore::new()),
        );

        for bad in ["", "https://example.com", "no spaces.com", "localhost"] {
            assert!(matches!(
                orchestrator.proactive_discovery(bad, &[]).await,
                Err(CrawlerError::InvalidInput(_))
            ));
        }
        assert!(oracle.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_oracle_outage_end_to_end() {
        let fetcher = StubFetcher::new().page(
            "https://example.com/",
            "Home",
            vec!["https://example.com/a".to_string()],
        );
        let store = Arc::new(StubStore::new());
        let orchestrator = orchestrator(StubOracle::failing(), fetcher, store.clone());

        let result = orchestrator
            .adaptive_crawl("https://example.com/", "find deals", None)
            .await
            .unwrap();

        // deep_research fallback follows links, but ranking fails too
        assert_eq!(result.strategy_used.kind(), StrategyKind::DeepResearch);
        assert!(result.primary.success);
        assert!(result.opportunities.is_empty());
        assert!(result.adaptation_log.is_empty());
        assert_eq!(store.records().len(), 1);
        assert_eq!(orchestrator.learning_history().len(), 1);
    }

    #[tokio::test]
    async fn test_full_pipeline_with_followups() {
        let oracle = StubOracle::new()
            .respond(
                OracleTask::IntentAnalysis,
                json!({"primary_intent": "research", "recommended_patterns": ["reviews"]}),
            )
            .respond(
                OracleTask::StrategySelection,
                json!({"selected_strategy": "discovery_mode"}),
            )
            .respond(
                OracleTask::FollowupRanking,
                json!({"recommended_links": [
                    {"url": "https://example.com/a", "reasoning": "first"},
                    {"url": "https://example.com/b", "reasoning": "second"}
                ]}),
            );
        let fetcher = StubFetcher::new()
            .page("https://example.com/", "Home page", vec![])
            .page("https://example.com/a", "Page A", vec![])
            .failed_page("https://example.com/b", "HTTP 500");
        let store = Arc::new(StubStore::new());
        let orchestrator = orchestrator(oracle, fetcher, store.clone());

        let result = orchestrator
            .adaptive_crawl("https://example.com/", "compare laptops", None)
            .await
            .unwrap();

        assert_eq!(result.strategy_used.kind(), StrategyKind::DiscoveryMode);
        assert_eq!(result.opportunities.len(), 1);
        assert_eq!(result.opportunities[0].url, "https://example.com/a");
        assert_eq!(result.adaptation_log.len(), 1);

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url_pattern, "example.com");
        assert_eq!(records[0].user_intent, "compare laptops");
        assert_eq!(records[0].strategy_effectiveness.strategy_used, "Discovery Explorer");
        assert_eq!(records[0].strategy_effectiveness.opportunities_found, 1);
        assert_eq!(records[0].adaptation_notes, result.adaptation_log);

        let pattern = orchestrator.pattern_store().get("domain:example.com").unwrap();
        assert_eq!(pattern["last_strategy"], "discovery_mode");
    }

    #[tokio::test]
    async fn test_persistence_failure_does_not_fail_crawl() {
        let fetcher = StubFetcher::new().page("https://example.com/", "Home", vec![]);
        let orchestrator = orchestrator(StubOracle::failing(), fetcher, Arc::new(StubStore::failing()));

        let result = orchestrator
            .adaptive_crawl("https://example.com/", "find deals", None)
            .await;
        assert!(result.is_ok());
        assert_eq!(orchestrator.learning_history().len(), 1);
    }

    #[tokio::test]
    async fn test_discovery_does_not_fetch() {
        let oracle = StubOracle::new().respond(
            OracleTask::Discovery,
            json!({"suggested_urls": [{"url": "https://example.com/sale", "reasoning": "sales"}]}),
        );
        let fetcher = Arc::new(StubFetcher::new());
        let orchestrator = Orchestrator::new(
            PipelineOptions::default(),
            Arc::new(oracle),
            fetcher.clone(),
            Arc::new(StubStore::new()),
        );

        let opportunities = orchestrator
            .proactive_discovery(" Example.COM ", &["laptops".to_string()])
            .await
            .unwrap();

        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].url, "https://example.com/sale");
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_learned_state_seeds_patterns_and_history() {
        let store = Arc::new(StubStore::new().with_pattern("domain:example.com", json!({"runs": 4})));

        let seed = orchestrator(
            StubOracle::failing(),
            StubFetcher::new().page("https://example.com/", "Home", vec![]),
            store.clone(),
        );
        seed.adaptive_crawl("https://example.com/", "first run", None)
            .await
            .unwrap();

        let orchestrator = orchestrator(StubOracle::failing(), StubFetcher::new(), store);
        orchestrator.load_learned_state().await;

        assert_eq!(orchestrator.learning_history().len(), 1);
        assert_eq!(orchestrator.learning_history()[0].user_intent, "first run");
        // the seed run refreshed the stored pattern
        let pattern = orchestrator.pattern_store().get("domain:example.com").unwrap();
        assert_eq!(pattern["runs"], 1);
    }

    #[test]
    fn test_default_options() {
        let options = PipelineOptions::default();
        assert_eq!(options.history_window, MAX_HISTORY_WINDOW);
        assert!(!options.render_javascript);
    }
}
