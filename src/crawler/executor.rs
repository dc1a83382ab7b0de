//! Crawl executor - the bounded primary/follow-up state machine
//!
//! One call to [`CrawlExecutor::execute`] walks
//! `PrimaryFetch → (FollowupSelect → FollowupFetch)? → Done`. No failure
//! escapes: a failed primary fetch ends the run early, a failed follow-up is
//! recorded in the adaptation log and its siblings carry on.

use crate::crawler::{
    CrawlResult, FetchConfig, FetchError, FetchOutcome, FollowupLink, FollowupSelector,
    OpportunityOutcome, PageFetcher, PerformanceMetrics, Relation, MAX_FOLLOWUPS,
};
use crate::intent::CrawlContext;
use crate::state::CrawlPhase;
use crate::strategy::Strategy;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Tracks the current phase and the ordered trace of visited phases
struct PhaseTracker {
    current: CrawlPhase,
    trace: Vec<CrawlPhase>,
}

impl PhaseTracker {
    fn start() -> Self {
        Self {
            current: CrawlPhase::PrimaryFetch,
            trace: vec![CrawlPhase::PrimaryFetch],
        }
    }

    fn advance(&mut self, next: CrawlPhase) {
        debug_assert!(
            self.current.can_transition_to(next),
            "illegal phase transition {} -> {}",
            self.current,
            next
        );
        tracing::debug!("Phase {} -> {}", self.current, next);
        self.current = next;
        self.trace.push(next);
    }
}

/// Executes one crawl under a selected strategy
pub struct CrawlExecutor {
    fetcher: Arc<dyn PageFetcher>,
    followups: FollowupSelector,
    fetch_timeout: Duration,
    render_javascript: bool,
}

impl CrawlExecutor {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        followups: FollowupSelector,
        fetch_timeout: Duration,
        render_javascript: bool,
    ) -> Self {
        Self {
            fetcher,
            followups,
            fetch_timeout,
            render_javascript,
        }
    }

    /// Runs the state machine for `target`
    ///
    /// `run_started` is when the whole adaptive run began; the context's time
    /// budget is measured from it.
    pub async fn execute(
        &self,
        target: &Url,
        strategy: &Strategy,
        context: &CrawlContext,
        run_started: Instant,
    ) -> CrawlResult {
        let started = Instant::now();
        let fetch_config = FetchConfig::for_strategy(strategy, self.fetch_timeout, self.render_javascript);
        let mut phases = PhaseTracker::start();
        let mut adaptation_log = Vec::new();
        let mut opportunities = Vec::new();
        let mut metrics = PerformanceMetrics::default();

        tracing::info!("Fetching {} with strategy '{}'", target, strategy.name());

        let primary = match self.fetch_one(target, &fetch_config).await {
            Ok(outcome) => outcome,
            Err(e) => FetchOutcome::failed(target.as_str(), e.to_string()),
        };

        metrics.content_length = primary.content.len();
        metrics.links_discovered = primary.links.len();

        if !primary.success {
            let reason = primary.error.as_deref().unwrap_or("unknown error");
            tracing::warn!("Primary fetch of {} failed: {}", target, reason);
            adaptation_log.push(format!("Primary fetch of {} failed: {}", target, reason));
        } else if !strategy.wants_followups() {
            tracing::debug!(
                "Strategy '{}' does not follow links (depth {}, follow_links {})",
                strategy.name(),
                strategy.depth_limit(),
                strategy.follow_links()
            );
        } else if let Some(budget) = context.time_budget().filter(|b| run_started.elapsed() >= *b) {
            tracing::info!("Time budget exhausted, skipping follow-ups");
            adaptation_log.push(format!(
                "Time budget of {}s exhausted before follow-up selection; follow-ups skipped",
                budget.as_secs()
            ));
        } else {
            phases.advance(CrawlPhase::FollowupSelect);
            let selected = self.followups.select(&primary, context, strategy).await;
            metrics.followups_selected = selected.len();

            if !selected.is_empty() {
                phases.advance(CrawlPhase::FollowupFetch);
                tracing::info!("Fetching {} follow-up links", selected.len());

                let outcomes = self.fetch_followups(&selected, &fetch_config).await;
                for (link, outcome) in selected.into_iter().zip(outcomes) {
                    match outcome {
                        Ok(outcome) if outcome.success => {
                            metrics.followups_succeeded += 1;
                            opportunities.push(OpportunityOutcome {
                                url: link.url.to_string(),
                                relation_to_primary: Relation::DiscoveredLink,
                                reasoning: link.reasoning,
                                outcome,
                            });
                        }
                        Ok(outcome) => {
                            metrics.followups_failed += 1;
                            let reason = outcome.error.unwrap_or_else(|| "unknown error".to_string());
                            tracing::warn!("Follow-up {} failed: {}", link.url, reason);
                            adaptation_log.push(format!("Failed to crawl {}: {}", link.url, reason));
                        }
                        Err(e) => {
                            metrics.followups_failed += 1;
                            tracing::warn!("Follow-up {} failed: {}", link.url, e);
                            adaptation_log.push(format!("Failed to crawl {}: {}", link.url, e));
                        }
                    }
                }
            }
        }

        phases.advance(CrawlPhase::Done);
        metrics.phase_trace = phases.trace;
        metrics.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::info!(
            "Crawl of {} done: primary {}, {} opportunities, {} log entries",
            target,
            if primary.success { "ok" } else { "failed" },
            opportunities.len(),
            adaptation_log.len()
        );

        CrawlResult {
            strategy_used: strategy.clone(),
            primary,
            opportunities,
            adaptation_log,
            metrics,
        }
    }

    /// Fetches one URL under the configured timeout
    async fn fetch_one(&self, url: &Url, config: &FetchConfig) -> Result<FetchOutcome, FetchError> {
        tokio::time::timeout(config.timeout, self.fetcher.fetch(url, config))
            .await
            .map_err(|_| FetchError::Timeout)?
    }

    /// Fetches the follow-ups concurrently; results come back in link order
    async fn fetch_followups(
        &self,
        links: &[FollowupLink],
        config: &FetchConfig,
    ) -> Vec<Result<FetchOutcome, FetchError>> {
        let fetches = links
            .iter()
            .take(MAX_FOLLOWUPS)
            .map(|link| self.fetch_one(&link.url, config));
        join_all(fetches).await
    }
}
