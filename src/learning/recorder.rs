use super::{domain_pattern_key, Effectiveness, LearningRecord, PatternStore, MAX_HISTORY_WINDOW};
use crate::crawler::CrawlResult;
use crate::storage::LearningStore;
use crate::strategy::Strategy;
use crate::url::extract_domain;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// Records run outcomes to the store, the history window and the pattern store
pub struct LearningRecorder {
    store: Arc<dyn LearningStore>,
    patterns: Arc<PatternStore>,
    history: RwLock<VecDeque<LearningRecord>>,
    window: usize,
    /// Held across a pattern refresh and its store write
    pattern_writes: Mutex<()>,
}

impl LearningRecorder {
    /// Creates a recorder keeping at most `window` records in memory
    ///
    /// `window` is clamped to `1..=MAX_HISTORY_WINDOW`.
    pub fn new(store: Arc<dyn LearningStore>, patterns: Arc<PatternStore>, window: usize) -> Self {
        let window = window.clamp(1, MAX_HISTORY_WINDOW);
        Self {
            store,
            patterns,
            history: RwLock::new(VecDeque::with_capacity(window)),
            window,
            pattern_writes: Mutex::new(()),
        }
    }

    /// Seeds the history window with records loaded at startup (newest first)
    pub fn preload(&self, records: Vec<LearningRecord>) {
        for record in records.into_iter().take(self.window).rev() {
            self.push_history(record);
        }
    }

    /// Records the outcome of one run and returns the record that was built
    ///
    /// Store failures are logged and swallowed; the in-memory window and the
    /// pattern store are always updated.
    pub async fn record(
        &self,
        target: &Url,
        query: &str,
        strategy: &Strategy,
        result: &CrawlResult,
        elapsed: Duration,
    ) -> LearningRecord {
        let host = extract_domain(target).unwrap_or_default();

        let record = LearningRecord {
            timestamp: Utc::now(),
            url_pattern: host.clone(),
            user_intent: query.to_string(),
            strategy_effectiveness: Effectiveness {
                duration_secs: elapsed.as_secs_f64(),
                content_extracted: result.content_size(),
                opportunities_found: result.opportunities.len(),
                strategy_used: strategy.name().to_string(),
            },
            adaptation_notes: result.adaptation_log.clone(),
        };

        if let Err(e) = self.store.append_learning_record(&record).await {
            tracing::warn!("Could not store learning data: {}", e);
        }

        self.push_history(record.clone());

        if !host.is_empty() {
            self.refresh_pattern(&host, strategy, result).await;
        }

        tracing::debug!(
            "Recorded learning for {} ({} in window)",
            record.url_pattern,
            self.history_len()
        );

        record
    }

    /// The in-memory window, oldest first
    pub fn recent_history(&self) -> Vec<LearningRecord> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Appends and trims under one write lock
    fn push_history(&self, record: LearningRecord) {
        let mut history = self.history.write().unwrap_or_else(PoisonError::into_inner);
        history.push_back(record);
        while history.len() > self.window {
            history.pop_front();
        }
    }

    async fn refresh_pattern(&self, host: &str, strategy: &Strategy, result: &CrawlResult) {
        let key = domain_pattern_key(host);

        // Refreshes for one recorder reach the store in the order their
        // counters were assigned.
        let _guard = self.pattern_writes.lock().await;

        let data = self.patterns.update(&key, |existing| {
            let runs = existing
                .and_then(|existing| existing.get("runs"))
                .and_then(Value::as_u64)
                .unwrap_or(0)
                + 1;

            json!({
                "last_strategy": strategy.kind().key(),
                "last_strategy_name": strategy.name(),
                "opportunities_found": result.opportunities.len(),
                "content_size": result.content_size(),
                "primary_success": result.primary.success,
                "runs": runs,
                "updated_at": Utc::now().to_rfc3339(),
            })
        });

        if let Err(e) = self.store.save_learned_pattern(&key, &data).await {
            tracing::warn!("Could not store learned pattern {}: {}", key, e);
        }
    }
}
