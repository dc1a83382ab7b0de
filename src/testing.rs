//! Scripted collaborators for unit tests

use crate::crawler::{FetchConfig, FetchError, FetchOutcome, PageFetcher};
use crate::learning::LearningRecord;
use crate::oracle::{OracleError, OraclePrompt, OracleTask, ReasoningClient};
use crate::storage::{LearningStore, StorageError, StorageResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Oracle answering each task with a fixed payload
#[derive(Default)]
pub struct StubOracle {
    answers: HashMap<OracleTask, Value>,
    delay: Option<Duration>,
    fail: bool,
    prompts: Mutex<Vec<OraclePrompt>>,
}

impl StubOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// An oracle that is always unreachable
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn respond(mut self, task: OracleTask, answer: Value) -> Self {
        self.answers.insert(task, answer);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<OraclePrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningClient for StubOracle {
    async fn complete(&self, prompt: &OraclePrompt) -> Result<Value, OracleError> {
        self.prompts.lock().unwrap().push(prompt.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(OracleError::Network("connection refused".to_string()));
        }

        self.answers
            .get(&prompt.task)
            .cloned()
            .ok_or_else(|| OracleError::Network(format!("no scripted answer for {}", prompt.task)))
    }
}

enum Scripted {
    Outcome(FetchOutcome),
    Error(FetchError),
}

/// Fetcher serving scripted pages by URL
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, Scripted>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    configs: Mutex<Vec<FetchConfig>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, content: &str, links: Vec<String>) -> Self {
        self.pages.insert(
            url.to_string(),
            Scripted::Outcome(FetchOutcome::succeeded(url, content, links)),
        );
        self
    }

    /// A page that comes back as a failed outcome
    pub fn failed_page(mut self, url: &str, error: &str) -> Self {
        self.pages
            .insert(url.to_string(), Scripted::Outcome(FetchOutcome::failed(url, error)));
        self
    }

    /// A page whose fetch returns an error
    pub fn fail(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(url.to_string(), Scripted::Error(error));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs fetched so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn configs(&self) -> Vec<FetchConfig> {
        self.configs.lock().unwrap().clone()
    }
}

fn copy_error(error: &FetchError) -> FetchError {
    match error {
        FetchError::Timeout => FetchError::Timeout,
        FetchError::Connect(msg) => FetchError::Connect(msg.clone()),
        FetchError::Network(msg) => FetchError::Network(msg.clone()),
        FetchError::Body(msg) => FetchError::Body(msg.clone()),
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &Url, config: &FetchConfig) -> Result<FetchOutcome, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.configs.lock().unwrap().push(config.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.pages.get(url.as_str()) {
            Some(Scripted::Outcome(outcome)) => Ok(outcome.clone()),
            Some(Scripted::Error(error)) => Err(copy_error(error)),
            None => Err(FetchError::Network(format!("no scripted page for {}", url))),
        }
    }
}

/// In-memory learning store, optionally always failing
#[derive(Default)]
pub struct StubStore {
    records: Mutex<Vec<LearningRecord>>,
    patterns: Mutex<BTreeMap<String, Value>>,
    fail: bool,
}

impl StubStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_pattern(self, pattern_type: &str, data: Value) -> Self {
        self.patterns
            .lock()
            .unwrap()
            .insert(pattern_type.to_string(), data);
        self
    }

    /// Records appended so far, oldest first
    pub fn records(&self) -> Vec<LearningRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn patterns(&self) -> BTreeMap<String, Value> {
        self.patterns.lock().unwrap().clone()
    }

    fn check(&self) -> StorageResult<()> {
        if self.fail {
            Err(StorageError::Database("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LearningStore for StubStore {
    async fn append_learning_record(&self, record: &LearningRecord) -> StorageResult<()> {
        self.check()?;
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn load_learned_patterns(&self) -> StorageResult<BTreeMap<String, Value>> {
        self.check()?;
        Ok(self.patterns())
    }

    async fn save_learned_pattern(&self, pattern_type: &str, data: &Value) -> StorageResult<()> {
        self.check()?;
        self.patterns
            .lock()
            .unwrap()
            .insert(pattern_type.to_string(), data.clone());
        Ok(())
    }

    async fn recent_learning_records(&self, limit: usize) -> StorageResult<Vec<LearningRecord>> {
        self.check()?;
        Ok(self.records().into_iter().rev().take(limit).collect())
    }
}
