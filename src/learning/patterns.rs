use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// In-memory cache of learned patterns, keyed by pattern type
///
/// Loaded from the learning store at startup and refreshed after each run.
/// Readers take a [`snapshot`](Self::snapshot); keys are ordered so prompts
/// built from a snapshot are deterministic.
#[derive(Debug, Default)]
pub struct PatternStore {
    patterns: RwLock<BTreeMap<String, Value>>,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_patterns(patterns: BTreeMap<String, Value>) -> Self {
        Self {
            patterns: RwLock::new(patterns),
        }
    }

    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, pattern_type: &str) -> Option<Value> {
        self.patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern_type)
            .cloned()
    }

    /// Inserts or replaces the pattern stored under `pattern_type`
    pub fn upsert(&self, pattern_type: impl Into<String>, data: Value) {
        self.patterns
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern_type.into(), data);
    }

    /// Replaces the pattern under `pattern_type` with `f(current)` under one
    /// write lock, returning the stored value
    pub fn update<F>(&self, pattern_type: &str, f: F) -> Value
    where
        F: FnOnce(Option<&Value>) -> Value,
    {
        let mut patterns = self.patterns.write().unwrap_or_else(PoisonError::into_inner);
        let data = f(patterns.get(pattern_type));
        patterns.insert(pattern_type.to_string(), data.clone());
        data
    }

    pub fn len(&self) -> usize {
        self.patterns.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
