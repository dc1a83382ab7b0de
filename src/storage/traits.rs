//! Storage traits and error types
//!
//! This module defines the trait interface for learning-store backends and
//! associated error types.

use crate::learning::LearningRecord;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent home of learning records and learned patterns
///
/// Every operation is best-effort from the pipeline's point of view: callers
/// log failures and carry on. Implementations must be shareable across
/// concurrent runs.
#[async_trait]
pub trait LearningStore: Send + Sync {
    /// Appends one record to the learning log
    async fn append_learning_record(&self, record: &LearningRecord) -> StorageResult<()>;

    /// Loads every learned pattern, keyed by pattern type
    async fn load_learned_patterns(&self) -> StorageResult<BTreeMap<String, Value>>;

    /// Inserts or replaces the pattern stored under `pattern_type`
    async fn save_learned_pattern(&self, pattern_type: &str, data: &Value) -> StorageResult<()>;

    /// Returns up to `limit` most recent records, newest first
    async fn recent_learning_records(&self, limit: usize) -> StorageResult<Vec<LearningRecord>>;
}
