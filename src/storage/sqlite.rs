//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the LearningStore
//! trait. The connection lives behind a mutex and every query runs on the
//! blocking thread pool.

use crate::learning::{Effectiveness, LearningRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{LearningStore, StorageError, StorageResult};
use crate::CrawlerError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// SQLite learning store
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and initializes the schema
    pub fn new(path: &Path) -> Result<Self, CrawlerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self::from_connection(conn))
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, CrawlerError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `f` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
            f(&*guard)
        })
        .await
        .map_err(|e| StorageError::Database(format!("storage task failed: {}", e)))?
    }
}

fn row_to_record(
    timestamp: String,
    url_pattern: String,
    user_intent: String,
    effectiveness: String,
    notes: String,
) -> StorageResult<LearningRecord> {
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|e| StorageError::Serialization(format!("bad timestamp '{}': {}", timestamp, e)))?
        .with_timezone(&Utc);

    Ok(LearningRecord {
        timestamp,
        url_pattern,
        user_intent,
        strategy_effectiveness: serde_json::from_str::<Effectiveness>(&effectiveness)?,
        adaptation_notes: serde_json::from_str(&notes)?,
    })
}

#[async_trait]
impl LearningStore for SqliteStore {
    async fn append_learning_record(&self, record: &LearningRecord) -> StorageResult<()> {
        let timestamp = record.timestamp.to_rfc3339();
        let url_pattern = record.url_pattern.clone();
        let user_intent = record.user_intent.clone();
        let effectiveness = serde_json::to_string(&record.strategy_effectiveness)?;
        let notes = serde_json::to_string(&record.adaptation_notes)?;

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO crawl_learning
                    (timestamp, url_pattern, user_intent, strategy_effectiveness, adaptation_notes)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![timestamp, url_pattern, user_intent, effectiveness, notes],
            )?;
            Ok(())
        })
        .await
    }

    async fn load_learned_patterns(&self) -> StorageResult<BTreeMap<String, Value>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT pattern_type, pattern_data FROM learned_patterns")?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

            let mut patterns = BTreeMap::new();
            for row in rows {
                let (pattern_type, data) = row?;
                match serde_json::from_str(&data) {
                    Ok(value) => {
                        patterns.insert(pattern_type, value);
                    }
                    Err(e) => {
                        tracing::warn!("Skipping unreadable pattern '{}': {}", pattern_type, e);
                    }
                }
            }
            Ok(patterns)
        })
        .await
    }

    async fn save_learned_pattern(&self, pattern_type: &str, data: &Value) -> StorageResult<()> {
        let pattern_type = pattern_type.to_string();
        let data = serde_json::to_string(data)?;
        let now = Utc::now().to_rfc3339();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO learned_patterns (pattern_type, pattern_data, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(pattern_type) DO UPDATE SET
                    pattern_data = excluded.pattern_data,
                    updated_at = excluded.updated_at",
                params![pattern_type, data, now],
            )?;
            Ok(())
        })
        .await
    }

    async fn recent_learning_records(&self, limit: usize) -> StorageResult<Vec<LearningRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT timestamp, url_pattern, user_intent, strategy_effectiveness, adaptation_notes
                 FROM crawl_learning ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?;

            let mut records = Vec::new();
            for row in rows {
                let (timestamp, url_pattern, user_intent, effectiveness, notes) = row?;
                match row_to_record(timestamp, url_pattern.clone(), user_intent, effectiveness, notes) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable learning record for '{}': {}", url_pattern, e);
                    }
                }
            }
            Ok(records)
        })
        .await
    }
}
