//! Storage module for persisting learning data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - The append-only learning log
//! - Learned pattern persistence

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{LearningStore, StorageError, StorageResult};

use crate::CrawlerError;
use std::path::Path;

/// Opens or creates the learning database at `path`
pub fn open_store(path: &Path) -> Result<SqliteStore, CrawlerError> {
    SqliteStore::new(path)
}
