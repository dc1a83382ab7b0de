//! Database schema definitions
//!
//! This module contains the SQL schema for the learning database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Append-only log of crawl outcomes
CREATE TABLE IF NOT EXISTS crawl_learning (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    url_pattern TEXT NOT NULL,
    user_intent TEXT NOT NULL,
    strategy_effectiveness TEXT NOT NULL,
    adaptation_notes TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawl_learning_url_pattern ON crawl_learning(url_pattern);
CREATE INDEX IF NOT EXISTS idx_crawl_learning_timestamp ON crawl_learning(timestamp);

-- Learned signals keyed by pattern type (e.g. "domain:example.com")
CREATE TABLE IF NOT EXISTS learned_patterns (
    pattern_type TEXT PRIMARY KEY,
    pattern_data TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
