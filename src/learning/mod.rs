//! Feedback from finished runs
//!
//! Every adaptive crawl ends with a [`LearningRecord`]. Records are appended
//! to the persistent learning store and to a bounded in-memory window, and the
//! per-domain entry in the [`PatternStore`] is refreshed so later prompts see
//! what happened.

mod patterns;
mod recorder;

pub use patterns::PatternStore;
pub use recorder::LearningRecorder;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of learning records kept in memory
pub const MAX_HISTORY_WINDOW: usize = 100;

/// How well a strategy did on one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effectiveness {
    pub duration_secs: f64,
    /// Primary content size in bytes
    pub content_extracted: usize,
    pub opportunities_found: usize,
    /// Display name of the strategy used
    pub strategy_used: String,
}

/// Outcome summary of one adaptive crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRecord {
    pub timestamp: DateTime<Utc>,
    /// Host of the target URL
    pub url_pattern: String,
    /// The caller's original request text
    pub user_intent: String,
    pub strategy_effectiveness: Effectiveness,
    pub adaptation_notes: Vec<String>,
}

/// Pattern-store key for a host
pub fn domain_pattern_key(host: &str) -> String {
    format!("domain:{}", host)
}
