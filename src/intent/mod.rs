//! Request interpretation
//!
//! Turns a free-text request into a [`CrawlContext`] that the rest of the
//! pipeline reads. The context is built once per run and never changed.

mod analyzer;

pub use analyzer::IntentAnalyzer;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// What the caller is trying to achieve with a crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    #[default]
    Research,
    Monitoring,
    Discovery,
    Extraction,
}

impl Intent {
    /// Maps an oracle label to an intent; anything unrecognised is research
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "research" => Self::Research,
            "monitoring" => Self::Monitoring,
            "discovery" => Self::Discovery,
            "extraction" => Self::Extraction,
            other => {
                tracing::debug!("Unrecognised intent '{}', treating as research", other);
                Self::Research
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Monitoring => "monitoring",
            Self::Discovery => "discovery",
            Self::Extraction => "extraction",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured interpretation of one crawl request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlContext {
    pub user_intent: Intent,
    /// Opaque domain insights returned by the oracle
    pub domain_knowledge: Map<String, Value>,
    pub success_patterns: Vec<String>,
    pub failure_patterns: Vec<String>,
    pub time_budget_secs: Option<u64>,
}

impl CrawlContext {
    /// The context used whenever intent analysis fails
    pub fn fallback() -> Self {
        Self::default()
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs.map(Duration::from_secs)
    }
}
