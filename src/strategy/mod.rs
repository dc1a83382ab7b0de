//! Crawl strategies
//!
//! A strategy is a named bundle of crawl parameters. The set of strategies is
//! closed ([`StrategyKind`]) and built once into a [`StrategyCatalog`]; a run
//! may only derive a modified copy through [`Strategy::apply`].

mod catalog;
mod modification;
mod selector;

pub use catalog::StrategyCatalog;
pub use modification::{StrategyModification, MAX_DEPTH_LIMIT};
pub use selector::StrategySelector;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of catalog strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Thorough multi-page analysis
    DeepResearch,
    /// Fast single-page overview
    QuickScan,
    /// Exploration of navigation and related content
    DiscoveryMode,
}

impl StrategyKind {
    /// The catalog key the oracle refers to this strategy by
    pub fn key(&self) -> &'static str {
        match self {
            Self::DeepResearch => "deep_research",
            Self::QuickScan => "quick_scan",
            Self::DiscoveryMode => "discovery_mode",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "deep_research" => Some(Self::DeepResearch),
            "quick_scan" => Some(Self::QuickScan),
            "discovery_mode" => Some(Self::DiscoveryMode),
            _ => None,
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::DeepResearch, Self::QuickScan, Self::DiscoveryMode]
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A crawl strategy
///
/// Fields are read-only outside this module; the only way to change a
/// strategy is [`Strategy::apply`], which returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Strategy {
    #[serde(rename = "key")]
    kind: StrategyKind,
    name: String,
    description: String,
    target_patterns: Vec<String>,
    depth_limit: u32,
    follow_links: bool,
    extract_patterns: Vec<String>,
    success_metrics: BTreeMap<String, f64>,
    adaptation_rules: Vec<String>,
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// Human-readable name, e.g. "Deep Research"
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn target_patterns(&self) -> &[String] {
        &self.target_patterns
    }

    pub fn depth_limit(&self) -> u32 {
        self.depth_limit
    }

    pub fn follow_links(&self) -> bool {
        self.follow_links
    }

    pub fn extract_patterns(&self) -> &[String] {
        &self.extract_patterns
    }

    pub fn success_metrics(&self) -> &BTreeMap<String, f64> {
        &self.success_metrics
    }

    pub fn adaptation_rules(&self) -> &[String] {
        &self.adaptation_rules
    }

    /// True when the executor should consider follow-up links at all
    pub fn wants_followups(&self) -> bool {
        self.follow_links && self.depth_limit > 1
    }
}
