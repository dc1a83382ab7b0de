//! Crawler module for page fetching and crawl execution
//!
//! This module contains the core crawling logic, including:
//! - The page-fetch collaborator and its HTTP implementation
//! - HTML parsing and link extraction
//! - Oracle-ranked follow-up link selection
//! - The bounded primary/follow-up execution state machine

mod executor;
mod fetcher;
mod followup;
mod parser;

pub use executor::CrawlExecutor;
pub use fetcher::{build_http_client, FetchConfig, FetchError, FetchOutcome, HttpFetcher, PageFetcher};
pub use followup::{FollowupLink, FollowupSelector};
pub use parser::{parse_html, ParsedPage};

use crate::state::CrawlPhase;
use crate::strategy::Strategy;
use serde::Serialize;

/// Maximum number of follow-up fetches per run
pub const MAX_FOLLOWUPS: usize = 3;

/// Characters of primary content shown to the oracle when ranking links
pub const SUMMARY_CHARS: usize = 1000;

/// Discovered links offered to the oracle as follow-up candidates
pub const LINK_CANDIDATES: usize = 20;

/// How a follow-up page relates to the primary page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    DiscoveredLink,
}

/// A successfully fetched follow-up page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityOutcome {
    pub url: String,
    pub relation_to_primary: Relation,
    /// The oracle's reason for following this link
    pub reasoning: String,
    pub outcome: FetchOutcome,
}

impl OpportunityOutcome {
    /// Extracted text of the follow-up page
    pub fn content(&self) -> &str {
        &self.outcome.content
    }
}

/// Timing and counters for one executed crawl
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub duration_ms: u64,
    pub content_length: usize,
    pub links_discovered: usize,
    pub followups_selected: usize,
    pub followups_succeeded: usize,
    pub followups_failed: usize,
    /// Phases visited, in order
    pub phase_trace: Vec<CrawlPhase>,
}

/// Everything one adaptive crawl produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlResult {
    pub strategy_used: Strategy,
    pub primary: FetchOutcome,
    pub opportunities: Vec<OpportunityOutcome>,
    pub adaptation_log: Vec<String>,
    pub metrics: PerformanceMetrics,
}

impl CrawlResult {
    /// Size of the extracted primary content in bytes
    pub fn content_size(&self) -> usize {
        self.primary.content.len()
    }
}
