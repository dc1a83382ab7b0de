//! Crawl phase definitions for the executor state machine
//!
//! A run moves `PrimaryFetch → (FollowupSelect → FollowupFetch)? → Done`.

use serde::Serialize;
use std::fmt;

/// Represents the phase an executor run is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlPhase {
    /// Fetching the target URL
    PrimaryFetch,

    /// Asking the oracle which discovered links deserve a follow-up
    FollowupSelect,

    /// Fetching the selected follow-up links
    FollowupFetch,

    /// Terminal: the result has been assembled
    Done,
}

impl CrawlPhase {
    /// Returns true for the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if the state machine allows moving from `self` to `next`
    ///
    /// Every non-terminal phase may short-circuit to `Done`; otherwise phases
    /// only advance in order.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        match (self, next) {
            (Self::Done, _) => false,
            (_, Self::Done) => true,
            (Self::PrimaryFetch, Self::FollowupSelect) => true,
            (Self::FollowupSelect, Self::FollowupFetch) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryFetch => "primary_fetch",
            Self::FollowupSelect => "followup_select",
            Self::FollowupFetch => "followup_fetch",
            Self::Done => "done",
        }
    }

    /// Returns all phases in machine order
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::PrimaryFetch,
            Self::FollowupSelect,
            Self::FollowupFetch,
            Self::Done,
        ]
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
