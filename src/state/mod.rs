//! State module for tracking crawl progress
//!
//! `CrawlPhase` models the executor's bounded state machine: one primary
//! fetch, an optional follow-up selection, an optional batch of follow-up
//! fetches, then done.

mod phase;

pub use phase::CrawlPhase;
