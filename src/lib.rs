//! Adaptive Crawler: intelligence-guided web crawling
//!
//! This crate turns a target URL and a natural-language request into a bounded,
//! adaptive crawl. A reasoning oracle is consulted to interpret the request,
//! pick a crawl strategy and rank follow-up links; every run's outcome is fed
//! back into a learning store that biases future decisions.

pub mod config;
pub mod crawler;
pub mod discovery;
pub mod intent;
pub mod learning;
pub mod oracle;
pub mod orchestrator;
pub mod output;
pub mod state;
pub mod storage;
pub mod strategy;
pub mod url;

#[cfg(test)]
pub(crate) mod testing;

use thiserror::Error;

/// Main error type for adaptive crawler operations
///
/// Oracle, fetch and persistence failures are recovered inside the pipeline
/// and never reach this type during a run; `InvalidInput` is the only variant
/// an orchestration call returns.
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed domain: {0}")]
    MalformedDomain(String),
}

/// Result type alias for adaptive crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlResult, FetchOutcome, OpportunityOutcome};
pub use discovery::Opportunity;
pub use intent::{CrawlContext, Intent};
pub use orchestrator::Orchestrator;
pub use state::CrawlPhase;
pub use strategy::{Strategy, StrategyKind};
