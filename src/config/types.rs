use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the adaptive crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub oracle: OracleConfig,
    pub learning: LearningConfig,
}

/// Fetch behaviour configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Per-fetch timeout in seconds
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,

    /// Ask the fetch collaborator to render JavaScript
    #[serde(rename = "render-javascript", default)]
    pub render_javascript: bool,
}

impl CrawlerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the user agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Reasoning oracle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// Base URL of the messages API (e.g. "https://api.anthropic.com/v1")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Per-call timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Upper bound on response tokens per call
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Learning store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LearningConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Number of learning records kept in memory (at most 100)
    #[serde(rename = "history-window", default = "default_history_window")]
    pub history_window: usize,
}

fn default_history_window() -> usize {
    crate::learning::MAX_HISTORY_WINDOW
}
