//! Page fetching
//!
//! This module defines the page-fetch collaborator and its default HTTP
//! implementation, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with a per-call timeout
//! - Content-Type checks and HTML extraction
//! - Error classification

use crate::config::UserAgentConfig;
use crate::crawler::parser::parse_html;
use crate::strategy::Strategy;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{redirect::Policy, Client};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors a fetcher can report instead of an outcome
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            Self::Body(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Per-fetch parameters derived from the run's strategy
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub render_javascript: bool,
    pub depth_hint: u32,
    pub extraction_hints: Vec<String>,
}

impl FetchConfig {
    pub fn for_strategy(strategy: &Strategy, timeout: Duration, render_javascript: bool) -> Self {
        Self {
            timeout,
            render_javascript,
            depth_hint: strategy.depth_limit(),
            extraction_hints: strategy.extract_patterns().to_vec(),
        }
    }
}

/// Result of fetching one page
///
/// A failed outcome is still an outcome: it carries the URL, the error and
/// whatever metadata (e.g. the HTTP status) was available.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchOutcome {
    pub url: String,
    pub success: bool,
    pub content: String,
    pub links: Vec<String>,
    pub metadata: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn succeeded(url: impl Into<String>, content: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            url: url.into(),
            success: true,
            content: content.into(),
            links,
            metadata: Map::new(),
            timestamp: Utc::now(),
            error: None,
        }
    }

    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            content: String::new(),
            links: Vec::new(),
            metadata: Map::new(),
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// The page title, if the fetcher recorded one
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(|v| v.as_str())
    }
}

/// The page-fetch collaborator
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, config: &FetchConfig) -> Result<FetchOutcome, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// The overall request timeout is applied per call from [`FetchConfig`].
///
/// # Example
///
/// ```no_run
/// use adaptive_crawler::config::UserAgentConfig;
/// use adaptive_crawler::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "AdaptiveCrawler".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over plain HTTP and extracts text and links from HTML
///
/// Pages are not rendered; `render_javascript` is accepted and recorded in the
/// outcome metadata but the raw HTML is what gets parsed.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, config: &FetchConfig) -> Result<FetchOutcome, FetchError> {
        if config.render_javascript {
            tracing::debug!("JavaScript rendering requested for {}; fetching raw HTML", url);
        }

        let response = self
            .client
            .get(url.as_str())
            .timeout(config.timeout)
            .send()
            .await?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            tracing::debug!("{} returned HTTP {}", url, status.as_u16());
            return Ok(FetchOutcome::failed(url.as_str(), format!("HTTP {}", status.as_u16()))
                .with_metadata("status_code", status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return Ok(FetchOutcome::failed(
                url.as_str(),
                format!("Unsupported content type: {}", content_type),
            )
            .with_metadata("status_code", status.as_u16())
            .with_metadata("content_type", content_type));
        }

        let body = response.text().await?;
        let parsed = parse_html(&body, &final_url);

        let mut outcome = FetchOutcome::succeeded(url.as_str(), parsed.text, parsed.links)
            .with_metadata("status_code", status.as_u16())
            .with_metadata("content_type", content_type)
            .with_metadata("rendered", false);

        if final_url != *url {
            outcome = outcome.with_metadata("final_url", final_url.as_str());
        }
        if let Some(title) = parsed.title {
            outcome = outcome.with_metadata("title", title);
        }

        Ok(outcome)
    }
}
