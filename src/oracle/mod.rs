//! Reasoning oracle abstraction
//!
//! Every decision point in the pipeline (intent analysis, strategy choice,
//! follow-up ranking, discovery) is a single call: send a structured prompt,
//! get JSON back. The [`ReasoningClient`] trait is that call. Responses are
//! never trusted: callers go through [`complete_as`], which applies the call
//! timeout and decodes into a typed response, and fall back locally on any
//! error.

mod anthropic;
mod decode;

pub use anthropic::AnthropicClient;
pub use decode::{parse_json_payload, strip_code_fences};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while consulting the oracle
///
/// All variants are recoverable: call sites log them and take their fallback.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("API key not configured (expected in ${0})")]
    MissingApiKey(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Oracle call timed out")]
    Timeout,

    #[error("Oracle returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Malformed oracle response: {0}")]
    Malformed(String),

    #[error("Unexpected response shape: {0}")]
    Shape(String),
}

/// The decision an oracle call is made for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleTask {
    IntentAnalysis,
    StrategySelection,
    FollowupRanking,
    Discovery,
}

impl fmt::Display for OracleTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IntentAnalysis => "intent_analysis",
            Self::StrategySelection => "strategy_selection",
            Self::FollowupRanking => "followup_ranking",
            Self::Discovery => "discovery",
        };
        write!(f, "{}", name)
    }
}

/// A single structured request to the oracle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OraclePrompt {
    pub task: OracleTask,
    pub system: Option<String>,
    pub user: String,
    pub max_tokens: u32,
}

impl OraclePrompt {
    pub fn new(task: OracleTask, user: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            task,
            system: None,
            user: user.into(),
            max_tokens,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// "Given structured context, return structured JSON"
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Sends the prompt and returns the parsed JSON payload of the answer
    async fn complete(&self, prompt: &OraclePrompt) -> Result<Value, OracleError>;
}

/// Calls the oracle under `timeout` and decodes the answer into `T`
///
/// A timeout is reported as [`OracleError::Timeout`]; a payload that does not
/// deserialize into `T` as [`OracleError::Shape`].
pub async fn complete_as<T: DeserializeOwned>(
    client: &dyn ReasoningClient,
    prompt: &OraclePrompt,
    timeout: Duration,
) -> Result<T, OracleError> {
    tracing::debug!("Consulting oracle for {}", prompt.task);

    let value = tokio::time::timeout(timeout, client.complete(prompt))
        .await
        .map_err(|_| OracleError::Timeout)??;

    serde_json::from_value(value).map_err(|e| OracleError::Shape(e.to_string()))
}

/// Pretty-prints a serializable value for inclusion in a prompt
pub(crate) fn to_prompt_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
