//! Integration tests for the adaptive crawler
//!
//! These tests use wiremock for both the crawled site and the oracle's
//! Messages API, and a temporary SQLite database, to drive the orchestrator
//! end-to-end through its public API.

use adaptive_crawler::config::{load_config, OracleConfig, UserAgentConfig};
use adaptive_crawler::crawler::HttpFetcher;
use adaptive_crawler::oracle::AnthropicClient;
use adaptive_crawler::orchestrator::PipelineOptions;
use adaptive_crawler::storage::{LearningStore, SqliteStore};
use adaptive_crawler::{CrawlerError, Orchestrator, StrategyKind};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INTENT_MARKER: &str = "User Query:";
const STRATEGY_MARKER: &str = "Select the optimal crawling strategy";
const FOLLOWUP_MARKER: &str = "follow-up links to crawl";
const DISCOVERY_MARKER: &str = "high-value URLs";

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn oracle_config(base_url: &str) -> OracleConfig {
    OracleConfig {
        base_url: base_url.to_string(),
        model: "test-model".to_string(),
        api_key_env: "ADAPTIVE_CRAWLER_UNUSED_KEY".to_string(),
        timeout_secs: 5,
        max_tokens: 1000,
    }
}

fn options() -> PipelineOptions {
    PipelineOptions {
        oracle_timeout: Duration::from_secs(5),
        fetch_timeout: Duration::from_secs(5),
        render_javascript: false,
        history_window: 100,
    }
}

/// Builds an orchestrator wired to the mock oracle and a database in `dir`
async fn build_orchestrator(oracle: &MockServer, dir: &TempDir) -> (Orchestrator, SqliteStore) {
    let client = AnthropicClient::with_api_key(oracle_config(&oracle.uri()), Some("test-key".to_string()))
        .expect("Failed to build oracle client");
    let fetcher = HttpFetcher::new(&user_agent()).expect("Failed to build fetcher");
    let store = SqliteStore::new(&dir.path().join("learning.db")).expect("Failed to open store");

    let orchestrator = Orchestrator::new(
        options(),
        Arc::new(client),
        Arc::new(fetcher),
        Arc::new(store.clone()),
    );
    orchestrator.load_learned_state().await;
    (orchestrator, store)
}

/// A Messages API response whose text is the given JSON payload
fn oracle_reply(payload: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "msg_test",
        "type": "message",
        "content": [{ "type": "text", "text": payload.to_string() }]
    }))
}

async fn mount_oracle(oracle: &MockServer, marker: &str, payload: Value) {
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_string_contains(marker))
        .respond_with(oracle_reply(payload))
        .mount(oracle)
        .await;
}

async fn mount_page(site: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body),
        )
        .mount(site)
        .await;
}

#[tokio::test]
async fn test_full_adaptive_crawl() {
    let site = MockServer::start().await;
    let oracle = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let base = site.uri();

    mount_page(
        &site,
        "/",
        r#"<html><head><title>Deals</title></head><body>
            <p>Weekly laptop offers</p>
            <a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>
        </body></html>"#,
    )
    .await;
    mount_page(&site, "/a", "<html><body><p>Offer A</p></body></html>").await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&site)
        .await;
    mount_page(&site, "/c", "<html><body><p>Offer C</p></body></html>").await;

    mount_oracle(
        &oracle,
        INTENT_MARKER,
        json!({
            "primary_intent": "research",
            "domain_insights": {"vertical": "electronics"},
            "recommended_patterns": ["price tables"],
            "avoid_patterns": []
        }),
    )
    .await;
    mount_oracle(
        &oracle,
        STRATEGY_MARKER,
        json!({"selected_strategy": "deep_research", "modifications": {"additional_patterns": ["prices"]}}),
    )
    .await;
    mount_oracle(
        &oracle,
        FOLLOWUP_MARKER,
        json!({"recommended_links": [
            {"url": format!("{}/a", base), "reasoning": "first offer"},
            {"url": format!("{}/b", base), "reasoning": "second offer"},
            {"url": format!("{}/c", base), "reasoning": "third offer"}
        ]}),
    )
    .await;

    let (orchestrator, store) = build_orchestrator(&oracle, &dir).await;

    let result = orchestrator
        .adaptive_crawl(&format!("{}/", base), "find laptop deals", None)
        .await
        .expect("Crawl should succeed");

    assert_eq!(result.strategy_used.kind(), StrategyKind::DeepResearch);
    assert!(result
        .strategy_used
        .extract_patterns()
        .contains(&"prices".to_string()));

    assert!(result.primary.success);
    assert_eq!(result.primary.title(), Some("Deals"));
    assert_eq!(result.primary.links.len(), 3);

    let urls: Vec<String> = result.opportunities.iter().map(|o| o.url.clone()).collect();
    assert_eq!(urls, vec![format!("{}/a", base), format!("{}/c", base)]);
    assert_eq!(result.opportunities[0].content(), "Offer A");
    assert_eq!(result.opportunities[1].reasoning, "third offer");

    assert_eq!(result.adaptation_log.len(), 1);
    assert!(result.adaptation_log[0].contains(&format!("{}/b", base)));

    let records = store.recent_learning_records(10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_intent, "find laptop deals");
    assert_eq!(records[0].url_pattern, "127.0.0.1");
    assert_eq!(records[0].strategy_effectiveness.opportunities_found, 2);
    assert_eq!(records[0].strategy_effectiveness.strategy_used, "Deep Research");

    let patterns = store.load_learned_patterns().await.unwrap();
    assert_eq!(patterns["domain:127.0.0.1"]["runs"], 1);
}

#[tokio::test]
async fn test_oracle_outage_uses_fallbacks() {
    let site = MockServer::start().await;
    let oracle = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &site,
        "/",
        r#"<html><body><p>Home</p><a href="/a">A</a></body></html>"#,
    )
    .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&oracle)
        .await;

    let (orchestrator, store) = build_orchestrator(&oracle, &dir).await;

    let result = orchestrator
        .adaptive_crawl(&format!("{}/", site.uri()), "find deals", None)
        .await
        .expect("Crawl should succeed without the oracle");

    assert_eq!(result.strategy_used.kind(), StrategyKind::DeepResearch);
    assert_eq!(result.strategy_used.depth_limit(), 3);
    assert!(result.primary.success);
    assert!(result.opportunities.is_empty());
    assert!(result.adaptation_log.is_empty());

    // only the primary page was fetched
    assert_eq!(site.received_requests().await.unwrap().len(), 1);
    assert_eq!(store.recent_learning_records(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_quick_scan_fetches_primary_only() {
    let site = MockServer::start().await;
    let oracle = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&site, "/summary", "<html><body><h1>Key points</h1></body></html>").await;
    mount_oracle(&oracle, INTENT_MARKER, json!({"primary_intent": "extraction"})).await;
    mount_oracle(&oracle, STRATEGY_MARKER, json!({"selected_strategy": "quick_scan"})).await;

    let (orchestrator, _store) = build_orchestrator(&oracle, &dir).await;

    let result = orchestrator
        .adaptive_crawl(&format!("{}/summary", site.uri()), "summarise", None)
        .await
        .unwrap();

    assert_eq!(result.strategy_used.kind(), StrategyKind::QuickScan);
    assert!(result.primary.success);
    assert_eq!(result.primary.content, "Key points");
    assert!(result.opportunities.is_empty());
    assert!(result.adaptation_log.is_empty());

    // intent + strategy; follow-up ranking is never consulted
    assert_eq!(oracle.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unreachable_target_yields_failed_primary() {
    let oracle = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_oracle(&oracle, INTENT_MARKER, json!({"primary_intent": "research"})).await;
    mount_oracle(&oracle, STRATEGY_MARKER, json!({"selected_strategy": "discovery_mode"})).await;

    let (orchestrator, store) = build_orchestrator(&oracle, &dir).await;

    let result = orchestrator
        .adaptive_crawl("http://127.0.0.1:9/", "anything", None)
        .await
        .expect("Fetch failures are not caller errors");

    assert!(!result.primary.success);
    assert!(result.primary.error.is_some());
    assert!(result.opportunities.is_empty());
    assert_eq!(store.recent_learning_records(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let oracle = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (orchestrator, store) = build_orchestrator(&oracle, &dir).await;

    let result = orchestrator.adaptive_crawl("   ", "find deals", None).await;
    assert!(matches!(result, Err(CrawlerError::InvalidInput(_))));

    let result = orchestrator.proactive_discovery("not a domain!", &[]).await;
    assert!(matches!(result, Err(CrawlerError::InvalidInput(_))));

    assert!(oracle.received_requests().await.unwrap().is_empty());
    assert!(store.recent_learning_records(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_proactive_discovery() {
    let oracle = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_oracle(
        &oracle,
        DISCOVERY_MARKER,
        json!({"suggested_urls": [
            {"url": "https://example.com/deals", "reasoning": "deal listings"},
            {"url": "https://example.com/clearance", "reasoning": "clearance items"}
        ]}),
    )
    .await;

    let (orchestrator, _store) = build_orchestrator(&oracle, &dir).await;

    let opportunities = orchestrator
        .proactive_discovery("example.com", &["laptops".to_string()])
        .await
        .unwrap();

    assert_eq!(opportunities.len(), 2);
    assert_eq!(opportunities[0].url, "https://example.com/deals");
    assert_eq!(opportunities[1].reasoning, "clearance items");

    let empty = orchestrator.proactive_discovery("example.com", &[]).await.unwrap();
    assert_eq!(empty.len(), 2);
}

#[tokio::test]
async fn test_learning_survives_restart() {
    let site = MockServer::start().await;
    let oracle = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&site, "/", "<html><body><p>Home</p></body></html>").await;
    mount_oracle(&oracle, STRATEGY_MARKER, json!({"selected_strategy": "quick_scan"})).await;

    {
        let (orchestrator, _store) = build_orchestrator(&oracle, &dir).await;
        for query in ["first", "second"] {
            orchestrator
                .adaptive_crawl(&format!("{}/", site.uri()), query, None)
                .await
                .unwrap();
        }
    }

    let (restarted, _store) = build_orchestrator(&oracle, &dir).await;
    let history = restarted.learning_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].user_intent, "first");
    assert_eq!(history[1].user_intent, "second");

    let pattern = restarted
        .pattern_store()
        .get("domain:127.0.0.1")
        .expect("pattern should be loaded at startup");
    assert_eq!(pattern["runs"], 2);
    assert_eq!(pattern["last_strategy"], "quick_scan");
}

#[tokio::test]
async fn test_from_config_file() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("data").join("learning.db");
    let config_path = dir.path().join("crawler.toml");

    std::fs::write(
        &config_path,
        format!(
            r#"
[crawler]
fetch-timeout-secs = 10

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[oracle]
base-url = "http://127.0.0.1:9"
model = "test-model"
api-key-env = "ADAPTIVE_CRAWLER_FROM_CONFIG_TEST_KEY"
timeout-secs = 5
max-tokens = 1000

[learning]
database-path = "{}"
"#,
            db_path.display().to_string().replace('\\', "/")
        ),
    )
    .unwrap();

    let config = load_config(&config_path).expect("Config should load");
    assert_eq!(config.learning.history_window, 100);

    let orchestrator = Orchestrator::from_config(&config)
        .await
        .expect("Orchestrator should build without an API key");
    assert!(Path::new(&db_path).exists());
    assert!(orchestrator.stored_history(5).await.unwrap().is_empty());

    // no key configured: every oracle decision falls back
    let opportunities = orchestrator.proactive_discovery("example.com", &[]).await.unwrap();
    assert!(opportunities.is_empty());
}
