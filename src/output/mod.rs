//! Output module for rendering crawl results
//!
//! This module handles:
//! - Text reports of crawl results, discovery suggestions and history
//! - JSON export of the same values

mod report;

pub use report::{format_crawl_result, format_history, format_opportunities};

use serde::Serialize;

/// Serializes any report value as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
