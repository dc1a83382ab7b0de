//! Plain-text rendering of crawl results, discovery suggestions and history

use crate::crawler::CrawlResult;
use crate::discovery::Opportunity;
use crate::learning::LearningRecord;

/// Characters of page content shown per page in a report
const PREVIEW_CHARS: usize = 200;

fn preview(content: &str) -> String {
    let mut text: String = content.chars().take(PREVIEW_CHARS).collect();
    if content.chars().count() > PREVIEW_CHARS {
        text.push_str("...");
    }
    text
}

/// Formats a crawl result as a human-readable report
pub fn format_crawl_result(result: &CrawlResult) -> String {
    let mut out = String::new();

    out.push_str("=== Adaptive Crawl ===\n\n");

    out.push_str(&format!(
        "Strategy: {} ({})\n",
        result.strategy_used.name(),
        result.strategy_used.kind()
    ));
    out.push_str(&format!(
        "  depth limit {}, follow links {}\n\n",
        result.strategy_used.depth_limit(),
        if result.strategy_used.follow_links() { "yes" } else { "no" }
    ));

    out.push_str("Primary:\n");
    out.push_str(&format!("  URL: {}\n", result.primary.url));
    if result.primary.success {
        if let Some(title) = result.primary.title() {
            out.push_str(&format!("  Title: {}\n", title));
        }
        out.push_str(&format!(
            "  Content: {} bytes, {} links\n",
            result.primary.content.len(),
            result.primary.links.len()
        ));
        if !result.primary.content.is_empty() {
            out.push_str(&format!("  Preview: {}\n", preview(&result.primary.content)));
        }
    } else {
        out.push_str(&format!(
            "  FAILED: {}\n",
            result.primary.error.as_deref().unwrap_or("unknown error")
        ));
    }
    out.push('\n');

    if !result.opportunities.is_empty() {
        out.push_str(&format!("Opportunities ({}):\n", result.opportunities.len()));
        for (i, opportunity) in result.opportunities.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, opportunity.url));
            if !opportunity.reasoning.is_empty() {
                out.push_str(&format!("     why: {}\n", opportunity.reasoning));
            }
            out.push_str(&format!("     {}\n", preview(opportunity.content())));
        }
        out.push('\n');
    }

    if !result.adaptation_log.is_empty() {
        out.push_str("Adaptation Log:\n");
        for entry in &result.adaptation_log {
            out.push_str(&format!("  - {}\n", entry));
        }
        out.push('\n');
    }

    let phases: Vec<&str> = result.metrics.phase_trace.iter().map(|p| p.as_str()).collect();
    out.push_str(&format!(
        "Completed in {} ms ({})\n",
        result.metrics.duration_ms,
        phases.join(" -> ")
    ));

    out
}

/// Formats discovery suggestions as a numbered list
pub fn format_opportunities(domain: &str, opportunities: &[Opportunity]) -> String {
    if opportunities.is_empty() {
        return format!("No suggestions for {}\n", domain);
    }

    let mut out = format!("Suggestions for {} ({}):\n", domain, opportunities.len());
    for (i, opportunity) in opportunities.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, opportunity.url));
        if !opportunity.reasoning.is_empty() {
            out.push_str(&format!("     {}\n", opportunity.reasoning));
        }
    }
    out
}

/// Formats learning records, one line each
pub fn format_history(records: &[LearningRecord]) -> String {
    if records.is_empty() {
        return "No learning records\n".to_string();
    }

    let mut out = format!("=== Learning History ({} records) ===\n\n", records.len());
    for record in records {
        let effectiveness = &record.strategy_effectiveness;
        out.push_str(&format!(
            "{}  {}  \"{}\"\n    {} | {:.2}s | {} bytes | {} opportunities\n",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.url_pattern,
            record.user_intent,
            effectiveness.strategy_used,
            effectiveness.duration_secs,
            effectiveness.content_extracted,
            effectiveness.opportunities_found,
        ));
        for note in &record.adaptation_notes {
            out.push_str(&format!("    note: {}\n", note));
        }
    }
    out
}
