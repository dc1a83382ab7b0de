use super::{Strategy, StrategyKind};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The fixed set of crawl strategies, built once at startup
#[derive(Debug, Clone)]
pub struct StrategyCatalog {
    entries: BTreeMap<StrategyKind, Strategy>,
}

impl StrategyCatalog {
    /// Builds the built-in catalog
    pub fn builtin() -> Self {
        let entries = StrategyKind::all()
            .into_iter()
            .map(|kind| (kind, builtin_strategy(kind)))
            .collect();
        Self { entries }
    }

    /// Returns the catalog entry for `kind`
    pub fn get(&self, kind: StrategyKind) -> &Strategy {
        // Every kind is inserted by `builtin`, so the lookup only misses if
        // the map was built some other way.
        self.entries
            .get(&kind)
            .unwrap_or_else(|| unreachable!("catalog is missing {}", kind))
    }

    /// Looks up an entry by its catalog key
    pub fn lookup(&self, key: &str) -> Option<&Strategy> {
        StrategyKind::from_key(key).map(|kind| self.get(kind))
    }

    /// The safe default used whenever strategy selection falls back
    pub fn default_strategy(&self) -> &Strategy {
        self.get(StrategyKind::DeepResearch)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Strategy> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The whole catalog as a `key -> strategy` JSON object, for prompts
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(kind, strategy)| {
                (
                    kind.key().to_string(),
                    serde_json::to_value(strategy).unwrap_or(Value::Null),
                )
            })
            .collect();
        Value::Object(map)
    }
}

impl Default for StrategyCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn metrics(items: &[(&str, f64)]) -> BTreeMap<String, f64> {
    items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn builtin_strategy(kind: StrategyKind) -> Strategy {
    match kind {
        StrategyKind::DeepResearch => Strategy {
            kind,
            name: "Deep Research".to_string(),
            description: "Thorough multi-page analysis for comprehensive understanding".to_string(),
            target_patterns: strings(&["article", "blog", "research", "study", "analysis"]),
            depth_limit: 3,
            follow_links: true,
            extract_patterns: strings(&["main content", "citations", "references", "related links"]),
            success_metrics: metrics(&[("content_depth", 0.8), ("relevance_score", 0.7)]),
            adaptation_rules: strings(&["increase_depth_if_shallow", "follow_citations"]),
        },
        StrategyKind::QuickScan => Strategy {
            kind,
            name: "Quick Scanner".to_string(),
            description: "Fast overview crawl for key information extraction".to_string(),
            target_patterns: strings(&["summary", "overview", "key points", "highlights"]),
            depth_limit: 1,
            follow_links: false,
            extract_patterns: strings(&["headings", "bullet points", "key metrics"]),
            success_metrics: metrics(&[("speed", 0.9), ("coverage", 0.6)]),
            adaptation_rules: strings(&["prioritize_structured_data"]),
        },
        StrategyKind::DiscoveryMode => Strategy {
            kind,
            name: "Discovery Explorer".to_string(),
            description: "Proactive discovery of related opportunities and content".to_string(),
            target_patterns: strings(&["sitemap", "directory", "index", "catalog"]),
            depth_limit: 2,
            follow_links: true,
            extract_patterns: strings(&["navigation", "categories", "related topics"]),
            success_metrics: metrics(&[("discovery_rate", 0.8), ("novelty", 0.7)]),
            adaptation_rules: strings(&["expand_to_related_domains", "follow_category_links"]),
        },
    }
}
