use super::Strategy;
use serde_json::Value;

/// Upper bound accepted for a modified depth limit
pub const MAX_DEPTH_LIMIT: u32 = 10;

/// A validated set of per-run strategy changes
///
/// Only three fields of a strategy can be modified: the depth limit, the
/// extraction hints (extended, never replaced) and the follow-links flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyModification {
    pub depth_limit: Option<u32>,
    pub additional_patterns: Vec<String>,
    pub follow_links: Option<bool>,
}

impl StrategyModification {
    /// Builds a modification from the oracle's `modifications` object
    ///
    /// Each field is validated on its own: an invalid value is dropped with a
    /// warning and the remaining fields still apply. Unknown keys are ignored.
    pub fn from_value(value: &Value) -> Self {
        let mut modification = Self::default();

        let Some(object) = value.as_object() else {
            if !value.is_null() {
                tracing::warn!("Ignoring non-object strategy modifications: {}", value);
            }
            return modification;
        };

        if let Some(depth) = object.get("depth_limit") {
            match depth.as_u64() {
                Some(d) if d <= MAX_DEPTH_LIMIT as u64 => modification.depth_limit = Some(d as u32),
                _ => tracing::warn!("Ignoring invalid depth_limit modification: {}", depth),
            }
        }

        if let Some(patterns) = object.get("additional_patterns") {
            match patterns {
                Value::Array(items) => {
                    modification.additional_patterns = items
                        .iter()
                        .filter_map(|item| item.as_str())
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                Value::String(single) if !single.trim().is_empty() => {
                    modification.additional_patterns = vec![single.trim().to_string()];
                }
                _ => tracing::warn!("Ignoring invalid additional_patterns modification: {}", patterns),
            }
        }

        if let Some(follow) = object.get("follow_links") {
            match follow.as_bool() {
                Some(flag) => modification.follow_links = Some(flag),
                None => tracing::warn!("Ignoring invalid follow_links modification: {}", follow),
            }
        }

        modification
    }

    pub fn is_empty(&self) -> bool {
        self.depth_limit.is_none() && self.additional_patterns.is_empty() && self.follow_links.is_none()
    }
}

impl Strategy {
    /// Returns a copy of this strategy with `modification` applied
    ///
    /// `self` is left untouched, so catalog entries stay pristine.
    pub fn apply(&self, modification: &StrategyModification) -> Strategy {
        let mut modified = self.clone();

        if let Some(depth) = modification.depth_limit {
            modified.depth_limit = depth.min(MAX_DEPTH_LIMIT);
        }

        for pattern in &modification.additional_patterns {
            if !modified.extract_patterns.contains(pattern) {
                modified.extract_patterns.push(pattern.clone());
            }
        }

        if let Some(follow) = modification.follow_links {
            modified.follow_links = follow;
        }

        modified
    }
}
