//! URL handling module
//!
//! This module provides target validation, domain extraction, and the offline
//! host heuristics the strategy selector uses as category hints.

mod category;
mod domain;

pub use category::{classify_host, CategoryHints, UrlCategory};
pub use domain::{extract_domain, normalize_domain, parse_target_url};
