//! URL handling module for Mail-Ripple
//!
//! This module provides the canonical keys used to deduplicate visits and the
//! registrable-domain computation used for same-site scope decisions.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::registrable_domain;
pub use normalize::{canonical_url, canonicalize, parse_http_url};
