//! Process-wide table of known top-level domains

use once_cell::sync::Lazy;
use std::collections::HashSet;

static TLD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    include_str!("tlds.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
});

/// Returns true if `suffix` (lowercase, without a leading dot) is a known TLD
pub fn is_known_tld(suffix: &str) -> bool {
    TLD_SET.contains(suffix)
}

/// Checks that an address ends in a known TLD
///
/// The last domain label is tried first, then the last two labels joined
/// (`co.uk`), so multi-label entries in the table are honored as well.
pub fn has_valid_tld(email: &str) -> bool {
    let Some((_, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }

    let domain = domain.to_lowercase();
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    if is_known_tld(labels[labels.len() - 1]) {
        return true;
    }

    labels.len() >= 3 && is_known_tld(&labels[labels.len() - 2..].join("."))
}
