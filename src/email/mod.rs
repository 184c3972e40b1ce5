//! Email aggregation: pattern extraction, TLD validation and normalization
//!
//! Every address leaves this module trimmed and lower-cased so that sets
//! built from different pages union without case duplicates.

mod tlds;

pub use tlds::{has_valid_tld, is_known_tld};

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email pattern is valid")
});

/// Extracts email addresses from text, dropping those with an unknown TLD
///
/// Addresses are returned exactly as they appear in the text.
pub fn extract_emails(text: &str) -> BTreeSet<String> {
    EMAIL_REGEX
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|email| has_valid_tld(email))
        .map(str::to_string)
        .collect()
}

/// Normalizes an email address (trim, lowercase)
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Extracts, validates and normalizes the email addresses in `text`
///
/// # Example
///
/// ```
/// use mail_ripple::email::extract_and_normalize_emails;
///
/// let emails = extract_and_normalize_emails("Write to Info@Example.com or info@example.com");
/// assert_eq!(emails.len(), 1);
/// assert!(emails.contains("info@example.com"));
/// ```
pub fn extract_and_normalize_emails(text: &str) -> BTreeSet<String> {
    extract_emails(text)
        .iter()
        .map(|email| normalize_email(email))
        .collect()
}
