//! Mail-Ripple: an email harvester for websites
//!
//! This crate walks a website's link graph breadth-first from a seed page,
//! collecting the email addresses found on every page it reaches within a
//! depth, page-count and domain-scope budget.

pub mod config;
pub mod crawler;
pub mod email;
pub mod scrape;
pub mod url;

use thiserror::Error;

/// Top-level error for a website crawl
///
/// Only seed-level, configuration and provisioning failures surface here;
/// per-page failures are recorded in the crawl report instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid seed URL: {0}")]
    InvalidSeed(#[from] UrlError),

    #[error("Seed page could not be fetched: {0}")]
    SeedUnreachable(#[source] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// A single page could not be retrieved
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP error for {url}: status {status}")]
    Status { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Redirect from {url} leaves the crawl scope: {target}")]
    OutOfScope { url: String, target: String },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::Status { url, .. }
            | Self::Network { url, .. }
            | Self::Navigation { url, .. }
            | Self::Body { url, .. }
            | Self::OutOfScope { url, .. } => url,
        }
    }
}

/// URL-specific errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Browser provisioning errors
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error(
        "No browser engine available. Rebuild with the `browser` feature \
         (cargo install mail-ripple --features browser) and make sure Chrome or Chromium is installed"
    )]
    Unavailable,

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Browser mode requested but no browser session was provided")]
    MissingSession,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for single-page fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlBudget, CrawlReport, PageFetcher};
pub use email::extract_and_normalize_emails;
pub use scrape::{scrape_emails_from_page, scrape_emails_from_url, scrape_emails_from_website};
pub use url::{canonicalize, registrable_domain};
