use crate::crawler::{WaitUntil, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_NAVIGATION_TIMEOUT_MS, DEFAULT_USER_AGENT};
use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure for Mail-Ripple
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub browser: BrowserConfig,
}

/// Crawl budget configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum link hops from the seed page
    pub max_depth: u32,

    /// Maximum number of fetch attempts, failures included
    pub max_pages: u32,

    /// Only follow links within the seed's registrable domain
    pub same_domain_only: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_pages: 50,
            same_domain_only: true,
        }
    }
}

/// Lightweight HTTP fetch configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Per-request timeout (milliseconds)
    pub timeout_ms: u64,

    /// User agent header value
    pub user_agent: String,

    /// Extra request headers
    pub headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: HashMap::new(),
        }
    }
}

/// Browser-rendered fetch configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserConfig {
    /// Render pages in a headless browser instead of plain HTTP
    pub enabled: bool,

    /// Lifecycle event to wait for before reading the page
    pub wait_until: WaitUntil,

    /// Navigation timeout (milliseconds)
    pub timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            wait_until: WaitUntil::Load,
            timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
        }
    }
}
