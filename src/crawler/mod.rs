//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The page fetching capability and its HTTP and browser variants
//! - HTML parsing and link extraction
//! - The breadth-first frontier
//! - Overall crawl coordination

mod browser;
#[cfg(feature = "browser")]
mod chromium;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
#[cfg(test)]
pub(crate) mod testing;

pub use browser::{
    launch_browser, load_page, BrowserFetcher, BrowserPage, BrowserSession, PageOptions,
    WaitUntil, DEFAULT_NAVIGATION_TIMEOUT_MS,
};
#[cfg(feature = "browser")]
pub use chromium::ChromiumSession;
pub use coordinator::{crawl, Coordinator, CrawlBudget, CrawlReport};
pub use fetcher::{
    build_http_client, fetch_url, FetchedPage, HttpFetcher, HttpOptions, PageFetcher,
    DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_USER_AGENT,
};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::extract_links;
