//! Browser-rendered page fetching
//!
//! The crawler sees a browser only through two small capabilities: a session
//! that opens pages and can be closed, and a page that navigates, reports its
//! rendered content and closes. The session is owned by the caller and shared
//! across every visit of a crawl; a fresh page is opened per visited URL and
//! closed on every exit path.

use crate::crawler::fetcher::{FetchedPage, PageFetcher};
use crate::{BrowserError, FetchError, FetchResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Default navigation timeout in milliseconds
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Page lifecycle event to wait for before reading content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    /// The `load` event fired
    #[default]
    #[value(name = "load")]
    Load,

    /// The `DOMContentLoaded` event fired
    #[value(name = "domcontentloaded")]
    DomContentLoaded,

    /// No network activity for a short settle period
    #[value(name = "networkidle")]
    NetworkIdle,
}

impl fmt::Display for WaitUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::DomContentLoaded => "domcontentloaded",
            Self::NetworkIdle => "networkidle",
        };
        f.write_str(name)
    }
}

/// Options for a browser-rendered page visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    /// Lifecycle event to wait for
    pub wait_until: WaitUntil,

    /// Navigation timeout
    pub timeout: Duration,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            wait_until: WaitUntil::Load,
            timeout: Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS),
        }
    }
}

/// One open browser page (tab)
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigates to `url` and waits for `wait_until`
    async fn goto(&self, url: &str, wait_until: WaitUntil) -> FetchResult<()>;

    /// Returns the current rendered document as HTML
    async fn content(&self) -> FetchResult<String>;

    /// The URL the page ended up on after navigation, if known
    async fn current_url(&self) -> Option<String>;

    /// Closes the page
    async fn close(&self) -> FetchResult<()>;
}

/// A running browser that can open pages
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Opens a fresh blank page
    async fn new_page(&self) -> FetchResult<Box<dyn BrowserPage>>;

    /// Shuts the browser down
    async fn close(&self) -> Result<(), BrowserError>;
}

/// Navigates `page` to `url` within `options.timeout` and returns its content
pub async fn load_page(page: &dyn BrowserPage, url: &str, options: &PageOptions) -> FetchResult<String> {
    match tokio::time::timeout(options.timeout, page.goto(url, options.wait_until)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(FetchError::Timeout {
                url: url.to_string(),
            })
        }
    }
    page.content().await
}

/// Closes its page when dropped unless closed explicitly first
///
/// Explicit `close` is the normal path. The drop path covers futures that are
/// abandoned mid-visit, e.g. by crawl cancellation, and closes the page on a
/// background task.
struct PageGuard {
    page: Option<Box<dyn BrowserPage>>,
    url: String,
}

impl PageGuard {
    fn new(page: Box<dyn BrowserPage>, url: &str) -> Self {
        Self {
            page: Some(page),
            url: url.to_string(),
        }
    }

    fn page(&self) -> Option<&dyn BrowserPage> {
        self.page.as_deref()
    }

    async fn close(mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::debug!("Failed to close page for {}: {}", self.url, e);
            }
        }
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        let Some(page) = self.page.take() else {
            return;
        };
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let url = std::mem::take(&mut self.url);
            handle.spawn(async move {
                if let Err(e) = page.close().await {
                    tracing::debug!("Failed to close abandoned page for {}: {}", url, e);
                }
            });
        }
    }
}

/// Fetches pages by rendering them in a caller-owned browser session
pub struct BrowserFetcher<'a> {
    session: &'a dyn BrowserSession,
    options: PageOptions,
}

impl<'a> BrowserFetcher<'a> {
    /// Creates a fetcher that opens one page per visit in `session`
    pub fn new(session: &'a dyn BrowserSession, options: PageOptions) -> Self {
        Self { session, options }
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher<'_> {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedPage> {
        let guard = PageGuard::new(self.session.new_page().await?, url.as_str());

        let result = match guard.page() {
            Some(page) => match load_page(page, url.as_str(), &self.options).await {
                Ok(content) => {
                    let final_url = page
                        .current_url()
                        .await
                        .and_then(|current| Url::parse(&current).ok())
                        .unwrap_or_else(|| url.clone());
                    Ok(FetchedPage {
                        url: final_url,
                        content,
                    })
                }
                Err(e) => Err(e),
            },
            None => Err(FetchError::Navigation {
                url: url.to_string(),
                message: "page already closed".to_string(),
            }),
        };
        guard.close().await;

        result
    }
}

/// Starts a headless browser for rendered fetching
///
/// Fails with `BrowserError::Unavailable` when the crate was built without
/// the `browser` feature.
#[cfg(feature = "browser")]
pub async fn launch_browser() -> Result<Box<dyn BrowserSession>, BrowserError> {
    let session = crate::crawler::chromium::ChromiumSession::launch().await?;
    Ok(Box::new(session))
}

/// Starts a headless browser for rendered fetching
///
/// Fails with `BrowserError::Unavailable` when the crate was built without
/// the `browser` feature.
#[cfg(not(feature = "browser"))]
pub async fn launch_browser() -> Result<Box<dyn BrowserSession>, BrowserError> {
    Err(BrowserError::Unavailable)
}
