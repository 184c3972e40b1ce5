//! Headless Chromium session backed by chromiumoxide

use crate::crawler::browser::{BrowserPage, BrowserSession, WaitUntil};
use crate::{BrowserError, FetchError, FetchResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Quiet period approximating "network idle" after the load event
const NETWORK_IDLE_SETTLE: Duration = Duration::from_millis(500);

/// A launched headless Chromium
pub struct ChromiumSession {
    browser: Mutex<Browser>,
    handler: Mutex<Option<JoinHandle<()>>>,
}

impl ChromiumSession {
    /// Launches a headless Chromium with default settings
    pub async fn launch() -> Result<Self, BrowserError> {
        let config = BrowserConfig::builder().build().map_err(BrowserError::Launch)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // The CDP connection only makes progress while its handler is polled
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler event error: {}", e);
                }
            }
        });

        tracing::debug!("Launched headless Chromium");
        Ok(Self {
            browser: Mutex::new(browser),
            handler: Mutex::new(Some(handler)),
        })
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_page(&self) -> FetchResult<Box<dyn BrowserPage>> {
        let browser = self.browser.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Navigation {
                url: "about:blank".to_string(),
                message: e.to_string(),
            })?;
        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await;
        if let Err(e) = browser.wait().await {
            tracing::debug!("Failed to wait for browser exit: {}", e);
        }

        if let Some(handler) = self.handler.lock().await.take() {
            handler.abort();
        }

        closed
            .map(|_| ())
            .map_err(|e| BrowserError::Launch(format!("failed to close browser: {}", e)))
    }
}

struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn goto(&self, url: &str, wait_until: WaitUntil) -> FetchResult<()> {
        // goto resolves once the navigation has loaded
        self.page.goto(url).await.map_err(|e| FetchError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if wait_until == WaitUntil::NetworkIdle {
            tokio::time::sleep(NETWORK_IDLE_SETTLE).await;
        }
        Ok(())
    }

    async fn content(&self) -> FetchResult<String> {
        let url = self.page.url().await.ok().flatten().unwrap_or_default();
        self.page.content().await.map_err(|e| FetchError::Navigation {
            url,
            message: e.to_string(),
        })
    }

    async fn current_url(&self) -> Option<String> {
        self.page.url().await.ok().flatten()
    }

    async fn close(&self) -> FetchResult<()> {
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| FetchError::Navigation {
                url: String::new(),
                message: format!("failed to close page: {}", e),
            })
    }
}
