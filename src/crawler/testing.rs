//! Scripted in-memory fetchers used by unit tests

use crate::crawler::browser::{BrowserPage, BrowserSession, WaitUntil};
use crate::crawler::fetcher::{FetchedPage, PageFetcher};
use crate::{BrowserError, FetchError, FetchResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Serves canned HTML by URL and records every fetch attempt
///
/// URLs without a page answer with HTTP 404.
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    attempts: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Serves the page at `to` when `from` is requested, reporting `to` as final URL
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// Holds the response for `url` back by `delay`
    pub fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedPage> {
        self.attempts.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delays.get(url.as_str()) {
            tokio::time::sleep(*delay).await;
        }

        let target = self
            .redirects
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| url.to_string());

        match self.pages.get(&target) {
            Some(html) => Ok(FetchedPage {
                url: Url::parse(&target).unwrap(),
                content: html.clone(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// In-memory browser whose pages navigate to canned HTML
#[derive(Default)]
pub struct FakeBrowser {
    pub pages: HashMap<String, String>,
    pub redirects: HashMap<String, String>,
    pub delay: Option<Duration>,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub visits: Arc<Mutex<Vec<(String, WaitUntil)>>>,
}

impl FakeBrowser {
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Lands on `to` when `from` is navigated to
    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }
}

pub struct FakePage {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    landed: Mutex<Option<String>>,
    delay: Option<Duration>,
    current: Mutex<Option<String>>,
    closed: Arc<AtomicUsize>,
    visits: Arc<Mutex<Vec<(String, WaitUntil)>>>,
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(&self, url: &str, wait_until: WaitUntil) -> FetchResult<()> {
        self.visits
            .lock()
            .unwrap()
            .push((url.to_string(), wait_until));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let target = self.redirects.get(url).map_or(url, String::as_str);
        match self.pages.get(target) {
            Some(html) => {
                *self.current.lock().unwrap() = Some(html.clone());
                *self.landed.lock().unwrap() = Some(target.to_string());
                Ok(())
            }
            None => Err(FetchError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            }),
        }
    }

    async fn content(&self) -> FetchResult<String> {
        Ok(self.current.lock().unwrap().clone().unwrap_or_default())
    }

    async fn current_url(&self) -> Option<String> {
        self.landed.lock().unwrap().clone()
    }

    async fn close(&self) -> FetchResult<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for FakeBrowser {
    async fn new_page(&self) -> FetchResult<Box<dyn BrowserPage>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            pages: self.pages.clone(),
            redirects: self.redirects.clone(),
            landed: Mutex::new(None),
            delay: self.delay,
            current: Mutex::new(None),
            closed: Arc::clone(&self.closed),
            visits: Arc::clone(&self.visits),
        }))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        Ok(())
    }
}
