//! Page fetching
//!
//! This module defines the capability the crawl controller fetches pages
//! through, and its lightweight HTTP implementation:
//! - Building HTTP clients with a browser-like user agent
//! - GET requests with a per-request timeout
//! - Error classification into `FetchError`

use crate::config::HttpConfig;
use crate::url::registrable_domain;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, LOCATION};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Default user agent sent with HTTP fetches
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Default HTTP request timeout in milliseconds
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

/// Redirect hops followed before a fetch fails
const MAX_REDIRECTS: usize = 10;

/// Content of one successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects; relative links resolve against it
    pub url: Url,

    /// Page content (raw HTML, or the rendered DOM for browser fetches)
    pub content: String,
}

/// Capability to fetch one page
///
/// Implementations own their timeouts and must report every failure as a
/// `FetchError`. The crawl controller calls `fetch` once per dequeued URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieves the content of `url`
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedPage>;
}

/// Options for lightweight HTTP fetching
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Per-request timeout
    pub timeout: Duration,

    /// User agent header value
    pub user_agent: String,

    /// Extra request headers, applied over the defaults
    pub headers: HashMap<String, String>,

    /// Registrable domain redirects may not leave; `None` follows any redirect
    pub redirect_scope: Option<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: HashMap::new(),
            redirect_scope: None,
        }
    }
}

impl From<&HttpConfig> for HttpOptions {
    fn from(config: &HttpConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            user_agent: config.user_agent.clone(),
            headers: config.headers.clone(),
            redirect_scope: None,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Invalid custom header names or values are skipped with a warning.
///
/// # Example
///
/// ```no_run
/// use mail_ripple::crawler::{build_http_client, HttpOptions};
///
/// let client = build_http_client(&HttpOptions::default()).unwrap();
/// ```
pub fn build_http_client(options: &HttpOptions) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    for (name, value) in &options.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Ignoring invalid header {}: {}", name, value),
        }
    }

    let redirect = match &options.redirect_scope {
        Some(scope) => scoped_redirect_policy(scope.clone()),
        None => Policy::limited(MAX_REDIRECTS),
    };

    Client::builder()
        .user_agent(options.user_agent.as_str())
        .default_headers(headers)
        .redirect(redirect)
        .timeout(options.timeout)
        .connect_timeout(options.timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Follows redirects only while they stay within `scope`
///
/// A hop to another registrable domain is not requested; the redirect
/// response itself is returned instead.
fn scoped_redirect_policy(scope: String) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if registrable_domain(attempt.url()).as_deref() == Some(scope.as_str()) {
            attempt.follow()
        } else {
            attempt.stop()
        }
    })
}

/// Fetches pages with plain HTTP GET requests
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from `options`
    pub fn new(options: &HttpOptions) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(options)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedPage> {
        fetch_url(&self.client, url).await
    }
}

/// Fetches a URL and classifies any failure
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `FetchedPage` with the body as text |
/// | Redirect stopped by the redirect scope | `FetchError::OutOfScope` |
/// | Any other status | `FetchError::Status` |
/// | Timeout | `FetchError::Timeout` |
/// | Connection / DNS / TLS failure | `FetchError::Network` |
/// | Body could not be read | `FetchError::Body` |
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult<FetchedPage> {
    let url_str = url.as_str();

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url_str, &e))?;

    let status = response.status();

    // An http(s) redirect that comes back unfollowed was stopped by the scope
    if status.is_redirection() {
        if let Some(target) = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|location| response.url().join(location).ok())
            .filter(|target| matches!(target.scheme(), "http" | "https"))
        {
            return Err(FetchError::OutOfScope {
                url: url_str.to_string(),
                target: target.to_string(),
            });
        }
    }

    if !status.is_success() {
        return Err(FetchError::Status {
            url: url_str.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    let content = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url_str.to_string(),
            }
        } else {
            FetchError::Body {
                url: url_str.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    Ok(FetchedPage {
        url: final_url,
        content,
    })
}

fn classify_error(url: &str, error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
