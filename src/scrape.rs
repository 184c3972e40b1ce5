//! Public scraping entry points
//!
//! - `scrape_emails_from_url`: one page over plain HTTP
//! - `scrape_emails_from_page`: one page rendered in a caller-owned browser page
//! - `scrape_emails_from_website`: a bounded crawl from a homepage

use crate::config::Config;
use crate::crawler::{
    load_page, BrowserFetcher, BrowserPage, BrowserSession, Coordinator, CrawlBudget, CrawlReport,
    HttpFetcher, HttpOptions, PageFetcher, PageOptions, WaitUntil,
};
use crate::email::extract_and_normalize_emails;
use crate::url::{canonical_url, parse_http_url, registrable_domain};
use crate::{BrowserError, CrawlError};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Options for a website crawl
#[derive(Clone)]
pub struct WebsiteOptions<'a> {
    /// Maximum link hops from the seed
    pub max_depth: u32,

    /// Maximum fetch attempts
    pub max_pages: u32,

    /// Only follow links within the seed's registrable domain
    pub same_domain_only: bool,

    /// Render pages in `browser` instead of fetching them over HTTP
    pub use_browser: bool,

    /// Lifecycle event to wait for in browser mode
    pub wait_until: WaitUntil,

    /// Pre-opened browser session, required when `use_browser` is set
    pub browser: Option<&'a dyn BrowserSession>,

    /// HTTP fetch settings
    pub http: HttpOptions,

    /// Navigation timeout in browser mode
    pub navigation_timeout: Duration,

    /// Stops the crawl early when cancelled
    pub cancel: Option<CancellationToken>,
}

impl Default for WebsiteOptions<'_> {
    fn default() -> Self {
        let budget = CrawlBudget::default();
        let page = PageOptions::default();
        Self {
            max_depth: budget.max_depth,
            max_pages: budget.max_pages,
            same_domain_only: budget.same_domain_only,
            use_browser: false,
            wait_until: page.wait_until,
            browser: None,
            http: HttpOptions::default(),
            navigation_timeout: page.timeout,
            cancel: None,
        }
    }
}

impl WebsiteOptions<'_> {
    /// Builds options from a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_depth: config.crawler.max_depth,
            max_pages: config.crawler.max_pages,
            same_domain_only: config.crawler.same_domain_only,
            use_browser: config.browser.enabled,
            wait_until: config.browser.wait_until,
            browser: None,
            http: HttpOptions::from(&config.http),
            navigation_timeout: Duration::from_millis(config.browser.timeout_ms),
            cancel: None,
        }
    }

    /// The crawl budget these options describe
    pub fn budget(&self) -> CrawlBudget {
        CrawlBudget {
            max_depth: self.max_depth,
            max_pages: self.max_pages,
            same_domain_only: self.same_domain_only,
        }
    }

    fn page_options(&self) -> PageOptions {
        PageOptions {
            wait_until: self.wait_until,
            timeout: self.navigation_timeout,
        }
    }
}

/// Scrapes the emails from a single page fetched over HTTP
///
/// The URL is requested exactly as given; only its scheme is checked.
///
/// # Example
///
/// ```no_run
/// use mail_ripple::crawler::HttpOptions;
/// use mail_ripple::scrape_emails_from_url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let emails = scrape_emails_from_url("https://example.com/contact", &HttpOptions::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn scrape_emails_from_url(
    url: &str,
    options: &HttpOptions,
) -> Result<BTreeSet<String>, CrawlError> {
    let url = parse_http_url(url)?;
    let fetcher = HttpFetcher::new(options)?;
    let page = fetcher
        .fetch(&url)
        .await
        .map_err(CrawlError::SeedUnreachable)?;
    Ok(extract_and_normalize_emails(&page.content))
}

/// Scrapes the emails from a single page rendered in `page`
///
/// The page is navigated but not closed; it belongs to the caller.
pub async fn scrape_emails_from_page(
    page: &dyn BrowserPage,
    url: &str,
    options: &PageOptions,
) -> Result<BTreeSet<String>, CrawlError> {
    parse_http_url(url)?;
    let content = load_page(page, url, options)
        .await
        .map_err(CrawlError::SeedUnreachable)?;
    Ok(extract_and_normalize_emails(&content))
}

/// Crawls a website from `url` and returns the emails found
///
/// # Example
///
/// ```no_run
/// use mail_ripple::scrape::WebsiteOptions;
/// use mail_ripple::scrape_emails_from_website;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let options = WebsiteOptions {
///     max_depth: 2,
///     max_pages: 20,
///     ..WebsiteOptions::default()
/// };
/// let emails = scrape_emails_from_website("https://example.com/", &options).await?;
/// # Ok(())
/// # }
/// ```
pub async fn scrape_emails_from_website(
    url: &str,
    options: &WebsiteOptions<'_>,
) -> Result<BTreeSet<String>, CrawlError> {
    crawl_website(url, options).await.map(|report| report.emails)
}

/// Crawls a website from `url` and returns the full crawl report
///
/// In browser mode the session in `options.browser` is used for every
/// visit and left open for the caller to close. In HTTP mode with
/// `same_domain_only`, redirects that leave the seed's registrable domain
/// are not followed.
pub async fn crawl_website(
    url: &str,
    options: &WebsiteOptions<'_>,
) -> Result<CrawlReport, CrawlError> {
    if options.use_browser {
        let session = options.browser.ok_or(BrowserError::MissingSession)?;
        let fetcher = BrowserFetcher::new(session, options.page_options());
        run_crawl(url, options, &fetcher).await
    } else {
        let mut http = options.http.clone();
        if options.same_domain_only {
            http.redirect_scope = canonical_url(url)
                .ok()
                .and_then(|seed| registrable_domain(&seed));
        }
        let fetcher = HttpFetcher::new(&http)?;
        run_crawl(url, options, &fetcher).await
    }
}

async fn run_crawl(
    url: &str,
    options: &WebsiteOptions<'_>,
    fetcher: &dyn PageFetcher,
) -> Result<CrawlReport, CrawlError> {
    let mut coordinator = Coordinator::new(options.budget(), fetcher);
    if let Some(token) = &options.cancel {
        coordinator = coordinator.with_cancellation(token.clone());
    }
    coordinator.run(url).await
}
