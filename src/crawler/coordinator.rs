//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the bounded breadth-first crawl loop:
//! - Seeding the frontier and anchoring the scope domain
//! - Fetching pages one at a time through a `PageFetcher`
//! - Harvesting emails and following links within the budget
//! - Recording per-page failures without aborting the crawl

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchedPage, PageFetcher};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::extract_links;
use crate::email::extract_and_normalize_emails;
use crate::url::{canonical_url, canonicalize, parse_http_url, registrable_domain};
use crate::{ConfigError, CrawlError, FetchError, FetchResult, UrlError};
use std::collections::BTreeSet;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Limits for one crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlBudget {
    /// Maximum link hops from the seed; 0 visits only the seed
    pub max_depth: u32,

    /// Maximum fetch attempts, failed ones included
    pub max_pages: u32,

    /// Only follow links within the seed's registrable domain
    pub same_domain_only: bool,
}

impl Default for CrawlBudget {
    fn default() -> Self {
        CrawlBudget::from(&CrawlerConfig::default())
    }
}

impl From<&CrawlerConfig> for CrawlBudget {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_pages: config.max_pages,
            same_domain_only: config.same_domain_only,
        }
    }
}

impl CrawlBudget {
    /// Checks that the budget allows at least one fetch
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages < 1 {
            return Err(ConfigError::Validation(format!(
                "max_pages must be >= 1, got {}",
                self.max_pages
            )));
        }
        Ok(())
    }
}

/// Outcome of a crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Normalized emails found across all fetched pages
    pub emails: BTreeSet<String>,

    /// Fetch attempts made, successful or not
    pub pages_attempted: u32,

    /// Fetches that returned content
    pub pages_fetched: u32,

    /// Pages that could not be fetched or left the scope, in visit order
    pub failures: Vec<FetchError>,

    /// Deepest depth of any attempted page
    pub max_depth_reached: u32,

    /// The crawl stopped early because it was cancelled
    pub cancelled: bool,
}

/// Main crawler coordinator structure
///
/// Drives one bounded breadth-first walk per `run` call. All crawl state
/// (frontier, visited set, results) lives inside `run` and is discarded when
/// it returns.
pub struct Coordinator<'a> {
    budget: CrawlBudget,
    fetcher: &'a dyn PageFetcher,
    cancel: Option<CancellationToken>,
}

impl<'a> Coordinator<'a> {
    /// Creates a coordinator that fetches through `fetcher`
    pub fn new(budget: CrawlBudget, fetcher: &'a dyn PageFetcher) -> Self {
        Self {
            budget,
            fetcher,
            cancel: None,
        }
    }

    /// Stops the crawl when `token` is cancelled
    ///
    /// The token is checked before every dequeue and raced against the
    /// in-flight fetch.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Runs the crawl loop from `seed_url`
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The seed was fetched (or the crawl was cancelled)
    /// * `Err(CrawlError)` - The budget is invalid, or the seed could not be
    ///   canonicalized or fetched
    pub async fn run(&self, seed_url: &str) -> Result<CrawlReport, CrawlError> {
        self.budget.validate()?;

        let seed_key = canonicalize(seed_url)?;
        let mut seed = parse_http_url(seed_url)?;
        seed.set_fragment(None);
        let seed_domain =
            registrable_domain(&seed).ok_or_else(|| UrlError::MissingHost(seed_url.to_string()))?;

        tracing::info!(
            "Starting crawl of {} (max depth {}, max pages {}, {})",
            seed,
            self.budget.max_depth,
            self.budget.max_pages,
            if self.budget.same_domain_only {
                format!("scope {}", seed_domain)
            } else {
                "cross-domain".to_string()
            }
        );

        let mut frontier = Frontier::new();
        frontier.push(seed_key, seed, 0);

        let mut report = CrawlReport::default();
        let start_time = Instant::now();

        while report.pages_attempted < self.budget.max_pages {
            if self.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let Some(FrontierEntry { url, depth, .. }) = frontier.pop() else {
                tracing::debug!("Frontier is empty, crawl complete");
                break;
            };

            report.pages_attempted += 1;
            report.max_depth_reached = report.max_depth_reached.max(depth);
            tracing::debug!("Fetching [depth {}]: {}", depth, url);

            let page = match self.fetch(&url).await {
                None => {
                    report.cancelled = true;
                    break;
                }
                Some(Ok(page)) => page,
                Some(Err(e)) if depth == 0 => return Err(CrawlError::SeedUnreachable(e)),
                Some(Err(e)) => {
                    tracing::warn!("Skipping {}: {}", url, e);
                    report.failures.push(e);
                    continue;
                }
            };

            // Redirects may leave the scope that link filtering enforced
            if self.budget.same_domain_only
                && depth > 0
                && registrable_domain(&page.url).as_deref() != Some(seed_domain.as_str())
            {
                let e = FetchError::OutOfScope {
                    url: url.to_string(),
                    target: page.url.to_string(),
                };
                tracing::warn!("Skipping {}: {}", url, e);
                report.failures.push(e);
                continue;
            }

            report.pages_fetched += 1;

            let emails = extract_and_normalize_emails(&page.content);
            if !emails.is_empty() {
                tracing::debug!("Found {} email(s) on {}", emails.len(), page.url);
            }
            report.emails.extend(emails);

            // A redirect target is the same page as the URL that led to it
            if page.url != url {
                if let Ok(key) = canonicalize(page.url.as_str()) {
                    frontier.mark_fetched(key);
                }
            }

            if depth < self.budget.max_depth {
                let queued = self.enqueue_links(&mut frontier, &page, depth + 1, &seed_domain);
                tracing::debug!("Queued {} new link(s) from {}", queued, page.url);
            }

            if report.pages_attempted % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages crawled, {} in frontier, {} emails",
                    report.pages_attempted,
                    frontier.len(),
                    report.emails.len()
                );
            }
        }

        tracing::info!(
            "Crawl finished: {} pages attempted ({} failed), {} emails in {:?}",
            report.pages_attempted,
            report.failures.len(),
            report.emails.len(),
            start_time.elapsed()
        );

        Ok(report)
    }

    /// Queues the in-scope, unseen links of `page` at `depth`
    ///
    /// Returns the number of URLs queued.
    fn enqueue_links(
        &self,
        frontier: &mut Frontier,
        page: &FetchedPage,
        depth: u32,
        seed_domain: &str,
    ) -> usize {
        let mut queued = 0;

        for link in extract_links(&page.content, &page.url) {
            let candidate = match canonical_url(&link) {
                Ok(c) => c,
                Err(e) => {
                    tracing::debug!("Dropping link {}: {}", link, e);
                    continue;
                }
            };
            let key = candidate.to_string();

            if frontier.is_visited(&key) {
                continue;
            }

            if self.budget.same_domain_only
                && registrable_domain(&candidate).as_deref() != Some(seed_domain)
            {
                tracing::debug!("Out of scope: {}", link);
                continue;
            }

            let Ok(mut url) = Url::parse(&link) else {
                continue;
            };
            url.set_fragment(None);

            if frontier.push(key, url, depth) {
                queued += 1;
            }
        }

        queued
    }

    /// Fetches `url`, returning None if the crawl was cancelled first
    async fn fetch(&self, url: &Url) -> Option<FetchResult<FetchedPage>> {
        match &self.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => None,
                result = self.fetcher.fetch(url) => Some(result),
            },
            None => Some(self.fetcher.fetch(url).await),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Crawls from `seed_url` and returns the emails found
///
/// # Example
///
/// ```no_run
/// use mail_ripple::crawler::{crawl, CrawlBudget, HttpFetcher, HttpOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::new(&HttpOptions::default())?;
/// let emails = crawl("https://example.com/", &CrawlBudget::default(), &fetcher).await?;
/// for email in emails {
///     println!("{}", email);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    seed_url: &str,
    budget: &CrawlBudget,
    fetcher: &dyn PageFetcher,
) -> Result<BTreeSet<String>, CrawlError> {
    let report = Coordinator::new(*budget, fetcher).run(seed_url).await?;
    Ok(report.emails)
}
