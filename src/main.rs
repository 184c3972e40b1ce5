//! Mail-Ripple main entry point
//!
//! This is the command-line interface for the Mail-Ripple email harvester.

use anyhow::Context;
use clap::{Parser, Subcommand};
use mail_ripple::config::{load_config, Config};
use mail_ripple::crawler::{launch_browser, BrowserSession, HttpOptions, PageOptions, WaitUntil};
use mail_ripple::scrape::{crawl_website, WebsiteOptions};
use mail_ripple::{scrape_emails_from_page, scrape_emails_from_url};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Mail-Ripple: harvest email addresses from webpages and websites
#[derive(Parser, Debug)]
#[command(name = "mail-ripple")]
#[command(version = "1.0.0")]
#[command(about = "Scrape email addresses from webpages and websites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error log output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape emails from a single webpage
    Page {
        /// URL of the webpage to scrape
        url: String,

        /// Request timeout in milliseconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Use a headless browser instead of HTTP requests
        #[arg(short, long)]
        browser: bool,

        /// Page event to wait for in browser mode
        #[arg(long, value_enum)]
        wait_until: Option<WaitUntil>,
    },

    /// Scrape emails from an entire website, crawling from its homepage
    Website {
        /// URL of the website homepage to start crawling from
        url: String,

        /// Maximum crawl depth
        #[arg(short = 'd', long)]
        max_depth: Option<u32>,

        /// Maximum number of pages to crawl
        #[arg(short = 'p', long)]
        max_pages: Option<u32>,

        /// Allow crawling to different domains
        #[arg(long)]
        cross_domain: bool,

        /// Use a headless browser instead of HTTP requests
        #[arg(short, long)]
        browser: bool,

        /// Page event to wait for in browser mode
        #[arg(long, value_enum)]
        wait_until: Option<WaitUntil>,

        /// Per-page timeout in milliseconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("mail_ripple=warn,warn"),
            1 => EnvFilter::new("mail_ripple=info,warn"),
            2 => EnvFilter::new("mail_ripple=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Command::Page {
            url,
            timeout,
            browser,
            wait_until,
        } => handle_page(config, &url, timeout, browser, wait_until).await,
        Command::Website {
            url,
            max_depth,
            max_pages,
            cross_domain,
            browser,
            wait_until,
            timeout,
        } => {
            let mut config = config;
            if let Some(max_depth) = max_depth {
                config.crawler.max_depth = max_depth;
            }
            if let Some(max_pages) = max_pages {
                config.crawler.max_pages = max_pages;
            }
            if cross_domain {
                config.crawler.same_domain_only = false;
            }
            apply_fetch_overrides(&mut config, timeout, browser, wait_until);
            mail_ripple::config::validate(&config)?;
            handle_website(config, &url).await
        }
    }
}

fn apply_fetch_overrides(
    config: &mut Config,
    timeout: Option<u64>,
    browser: bool,
    wait_until: Option<WaitUntil>,
) {
    if let Some(timeout) = timeout {
        config.http.timeout_ms = timeout;
        config.browser.timeout_ms = timeout;
    }
    if browser {
        config.browser.enabled = true;
    }
    if let Some(wait_until) = wait_until {
        config.browser.wait_until = wait_until;
    }
}

/// Handles the `page` subcommand
async fn handle_page(
    mut config: Config,
    url: &str,
    timeout: Option<u64>,
    browser: bool,
    wait_until: Option<WaitUntil>,
) -> anyhow::Result<()> {
    apply_fetch_overrides(&mut config, timeout, browser, wait_until);
    mail_ripple::config::validate(&config)?;

    println!("Scraping emails from: {}", url);

    let emails = if config.browser.enabled {
        println!("Using headless browser...");
        let session = launch_browser().await?;
        let options = PageOptions {
            wait_until: config.browser.wait_until,
            timeout: Duration::from_millis(config.browser.timeout_ms),
        };
        let result = scrape_in_browser(session.as_ref(), url, &options).await;
        close_browser(session.as_ref()).await;
        result?
    } else {
        scrape_emails_from_url(url, &HttpOptions::from(&config.http)).await?
    };

    print_emails(&emails, "");
    Ok(())
}

async fn scrape_in_browser(
    session: &dyn BrowserSession,
    url: &str,
    options: &PageOptions,
) -> anyhow::Result<BTreeSet<String>> {
    let page = session.new_page().await?;
    let result = scrape_emails_from_page(page.as_ref(), url, options).await;
    if let Err(e) = page.close().await {
        tracing::debug!("Failed to close page: {}", e);
    }
    Ok(result?)
}

/// Handles the `website` subcommand
async fn handle_website(config: Config, url: &str) -> anyhow::Result<()> {
    println!("Crawling website starting from: {}", url);
    println!(
        "Max depth: {}, Max pages: {}",
        config.crawler.max_depth, config.crawler.max_pages
    );

    // Ctrl-C stops the crawl and keeps what was harvested
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with the emails found so far");
            ctrl_c.cancel();
        }
    });

    let session = if config.browser.enabled {
        println!("Using headless browser...");
        Some(launch_browser().await?)
    } else {
        None
    };

    let mut options = WebsiteOptions::from_config(&config);
    options.cancel = Some(cancel);
    options.browser = session.as_deref();

    let result = crawl_website(url, &options).await;

    if let Some(session) = &session {
        close_browser(session.as_ref()).await;
    }

    let report = result?;
    tracing::info!(
        "Visited {} page(s): {} fetched, {} failed, deepest level {}",
        report.pages_attempted,
        report.pages_fetched,
        report.failures.len(),
        report.max_depth_reached
    );
    for failure in &report.failures {
        tracing::info!("Failed: {}", failure);
    }

    print_emails(&report.emails, "\n");
    Ok(())
}

async fn close_browser(session: &dyn BrowserSession) {
    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close browser: {}", e);
    }
}

fn print_emails(emails: &BTreeSet<String>, lead: &str) {
    if emails.is_empty() {
        println!("{}No emails found.", lead);
    } else {
        println!("\nFound {} unique email(s):\n", emails.len());
        for email in emails {
            println!("  {}", email);
        }
    }
}
