//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run
//! full crawls end-to-end over real HTTP.

use mail_ripple::config::load_config;
use mail_ripple::crawler::HttpOptions;
use mail_ripple::scrape::{crawl_website, WebsiteOptions};
use mail_ripple::{scrape_emails_from_url, scrape_emails_from_website, CrawlError, FetchError};
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts an HTML page at `route`
async fn mount_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(html),
        )
        .mount(server)
        .await;
}

fn to_vec(emails: impl IntoIterator<Item = String>) -> Vec<String> {
    emails.into_iter().collect()
}

#[tokio::test]
async fn test_full_crawl_collects_emails() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/about">About</a>
            <a href="/contact#form">Contact</a>
        </body></html>"#,
    )
    .await;
    mount_page(&server, "/about", "<p>Reach Info@Example.com</p>").await;
    mount_page(
        &server,
        "/contact",
        r#"<a href="mailto:sales@example.com">sales@example.com</a> info@example.com"#,
    )
    .await;

    let options = WebsiteOptions {
        max_depth: 2,
        max_pages: 10,
        ..WebsiteOptions::default()
    };
    let report = crawl_website(&format!("{}/", server.uri()), &options)
        .await
        .expect("crawl should succeed");

    assert_eq!(
        to_vec(report.emails),
        vec!["info@example.com", "sales@example.com"]
    );
    assert_eq!(report.pages_attempted, 3);
    assert_eq!(report.pages_fetched, 3);
    assert!(report.failures.is_empty());
    assert_eq!(report.max_depth_reached, 1);
}

#[tokio::test]
async fn test_out_of_scope_links_not_fetched() {
    let server = MockServer::start().await;
    let port = server.address().port();

    mount_page(
        &server,
        "/",
        &format!(
            r#"<a href="http://localhost:{}/elsewhere">Elsewhere</a> home@example.com"#,
            port
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_string("other@example.org"))
        .expect(0)
        .mount(&server)
        .await;

    let emails = scrape_emails_from_website(&format!("{}/", server.uri()), &WebsiteOptions::default())
        .await
        .expect("crawl should succeed");

    assert_eq!(to_vec(emails), vec!["home@example.com"]);
}

#[tokio::test]
async fn test_redirect_off_site_not_followed() {
    let server = MockServer::start().await;
    let port = server.address().port();

    mount_page(
        &server,
        "/",
        r#"<a href="/out">Partners</a> home@example.com"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/out"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("http://localhost:{}/foreign", port).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/foreign"))
        .respond_with(ResponseTemplate::new(200).set_body_string("leak@other.org"))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl_website(&format!("{}/", server.uri()), &WebsiteOptions::default())
        .await
        .expect("crawl should succeed");

    assert_eq!(to_vec(report.emails), vec!["home@example.com"]);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0], FetchError::OutOfScope { .. }));
}

#[tokio::test]
async fn test_page_budget_limits_requests() {
    let server = MockServer::start().await;

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/page{}">Page {}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &links).await;
    for i in 0..10 {
        mount_page(&server, &format!("/page{}", i), &format!("user{}@example.com", i)).await;
    }

    let options = WebsiteOptions {
        max_pages: 3,
        ..WebsiteOptions::default()
    };
    let report = crawl_website(&format!("{}/", server.uri()), &options)
        .await
        .expect("crawl should succeed");

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 3);
    assert_eq!(report.pages_attempted, 3);
    assert_eq!(
        to_vec(report.emails),
        vec!["user0@example.com", "user1@example.com"]
    );
}

#[tokio::test]
async fn test_failed_page_does_not_abort_crawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/broken">Broken</a><a href="/team">Team</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/team", "team@example.com").await;

    let report = crawl_website(&format!("{}/", server.uri()), &WebsiteOptions::default())
        .await
        .expect("crawl should succeed");

    assert_eq!(to_vec(report.emails), vec!["team@example.com"]);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0],
        FetchError::Status { status: 500, .. }
    ));
}

#[tokio::test]
async fn test_seed_unreachable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result =
        scrape_emails_from_website(&format!("{}/", server.uri()), &WebsiteOptions::default()).await;

    assert!(matches!(
        result,
        Err(CrawlError::SeedUnreachable(FetchError::Status { status: 404, .. }))
    ));
}

#[tokio::test]
async fn test_depth_zero_fetches_only_seed() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/next">Next</a> seed@example.com"#).await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(ResponseTemplate::new(200).set_body_string("next@example.com"))
        .expect(0)
        .mount(&server)
        .await;

    let options = WebsiteOptions {
        max_depth: 0,
        ..WebsiteOptions::default()
    };
    let emails = scrape_emails_from_website(&format!("{}/", server.uri()), &options)
        .await
        .expect("crawl should succeed");

    assert_eq!(to_vec(emails), vec!["seed@example.com"]);
}

#[tokio::test]
async fn test_scrape_single_page() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/contact",
        r#"<a href="/more">More</a> Press@Example.co.uk press@example.co.uk"#,
    )
    .await;

    let emails = scrape_emails_from_url(
        &format!("{}/contact", server.uri()),
        &HttpOptions::default(),
    )
    .await
    .expect("scrape should succeed");

    assert_eq!(to_vec(emails), vec!["press@example.co.uk"]);
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_scrape_single_page_keeps_trailing_slash() {
    let server = MockServer::start().await;

    mount_page(&server, "/contact/", "desk@example.com").await;

    let emails = scrape_emails_from_url(
        &format!("{}/contact/", server.uri()),
        &HttpOptions::default(),
    )
    .await
    .expect("scrape should succeed");

    assert_eq!(to_vec(emails), vec!["desk@example.com"]);
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/contact/");
}

#[tokio::test]
async fn test_config_file_drives_crawl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "ConfigBot/2.0"))
        .and(header("x-probe", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/deep">Deep</a> configured@example.com"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deep"))
        .respond_with(ResponseTemplate::new(200).set_body_string("deep@example.com"))
        .expect(0)
        .mount(&server)
        .await;

    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(
        file,
        r#"
[crawler]
max-depth = 0

[http]
user-agent = "ConfigBot/2.0"

[http.headers]
x-probe = "1"
"#
    )
    .expect("Failed to write config");

    let config = load_config(file.path()).expect("config should load");
    let options = WebsiteOptions::from_config(&config);
    let emails = scrape_emails_from_website(&format!("{}/", server.uri()), &options)
        .await
        .expect("crawl should succeed");

    assert_eq!(to_vec(emails), vec!["configured@example.com"]);
}
