use crate::UrlError;
use url::Url;

/// Normalizes a URL into its canonical form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject any scheme other than http and https
/// 3. Lowercase the host
/// 4. Normalize path:
///    - Remove dot segments (. and ..) and empty segments
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 5. Remove fragment (everything after #)
///
/// The query string is kept verbatim: two URLs that differ only in their
/// query are distinct pages.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use mail_ripple::url::canonical_url;
///
/// let url = canonical_url("https://EXAMPLE.COM/page/#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn canonical_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = parse_http_url(url_str)?;

    // Lowercase the host
    let host = url
        .host_str()
        .map(str::to_lowercase)
        .ok_or_else(|| UrlError::MissingHost(url_str.to_string()))?;
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    // A bare `?` carries no information
    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}

/// Parses an absolute http(s) URL without rewriting it
///
/// Use this for addresses that are about to be requested; `canonical_url`
/// is for deduplication keys.
///
/// ```
/// use mail_ripple::url::parse_http_url;
///
/// let url = parse_http_url("https://example.com/contact/").unwrap();
/// assert_eq!(url.path(), "/contact/");
/// assert!(parse_http_url("ftp://example.com/").is_err());
/// ```
pub fn parse_http_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(url_str.to_string()));
    }

    Ok(url)
}

/// Returns the canonical key of a URL
///
/// Two URLs that name the same page except for fragment, trailing slash or
/// host casing produce the same key.
///
/// ```
/// use mail_ripple::url::canonicalize;
///
/// assert_eq!(
///     canonicalize("https://Example.com/about/").unwrap(),
///     canonicalize("https://example.com/about#team").unwrap(),
/// );
/// ```
pub fn canonicalize(url_str: &str) -> Result<String, UrlError> {
    canonical_url(url_str).map(String::from)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}
