use url::{Host, Url};

/// Public suffixes made of two labels, under which registrations happen one
/// level deeper (`example.co.uk`, not `co.uk`)
const MULTI_LABEL_SUFFIXES: &[&str] = &[
    "ac.jp", "ac.nz", "ac.uk", "ac.za", "co.id", "co.il", "co.in", "co.jp", "co.kr", "co.nz",
    "co.th", "co.uk", "co.za", "com.ar", "com.au", "com.br", "com.cn", "com.co", "com.hk",
    "com.mx", "com.my", "com.ng", "com.pe", "com.ph", "com.pk", "com.sg", "com.tr", "com.tw",
    "com.ua", "com.vn", "edu.au", "gov.au", "gov.uk", "ne.jp", "net.au", "net.br", "net.cn",
    "net.nz", "or.jp", "org.au", "org.br", "org.cn", "org.nz", "org.uk", "org.za", "gov.br",
];

/// Computes the registrable domain of a URL
///
/// The host is lower-cased with scheme, credentials, port and path dropped,
/// then reduced to the label directly below its public suffix, so every
/// subdomain of a site shares one registrable domain. IP addresses and
/// single-label hosts are returned as they are.
///
/// # Arguments
///
/// * `url` - The URL to extract the registrable domain from
///
/// # Returns
///
/// * `Some(String)` - The registrable domain
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use mail_ripple::url::registrable_domain;
///
/// let url = Url::parse("https://www.Example.com:8443/path").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://shop.example.co.uk/").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.co.uk".to_string()));
/// ```
pub fn registrable_domain(url: &Url) -> Option<String> {
    let host = match url.host()? {
        Host::Ipv4(addr) => return Some(addr.to_string()),
        Host::Ipv6(addr) => return Some(addr.to_string()),
        Host::Domain(domain) => domain.trim_end_matches('.').to_lowercase(),
    };

    if host.is_empty() {
        return None;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return Some(host);
    }

    let last_two = labels[labels.len() - 2..].join(".");
    let keep = if MULTI_LABEL_SUFFIXES.contains(&last_two.as_str()) {
        3
    } else {
        2
    };

    Some(labels[labels.len() - keep..].join("."))
}
