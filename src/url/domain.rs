use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// The port is not part of the domain.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_trawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true iff the URL's host is exactly `domain`
///
/// Subdomains do not match: `blog.example.com` is not `example.com`.
pub fn host_equals(url: &Url, domain: &str) -> bool {
    url.host_str()
        .map(|host| host.eq_ignore_ascii_case(domain))
        .unwrap_or(false)
}
