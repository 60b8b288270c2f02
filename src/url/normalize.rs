use crate::{UrlError, UrlResult};
use std::fmt;
use url::{ParseError, Url};

/// A URL in canonical, comparable form
///
/// Two normalized URLs are equal exactly when their serializations are
/// equal, so the type can be used directly as a set or map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedUrl(Url);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Returns true for the schemes the crawler is able to fetch
pub fn is_http_family(scheme: &str) -> bool {
    scheme == "http" || scheme == "https"
}

/// Normalizes a URL against a context base URL
///
/// # Normalization Steps
///
/// 1. A URL without a scheme adopts the scheme of `base`
/// 2. A URL without a host adopts the host (and port) of `base`; its path is
///    taken relative to the root of that host
/// 3. Reject anything that is not `http` or `https`
/// 4. Remove the fragment
/// 5. An empty path becomes `/`
///
/// Host names are lowercased by the URL parser. The function is pure and
/// idempotent: normalizing an already normalized URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use website_scraper::url::normalize;
///
/// let base = Url::parse("https://example.com/docs/").unwrap();
/// let url = normalize("/guide#install", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/guide");
///
/// assert!(normalize("mailto:team@example.com", &base).is_none());
/// ```
pub fn normalize(url: &str, base: &Url) -> Option<NormalizedUrl> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let mut parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(ParseError::RelativeUrlWithoutBase) => adopt_base(url, base)?,
        Err(_) => return None,
    };

    if !is_http_family(parsed.scheme()) || parsed.host_str().is_none() {
        return None;
    }

    parsed.set_fragment(None);
    if parsed.path().is_empty() {
        parsed.set_path("/");
    }

    Some(NormalizedUrl(parsed))
}

/// Fills in the scheme and authority of `base` for a relative reference
fn adopt_base(url: &str, base: &Url) -> Option<Url> {
    if url.starts_with("//") {
        // Scheme-relative: only the scheme is missing
        return Url::parse(&format!("{}:{}", base.scheme(), url)).ok();
    }

    base.join("/").ok()?.join(url).ok()
}

/// Upgrades user input into an absolute base URL
///
/// Bare domains such as `example.com` or `example.com/docs` are given an
/// `https` scheme. Input that already carries a scheme is kept as is.
///
/// # Examples
///
/// ```
/// use website_scraper::url::normalize_base_url;
///
/// let url = normalize_base_url("example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
/// ```
pub fn normalize_base_url(input: &str) -> UrlResult<Url> {
    let input = input.trim();

    let candidate = if input.contains("://") {
        input.to_string()
    } else if let Some(rest) = input.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        format!("https://{}", input)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(format!("{}: {}", input, e)))?;

    if !is_http_family(url.scheme()) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost(input.to_string())),
    }
}
