use crate::url::normalize::is_http_family;
use std::collections::BTreeSet;
use url::Url;

/// Extracts the authority (lowercase host plus explicit port) from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use website_scraper::url::authority;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(authority(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// The set of authorities a crawl is permitted to fetch from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainScope {
    domains: BTreeSet<String>,
}

impl DomainScope {
    /// Derives the scope from a base URL: its authority plus the
    /// `www.`-prefixed or `www.`-stripped counterpart
    pub fn derive(base: &Url) -> Self {
        let mut domains = BTreeSet::new();
        if let Some(authority) = authority(base) {
            if let Some(stripped) = authority.strip_prefix("www.") {
                domains.insert(stripped.to_string());
            } else {
                domains.insert(format!("www.{}", authority));
            }
            domains.insert(authority);
        }
        Self { domains }
    }

    /// Builds an explicit scope; an empty list falls back to [`derive`](Self::derive)
    pub fn from_domains<I, S>(domains: I, base: &Url) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains: BTreeSet<String> = domains
            .into_iter()
            .map(|d| d.as_ref().trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        if domains.is_empty() {
            Self::derive(base)
        } else {
            Self { domains }
        }
    }

    /// Returns true when the URL is fetchable and its authority is in scope
    pub fn allows(&self, url: &Url) -> bool {
        if !is_http_family(url.scheme()) {
            return false;
        }
        authority(url).map_or(false, |a| self.domains.contains(&a))
    }

    pub fn contains(&self, authority: &str) -> bool {
        self.domains.contains(authority)
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }
}
