use url::Url;

/// Query parameter carrying the real destination of a redirector hop
const REDIRECT_TARGET_PARAM: &str = "uddg";

/// Replaces a search-provider redirector link with its true destination
///
/// Result links of the DuckDuckGo HTML endpoints point at
/// `duckduckgo.com/l/?uddg=<encoded destination>`. Such links are decoded;
/// anything else is returned unchanged. Empty input yields `None`.
///
/// # Examples
///
/// ```
/// use website_scraper::url::unwrap_redirect;
///
/// let hop = "https://duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fdocs&rut=abc";
/// assert_eq!(unwrap_redirect(hop).as_deref(), Some("https://example.com/docs"));
/// ```
pub fn unwrap_redirect(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    let parsed = if candidate.starts_with("//") {
        Url::parse(&format!("https:{}", candidate))
    } else {
        Url::parse(candidate)
    };

    let Ok(parsed) = parsed else {
        return Some(candidate.to_string());
    };

    let is_redirector = parsed
        .host_str()
        .map_or(false, |host| host.ends_with("duckduckgo.com"))
        && parsed.path().starts_with("/l/");

    if is_redirector {
        let target = parsed
            .query_pairs()
            .find(|(key, _)| key == REDIRECT_TARGET_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty());
        if let Some(target) = target {
            return Some(target);
        }
    }

    Some(candidate.to_string())
}
