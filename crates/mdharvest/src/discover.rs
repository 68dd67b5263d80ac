//! Link discovery
//!
//! Expands one seed page into its set of same-domain candidate links.
//! Discovery is a single hop: only anchors found on the seed page itself
//! are considered, never links found on the pages they point to.

use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Seed page fetch timeout
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Discover same-domain candidate links on a seed page
///
/// The returned list always starts with the seed itself, is deduplicated
/// by exact URL string in first-seen order, and is truncated to `cap`
/// entries. When the seed page cannot be fetched the crawl degrades to
/// the seed alone rather than failing the run.
pub async fn discover(seed: &Url, cap: usize, user_agent: &str) -> Vec<Url> {
    let mut candidates = vec![seed.clone()];

    match fetch_seed_page(seed, user_agent).await {
        Ok(html) => {
            for link in extract_links(&html, seed) {
                if !same_host(seed, &link) {
                    continue;
                }
                if candidates.iter().any(|c| c.as_str() == link.as_str()) {
                    continue;
                }
                candidates.push(link);
            }
        }
        Err(err) => {
            warn!(seed = %seed, error = %err, "seed page unreachable, crawling the seed alone");
        }
    }

    candidates.truncate(cap);
    debug!(seed = %seed, count = candidates.len(), "discovered candidate links");
    candidates
}

/// Fetch the raw seed page body
///
/// The body is parsed for anchors regardless of status code; an error
/// page without links simply yields an empty candidate expansion.
async fn fetch_seed_page(seed: &Url, user_agent: &str) -> Result<String, reqwest::Error> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(DISCOVERY_TIMEOUT)
        .build()?;

    client.get(seed.clone()).send().await?.text().await
}

/// Extract all resolvable http(s) anchor targets from an HTML page
fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_href(base, href))
        .collect()
}

/// Resolve a possibly-relative href against the page URL
///
/// Returns `None` for anything that is not an http(s) URL after
/// resolution (`mailto:`, `javascript:`, malformed hrefs). Fragments are
/// stripped so `#section` links collapse onto their page.
fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Compare hosts ignoring a leading `www.` on either side
pub(crate) fn same_host(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(a), Some(b)) => strip_www(a).eq_ignore_ascii_case(strip_www(b)),
        _ => false,
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_host_www_stripped() {
        assert!(same_host(
            &url("https://www.example.org/a"),
            &url("https://example.org/b")
        ));
        assert!(same_host(
            &url("https://example.org/"),
            &url("https://WWW.example.org/")
        ));
        assert!(!same_host(
            &url("https://docs.example.org/"),
            &url("https://example.org/")
        ));
    }

    #[test]
    fn test_resolve_relative_forms() {
        let base = url("https://example.org/docs/page");
        assert_eq!(
            resolve_href(&base, "/abs").unwrap().as_str(),
            "https://example.org/abs"
        );
        assert_eq!(
            resolve_href(&base, "./sibling").unwrap().as_str(),
            "https://example.org/docs/sibling"
        );
        assert_eq!(
            resolve_href(&base, "https://example.org/full").unwrap().as_str(),
            "https://example.org/full"
        );
    }

    #[test]
    fn test_resolve_discards_non_http() {
        let base = url("https://example.org/");
        assert!(resolve_href(&base, "mailto:team@example.org").is_none());
        assert!(resolve_href(&base, "javascript:void(0)").is_none());
    }

    #[test]
    fn test_resolve_strips_fragments() {
        let base = url("https://example.org/guide");
        assert_eq!(
            resolve_href(&base, "#install").unwrap().as_str(),
            "https://example.org/guide"
        );
        assert_eq!(
            resolve_href(&base, "/guide#usage").unwrap().as_str(),
            "https://example.org/guide"
        );
    }

    #[test]
    fn test_extract_links_from_anchors() {
        let html = r#"
            <a href="/a">A</a>
            <a href="b.html">B</a>
            <a>no href</a>
            <a href="mailto:x@y.z">mail</a>
        "#;
        let links = extract_links(html, &url("https://example.org/docs/"));
        let strings: Vec<&str> = links.iter().map(|u| u.as_str()).collect();
        assert_eq!(
            strings,
            vec!["https://example.org/a", "https://example.org/docs/b.html"]
        );
    }
}
