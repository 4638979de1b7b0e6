//! HTML link extraction for the subtitle index
//!
//! The index has no API; we depend on anchor href patterns in its search and
//! detail pages. That parsing is brittle by nature, so it lives here behind
//! two narrow functions: orchestration code never touches HTML, and tests
//! substitute canned fixtures.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Matches a canonical detail-page path: `/subtitles/<numeric-id>/...`
fn detail_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/subtitles/\d+(?:/|$)").expect("detail path regex"))
}

/// Matches the numeric id inside a detail URL path
fn detail_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/subtitles/(\d+)(?:/|$)").expect("detail id regex"))
}

/// Extract candidate detail-page links from a search result page.
///
/// Collects, in document order: every anchor whose path looks like
/// `/subtitles/<id>/...` (canonical detail link) and every anchor whose href
/// contains `/download` (secondary candidate). Relative hrefs are resolved
/// against `base`; results are deduplicated by exact URL and capped.
pub fn detail_links(html: &str, base: &Url, cap: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut links: Vec<String> = Vec::new();
    for element in document.select(&selector) {
        if links.len() >= cap {
            break;
        }
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = decode_html_entities(href);

        let is_detail = detail_path_re().is_match(&href)
            || absolute_path(&href).is_some_and(|p| detail_path_re().is_match(&p));
        let is_download = href.contains("/download");
        if !is_detail && !is_download {
            continue;
        }

        if let Some(absolute) = to_absolute(&href, base) {
            if !links.contains(&absolute) {
                links.push(absolute);
            }
        }
    }
    links
}

/// Extract the first downloadable archive link from a detail page.
///
/// First anchor whose href contains `.zip` or `/download` wins, resolved to
/// an absolute URL against `base`.
pub fn archive_link(html: &str, base: &Url) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").ok()?;

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = decode_html_entities(href);
        if href.contains(".zip") || href.contains("/download") {
            if let Some(absolute) = to_absolute(&href, base) {
                return Some(absolute);
            }
        }
    }
    None
}

/// Pull the numeric subtitle id out of a detail-page URL, for the
/// deterministic download-probe fallback.
pub fn detail_id(detail_url: &str) -> Option<String> {
    let path = Url::parse(detail_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| detail_url.to_string());
    detail_id_re()
        .captures(&path)
        .map(|caps| caps[1].to_string())
}

/// Resolve an href (absolute or site-relative) against the index base
fn to_absolute(href: &str, base: &Url) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    base.join(href).ok().map(String::from)
}

/// Path portion of an absolute href, for pattern-matching absolute links
fn absolute_path(href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        Url::parse(href).ok().map(|u| u.path().to_string())
    } else {
        None
    }
}

/// Decode the handful of HTML entities that show up inside href values
fn decode_html_entities(href: &str) -> String {
    href.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.podnapisi.net").unwrap()
    }

    #[test]
    fn test_detail_links_from_search_page() {
        let html = r#"
        <html><body>
            <a href="/subtitles/12345/some-movie-2019">Movie</a>
            <a href="/subtitles/search/?page=2">next page</a>
            <a href="/subtitles/67890/other">Other</a>
            <a href="/about">About</a>
        </body></html>
        "#;

        let links = detail_links(html, &base(), 5);
        assert_eq!(
            links,
            vec![
                "https://www.podnapisi.net/subtitles/12345/some-movie-2019",
                "https://www.podnapisi.net/subtitles/67890/other",
            ]
        );
    }

    #[test]
    fn test_detail_links_includes_download_anchors() {
        let html = r#"<a href="/subtitles/111/x/download">dl</a>"#;
        let links = detail_links(html, &base(), 5);
        assert_eq!(
            links,
            vec!["https://www.podnapisi.net/subtitles/111/x/download"]
        );
    }

    #[test]
    fn test_detail_links_dedup_and_cap() {
        let html = r#"
            <a href="/subtitles/1/a">a</a>
            <a href="/subtitles/1/a">a again</a>
            <a href="/subtitles/2/b">b</a>
            <a href="/subtitles/3/c">c</a>
        "#;
        let links = detail_links(html, &base(), 2);
        assert_eq!(links.len(), 2);
        assert!(links[0].ends_with("/subtitles/1/a"));
        assert!(links[1].ends_with("/subtitles/2/b"));
    }

    #[test]
    fn test_detail_links_absolute_href() {
        let html = r#"<a href="https://www.podnapisi.net/subtitles/42/abs">x</a>"#;
        let links = detail_links(html, &base(), 5);
        assert_eq!(links, vec!["https://www.podnapisi.net/subtitles/42/abs"]);
    }

    #[test]
    fn test_archive_link_prefers_first_match() {
        let html = r#"
            <a href="/static/help">help</a>
            <a href="/subtitles/123/movie/download?container=zip">download</a>
            <a href="/files/other.zip">other</a>
        "#;
        let link = archive_link(html, &base()).unwrap();
        assert_eq!(
            link,
            "https://www.podnapisi.net/subtitles/123/movie/download?container=zip"
        );
    }

    #[test]
    fn test_archive_link_decodes_entities() {
        let html = r#"<a href="/download?id=1&amp;container=zip">dl</a>"#;
        let link = archive_link(html, &base()).unwrap();
        assert_eq!(
            link,
            "https://www.podnapisi.net/download?id=1&container=zip"
        );
    }

    #[test]
    fn test_archive_link_none_when_absent() {
        assert_eq!(archive_link("<p>nothing here</p>", &base()), None);
    }

    #[test]
    fn test_detail_id() {
        assert_eq!(
            detail_id("https://www.podnapisi.net/subtitles/9876/movie-name"),
            Some("9876".to_string())
        );
        assert_eq!(detail_id("https://www.podnapisi.net/about"), None);
    }
}
