//! Subtitle Index Client Tests
//!
//! Search-page link extraction, detail-page scraping with session cookie
//! capture, and the deterministic download-probe fallback, all against
//! canned HTML served by mockito.

use mockito::{Matcher, Server};
use std::time::Duration;
use subwrap::api::IndexClient;
use subwrap::models::SessionToken;

fn client(server: &Server) -> IndexClient {
    IndexClient::new(&server.url(), Duration::from_secs(5), 5).unwrap()
}

/// Test: search extracts capped, deduplicated detail links in page order
#[tokio::test]
async fn test_search_extracts_detail_links() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/subtitles/search/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("keywords".into(), "Example 2019".into()),
            Matcher::UrlEncoded("language".into(), "sl".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"<html><body>
                <a href="/subtitles/search/?page=2">2</a>
                <a href="/subtitles/100/example-2019">Example</a>
                <a href="/subtitles/100/example-2019">Example dup</a>
                <a href="/subtitles/200/example-two">Two</a>
                <a href="/faq">FAQ</a>
            </body></html>"#,
        )
        .create_async()
        .await;

    let links = client(&server).search("Example 2019", "sl").await;

    mock.assert_async().await;
    assert_eq!(links.len(), 2);
    assert!(links[0].ends_with("/subtitles/100/example-2019"));
    assert!(links[1].ends_with("/subtitles/200/example-two"));
}

/// Test: search failure degrades to an empty list
#[tokio::test]
async fn test_search_error_is_empty() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/subtitles/search/")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    assert!(client(&server).search("whatever", "sl").await.is_empty());
}

/// Test: detail scrape finds the download anchor and captures the session
/// cookie pairs, stripped of attributes
#[tokio::test]
async fn test_detail_scrape_with_cookie_capture() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/subtitles/100/example-2019")
        .with_status(200)
        .with_header("set-cookie", "PHPSESSID=deadbeef; Path=/; HttpOnly")
        .with_body(
            r#"<html><body>
                <a href="/subtitles/100/example-2019/download?container=zip">Download</a>
            </body></html>"#,
        )
        .create_async()
        .await;

    let detail_url = format!("{}/subtitles/100/example-2019", server.url());
    let archive = client(&server).resolve_detail(&detail_url).await.unwrap();

    mock.assert_async().await;
    assert!(archive
        .archive_url
        .ends_with("/subtitles/100/example-2019/download?container=zip"));
    assert_eq!(
        archive.session_token,
        SessionToken::from_set_cookie(["PHPSESSID=deadbeef"])
    );
    assert_eq!(archive.referer_url, detail_url);
}

/// Test: a detail page without anchors falls through to the probe phase,
/// which accepts a redirect status without following it
#[tokio::test]
async fn test_probe_fallback_on_redirect() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/subtitles/100/example-2019")
        .with_status(200)
        .with_body("<html><body><p>no links here</p></body></html>")
        .create_async()
        .await;

    let probe = server
        .mock("GET", "/subtitles/100/download")
        .match_query(Matcher::UrlEncoded("container".into(), "zip".into()))
        .with_status(302)
        .with_header("location", "https://cdn.example/file.zip")
        .create_async()
        .await;

    let detail_url = format!("{}/subtitles/100/example-2019", server.url());
    let archive = client(&server).resolve_detail(&detail_url).await.unwrap();

    probe.assert_async().await;
    assert!(archive.archive_url.ends_with("/subtitles/100/download?container=zip"));
    assert!(archive.session_token.is_none());
}

/// Test: first probe candidate failing, second succeeding
#[tokio::test]
async fn test_probe_second_candidate() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/subtitles/100/example-2019")
        .with_status(404)
        .create_async()
        .await;

    server
        .mock("GET", "/subtitles/100/download")
        .match_query(Matcher::UrlEncoded("container".into(), "zip".into()))
        .with_status(404)
        .create_async()
        .await;

    let bare = server
        .mock("GET", "/subtitles/100/download")
        .with_status(200)
        .create_async()
        .await;

    let detail_url = format!("{}/subtitles/100/example-2019", server.url());
    let archive = client(&server).resolve_detail(&detail_url).await.unwrap();

    bare.assert_async().await;
    assert!(archive.archive_url.ends_with("/subtitles/100/download"));
}

/// Test: both phases exhausted yields None
#[tokio::test]
async fn test_resolve_detail_exhausted() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/subtitles/100/example-2019")
        .with_status(200)
        .with_body("<p>nothing</p>")
        .create_async()
        .await;

    server
        .mock("GET", "/subtitles/100/download")
        .match_query(Matcher::Any)
        .with_status(404)
        .expect(2)
        .create_async()
        .await;

    let detail_url = format!("{}/subtitles/100/example-2019", server.url());
    assert!(client(&server).resolve_detail(&detail_url).await.is_none());
}

/// Test: a detail link without a numeric id cannot be probed
#[tokio::test]
async fn test_probe_needs_numeric_id() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/subtitles/search-help")
        .with_status(200)
        .with_body("<p>no links</p>")
        .create_async()
        .await;

    let detail_url = format!("{}/subtitles/search-help", server.url());
    assert!(client(&server).resolve_detail(&detail_url).await.is_none());
}
