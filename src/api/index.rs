//! Subtitle index client (search + detail-page resolution)
//!
//! Talks to the Podnapisi-style index the way a browser would: an HTML
//! search endpoint, detail pages scraped for download anchors, and session
//! cookies that must be replayed on the eventual archive fetch. The HTML
//! pattern matching itself lives in [`crate::extract`].

use anyhow::{Context, Result};
use reqwest::header::SET_COOKIE;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::extract;
use crate::models::{ResolvedArchive, SessionToken};

/// Subtitle index error types
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("index returned status {0}")]
    BadStatus(StatusCode),

    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Client for the subtitle index site
pub struct IndexClient {
    base_url: Url,
    /// Redirect-following client for search and detail pages
    client: reqwest::Client,
    /// Non-redirecting client for the download-probe phase, where a 301/302
    /// already proves the candidate exists
    probe_client: reqwest::Client,
    result_cap: usize,
}

impl IndexClient {
    /// Create a client for the given index base URL
    pub fn new(base_url: &str, timeout: Duration, result_cap: usize) -> Result<Self> {
        let base_url = Url::parse(base_url).context("invalid index base URL")?;
        let ua = "Mozilla/5.0 (subwrap)";
        Ok(Self {
            base_url,
            client: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(ua)
                .build()
                .context("build index client")?,
            probe_client: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(ua)
                .redirect(Policy::none())
                .build()
                .context("build probe client")?,
            result_cap,
        })
    }

    /// Search one query in one language, returning candidate detail links.
    ///
    /// Failures are absorbed to an empty list: the orchestrator just moves
    /// to the next candidate.
    pub async fn search(&self, query: &str, language: &str) -> Vec<String> {
        match self.search_inner(query, language).await {
            Ok(links) => links,
            Err(e) => {
                warn!("index search '{}' ({}) failed: {}", query, language, e);
                Vec::new()
            }
        }
    }

    async fn search_inner(&self, query: &str, language: &str) -> Result<Vec<String>, IndexError> {
        let url = format!(
            "{}subtitles/search/?keywords={}&language={}",
            self.base_url,
            urlencoding::encode(query),
            language
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(IndexError::BadStatus(response.status()));
        }

        let html = response.text().await?;
        let links = extract::detail_links(&html, &self.base_url, self.result_cap);
        debug!(
            "index search '{}' ({}): {} candidate links",
            query,
            language,
            links.len()
        );
        Ok(links)
    }

    /// Resolve a detail link to a downloadable archive.
    ///
    /// Phase A scrapes the detail page for a download anchor, capturing any
    /// session cookies the index issues. Phase B falls back to deterministic
    /// download URLs built from the subtitle's numeric id, probed without
    /// following redirects. Each candidate is tried exactly once; `None`
    /// sends the caller to the next detail link.
    pub async fn resolve_detail(&self, detail_url: &str) -> Option<ResolvedArchive> {
        if let Some(archive) = self.scrape_detail(detail_url).await {
            return Some(archive);
        }
        self.probe_downloads(detail_url).await
    }

    /// Phase A: fetch the detail page and scrape the first download anchor
    async fn scrape_detail(&self, detail_url: &str) -> Option<ResolvedArchive> {
        let response = match self.client.get(detail_url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("detail fetch failed for {}: {}", detail_url, e);
                return None;
            }
        };
        if !response.status().is_success() {
            warn!("detail status {} for {}", response.status(), detail_url);
            return None;
        }

        // The cookies must come off this response: the index issues a
        // per-session token here that the later archive fetch has to replay.
        let session_token = SessionToken::from_set_cookie(
            response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok()),
        );

        let html = match response.text().await {
            Ok(h) => h,
            Err(e) => {
                warn!("detail body read failed for {}: {}", detail_url, e);
                return None;
            }
        };

        let archive_url = extract::archive_link(&html, &self.base_url)?;
        debug!("detail {} -> archive {}", detail_url, archive_url);
        Some(ResolvedArchive {
            archive_url,
            session_token,
            referer_url: detail_url.to_string(),
        })
    }

    /// Phase B: construct the index's conventional download URLs from the
    /// numeric id and probe them
    async fn probe_downloads(&self, detail_url: &str) -> Option<ResolvedArchive> {
        let id = extract::detail_id(detail_url)?;
        let candidates = [
            format!("{}subtitles/{}/download?container=zip", self.base_url, id),
            format!("{}subtitles/{}/download", self.base_url, id),
        ];

        for candidate in candidates {
            match self.probe_client.get(&candidate).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::OK
                        || status == StatusCode::MOVED_PERMANENTLY
                        || status == StatusCode::FOUND
                    {
                        debug!("probe hit {} ({})", candidate, status);
                        return Some(ResolvedArchive {
                            archive_url: candidate,
                            session_token: None,
                            referer_url: detail_url.to_string(),
                        });
                    }
                    debug!("probe miss {} ({})", candidate, status);
                }
                Err(e) => warn!("probe failed for {}: {}", candidate, e),
            }
        }
        None
    }
}
