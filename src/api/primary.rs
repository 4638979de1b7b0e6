//! Primary provider addon client
//!
//! Fetches `{base}/subtitles/{type}/{id}[/{extra}].json` from the wrapped
//! addon. This is the first-tried source; when it is unreachable, errors, or
//! returns an empty list, the caller moves on to the fallback pipeline.
//! Failures here are absorbed: the wrapper exists precisely because the
//! upstream is flaky.

use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::models::MediaReference;

/// Primary provider client
pub struct PrimaryClient {
    base_url: String,
    client: reqwest::Client,
}

/// One subtitle entry as the primary provider serves it. Upstream revisions
/// have used several field names for the download URL over time, so every
/// known spelling is accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct PrimaryItem {
    pub id: Option<String>,
    #[serde(alias = "language")]
    pub lang: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub src: Option<String>,
    pub link: Option<String>,
    pub download: Option<String>,
    pub zip: Option<String>,
    pub href: Option<String>,
    pub file: Option<String>,
}

impl PrimaryItem {
    /// The first present download URL, in the upstream's historical
    /// preference order
    pub fn source_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .or(self.src.as_deref())
            .or(self.link.as_deref())
            .or(self.download.as_deref())
            .or(self.zip.as_deref())
            .or(self.href.as_deref())
            .or(self.file.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct PrimaryResponse {
    #[serde(default)]
    subtitles: Vec<PrimaryItem>,
}

impl PrimaryClient {
    /// Create a client for the given addon base URL
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent("Mozilla/5.0 (subwrap)")
                .build()
                .unwrap_or_default(),
        }
    }

    /// Fetch the provider's subtitle list for one media reference.
    ///
    /// `type` and `id` are percent-encoded; `extra` is appended verbatim so
    /// a season:episode colon survives the round trip. Any failure yields an
    /// empty list.
    pub async fn subtitles(&self, media: &MediaReference) -> Vec<PrimaryItem> {
        let extra_part = media
            .extra
            .as_deref()
            .map(|e| format!("/{}", e))
            .unwrap_or_default();
        let url = format!(
            "{}/subtitles/{}/{}{}.json",
            self.base_url,
            media.media_type,
            urlencoding::encode(&media.id),
            extra_part
        );

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("primary fetch failed for {}: {}", media, e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            warn!("primary status {} for {}", response.status(), media);
            return Vec::new();
        }

        match response.json::<PrimaryResponse>().await {
            Ok(body) => body.subtitles,
            Err(e) => {
                warn!("primary parse failed for {}: {}", media, e);
                Vec::new()
            }
        }
    }
}
