//! Cinemeta metadata resolver
//!
//! Resolves canonical title/year (and alternate titles) for a catalog ID via
//! a Cinemeta-compatible `GET /meta/{type}/{id}.json`. Every failure mode
//! (transport error, non-success status, bad JSON, missing title) collapses
//! to `None`: without a title there is no query to build, and the caller
//! answers with an empty subtitle list rather than an error.

use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::models::{MediaMetadata, MediaReference};

/// Metadata service client
pub struct MetadataClient {
    base_url: String,
    client: reqwest::Client,
}

impl MetadataClient {
    /// Create a client for the given metadata service base URL
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

    /// Resolve metadata for one media reference.
    ///
    /// A single attempt, no retries. `None` is an expected outcome and skips
    /// the fallback pipeline entirely.
    pub async fn resolve(&self, media: &MediaReference) -> Option<MediaMetadata> {
        let url = format!(
            "{}/meta/{}/{}.json",
            self.base_url,
            media.media_type,
            urlencoding::encode(&media.id)
        );

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("meta fetch failed for {}: {}", media, e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("meta status {} for {}", response.status(), media);
            return None;
        }

        let body: MetaResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!("meta parse failed for {}: {}", media, e);
                return None;
            }
        };

        body.into_metadata()
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct MetaResponse {
    meta: Option<MetaRaw>,
}

#[derive(Debug, Deserialize)]
struct MetaRaw {
    name: Option<String>,
    // Cinemeta serves years as numbers for movies and strings like
    // "2011-2019" for series
    year: Option<serde_json::Value>,
    #[serde(default)]
    aka: Vec<String>,
    #[serde(rename = "alternateName")]
    alternate_name: Option<String>,
    #[serde(rename = "alternateTitles", default)]
    alternate_titles: Vec<String>,
}

impl MetaResponse {
    fn into_metadata(self) -> Option<MediaMetadata> {
        let meta = self.meta?;
        let title = meta.name.filter(|n| !n.trim().is_empty())?;

        let year = meta.year.as_ref().and_then(parse_year);

        let mut alternates: Vec<String> = Vec::new();
        for alt in meta
            .aka
            .into_iter()
            .chain(meta.alternate_name)
            .chain(meta.alternate_titles)
        {
            let alt = alt.trim().to_string();
            if !alt.is_empty() && alt != title && !alternates.contains(&alt) {
                alternates.push(alt);
            }
        }

        let mut metadata = MediaMetadata::new(title).with_alternates(alternates);
        metadata.year = year;
        Some(metadata)
    }
}

/// Accept a year as a JSON number or as the leading 4 digits of a string
fn parse_year(value: &serde_json::Value) -> Option<u16> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|y| u16::try_from(y).ok()),
        serde_json::Value::String(s) => s.get(..4).and_then(|lead| lead.parse().ok()),
        _ => None,
    }
}
