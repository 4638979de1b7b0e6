//! Data structures and types for subwrap
//!
//! Contains all shared models used across the service organized by domain:
//! - **Media**: inbound media references and resolved metadata
//! - **Resolution**: session tokens and resolved archives
//! - **Response**: subtitle items in Stremio addon wire format

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Media Models
// =============================================================================

/// Catalog type discriminator for inbound requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

impl MediaType {
    /// Parse from the path segment used by Stremio routes
    pub fn from_path(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(MediaType::Movie),
            "series" => Some(MediaType::Series),
            _ => None,
        }
    }

    /// Path segment form ("movie" / "series")
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound subtitle request, constructed once per request.
///
/// `extra` is the opaque season:episode segment (e.g. "1:5"). It arrives
/// percent-decoded from the router and must be forwarded verbatim: the colon
/// is legitimate and must not be re-encoded.
#[derive(Debug, Clone)]
pub struct MediaReference {
    pub media_type: MediaType,
    pub id: String,
    pub extra: Option<String>,
}

impl MediaReference {
    pub fn new(media_type: MediaType, id: impl Into<String>, extra: Option<String>) -> Self {
        Self {
            media_type,
            id: id.into(),
            extra,
        }
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.extra {
            Some(extra) => write!(f, "{}/{}/{}", self.media_type, self.id, extra),
            None => write!(f, "{}/{}", self.media_type, self.id),
        }
    }
}

/// Canonical title metadata for one media item, produced once by the
/// metadata resolver and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    pub title: String,
    pub year: Option<u16>,
    pub alternate_titles: Vec<String>,
}

impl MediaMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            alternate_titles: Vec::new(),
        }
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_alternates(mut self, alternates: Vec<String>) -> Self {
        self.alternate_titles = alternates;
        self
    }
}

impl fmt::Display for MediaMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => f.write_str(&self.title),
        }
    }
}

// =============================================================================
// Resolution Models
// =============================================================================

/// Replay-ready cookie credential captured from a detail-page response.
///
/// Holds only `name=value` pairs joined by `"; "`: attributes such as
/// `Path` or `Expires` are stripped at capture time so they can never leak
/// into a replayed `Cookie` header. Replayed verbatim, never re-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Collapse raw `Set-Cookie` header values into one replay string.
    /// Returns `None` when no header carried a usable pair.
    pub fn from_set_cookie<'a, I>(headers: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let pairs: Vec<&str> = headers
            .into_iter()
            .filter_map(|v| v.split(';').next())
            .map(str::trim)
            .filter(|p| !p.is_empty() && p.contains('='))
            .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(SessionToken(pairs.join("; ")))
        }
    }

    /// Rehydrate a token that round-tripped through a deferred link.
    pub fn from_replay(value: impl Into<String>) -> Self {
        SessionToken(value.into())
    }

    /// The exact `Cookie` header value to replay.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A downloadable archive located by the detail resolver.
///
/// `session_token`, when present, was captured from the same detail page the
/// archive URL came from and is only ever replayed on that archive fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArchive {
    pub archive_url: String,
    pub session_token: Option<SessionToken>,
    pub referer_url: String,
}

// =============================================================================
// Response Models (Stremio addon wire format)
// =============================================================================

/// One subtitle entry in the addon response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleItem {
    pub id: String,
    pub lang: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Top-level `{ "subtitles": [...] }` addon response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitlesResponse {
    pub subtitles: Vec<SubtitleItem>,
}

impl SubtitlesResponse {
    pub fn empty() -> Self {
        Self {
            subtitles: Vec::new(),
        }
    }
}

/// Display name for a language code, used for fallback item labels
pub fn language_label(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "sl" => "Slovenian".to_string(),
        "en" => "English".to_string(),
        "hr" => "Croatian".to_string(),
        "sr" => "Serbian".to_string(),
        "de" => "German".to_string(),
        "it" => "Italian".to_string(),
        "fr" => "French".to_string(),
        "es" => "Spanish".to_string(),
        "cs" => "Czech".to_string(),
        "sk" => "Slovak".to_string(),
        "hu" => "Hungarian".to_string(),
        "pl" => "Polish".to_string(),
        _ => code.to_uppercase(),
    }
}
