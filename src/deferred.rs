//! Deferred link encoding
//!
//! A resolved archive is not fetched at resolution time. Instead the addon
//! answers with a same-origin `/srt?...` link carrying everything the later
//! fetch needs: archive URL, charset, display name, and the captured
//! session cookie + referer. The expensive download/transcode then only
//! happens if the player actually picks that subtitle, and the short-lived
//! cookie survives the gap without anyone managing a cookie jar.
//!
//! Encoding goes through `Url::query_pairs_mut`, so every value is
//! percent-encoded exactly once; the `/srt` handler's query extraction
//! decodes exactly once. No raw bytes ever ride in a link, only the URL and
//! its metadata.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use url::Url;

use crate::models::ResolvedArchive;

/// Characters allowed in a display name; everything else becomes `_`
fn name_allowed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.\-()\[\] ]+").expect("name regex"))
}

/// Query parameters of a deferred `/srt` link, as the handler decodes them
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DeferredParams {
    /// Archive (or raw subtitle) source URL
    pub zip: String,
    /// Legacy charset to decode from
    pub charset: Option<String>,
    /// Download filename
    pub name: Option<String>,
    /// Session cookie to replay, verbatim
    pub cookie: Option<String>,
    /// Referer to send on the archive fetch
    pub referer: Option<String>,
}

/// Build the deferred `/srt` link for a resolved archive.
///
/// `base` is the inbound request's own origin (scheme://host[:port]);
/// `display_name` is sanitized and forced to a `.srt` extension.
pub fn encode_archive(
    archive: &ResolvedArchive,
    charset: &str,
    display_name: &str,
    base: &str,
) -> String {
    encode(
        &archive.archive_url,
        charset,
        display_name,
        archive.session_token.as_ref().map(|t| t.as_str()),
        Some(archive.referer_url.as_str()),
        base,
    )
}

/// Build a deferred `/srt` link from bare parts (primary-provider items
/// carry no session state).
pub fn encode(
    source_url: &str,
    charset: &str,
    display_name: &str,
    cookie: Option<&str>,
    referer: Option<&str>,
    base: &str,
) -> String {
    let mut url = match Url::parse(base).and_then(|b| b.join("/srt")) {
        Ok(u) => u,
        // base comes from our own listener config; a hardcoded fallback
        // keeps the link shape intact even if it is somehow malformed
        Err(_) => Url::parse("http://localhost/srt").expect("static url"),
    };

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("zip", source_url);
        pairs.append_pair("charset", charset);
        pairs.append_pair("name", &sanitize_name(display_name));
        if let Some(cookie) = cookie {
            pairs.append_pair("cookie", cookie);
        }
        if let Some(referer) = referer {
            pairs.append_pair("referer", referer);
        }
    }

    url.into()
}

/// Replace path-unsafe characters with `_` and force the `.srt` extension
pub fn sanitize_name(raw: &str) -> String {
    let cleaned = name_allowed_re().replace_all(raw, "_");
    let cleaned = cleaned.trim();
    let stem = if cleaned.is_empty() { "subtitles" } else { cleaned };
    if stem.to_lowercase().ends_with(".srt") {
        stem.to_string()
    } else {
        format!("{}.srt", stem)
    }
}
