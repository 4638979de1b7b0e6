//! Archive fetch + charset transcoding
//!
//! Consumes a deferred link's parameters: fetch the archive (replaying the
//! captured session cookie and referer), pull the first subtitle entry out
//! of a ZIP container, and decode it from a legacy single-byte charset into
//! UTF-8. This is the one place in the pipeline with no further fallback, so
//! failures here surface to the caller instead of degrading silently.

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{COOKIE, REFERER};
use std::io::Read;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Subtitle file extensions recognized inside a container archive
const SUBTITLE_EXTENSIONS: &[&str] = &[".srt", ".ass", ".sub"];

/// Transcode error types, each terminal for the request
#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("archive fetch failed: {0}")]
    FetchFailed(String),

    #[error("no subtitle entry in archive")]
    NoSubtitleEntry,

    #[error("decode failed: {0}")]
    DecodeFailed(String),
}

/// Fetches archives and normalizes their subtitle payload to UTF-8
pub struct ArchiveTranscoder {
    client: reqwest::Client,
}

impl ArchiveTranscoder {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent("Mozilla/5.0 (subwrap)")
                .build()
                .unwrap_or_default(),
        }
    }

    /// Fetch `source_url`, extract the subtitle payload, and decode it from
    /// `charset` into UTF-8 bytes.
    ///
    /// The URL's path (query string ignored) decides container handling: a
    /// `.zip` suffix means the body is an archive, from which the first
    /// entry with a subtitle extension is taken in listing order. Any other
    /// path treats the whole body as the subtitle file.
    pub async fn transcode(
        &self,
        source_url: &str,
        charset: &str,
        cookie: Option<&str>,
        referer: Option<&str>,
    ) -> Result<Vec<u8>, TranscodeError> {
        let mut request = self.client.get(source_url);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TranscodeError::FetchFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TranscodeError::FetchFailed(format!(
                "status {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TranscodeError::FetchFailed(e.to_string()))?
            .to_vec();

        let raw = if is_zip_url(source_url) {
            extract_first_subtitle(body).await?
        } else {
            body
        };

        decode_charset(&raw, charset)
    }
}

/// Does the URL path (ignoring any query string) name a ZIP container?
pub fn is_zip_url(source_url: &str) -> bool {
    let path = match Url::parse(source_url) {
        Ok(u) => u.path().to_string(),
        // Not an absolute URL; fall back to chopping the query off by hand
        Err(_) => source_url
            .split('?')
            .next()
            .unwrap_or(source_url)
            .to_string(),
    };
    path.to_lowercase().ends_with(".zip")
}

/// Extract the first subtitle-named entry from a ZIP archive, in the
/// archive's own listing order. Runs on the blocking pool: zip reading is
/// synchronous and the payloads are small but this keeps the executor clean.
async fn extract_first_subtitle(body: Vec<u8>) -> Result<Vec<u8>, TranscodeError> {
    tokio::task::spawn_blocking(move || -> Result<Vec<u8>, TranscodeError> {
        let cursor = std::io::Cursor::new(body);
        let mut archive = zip::ZipArchive::new(cursor)
            .map_err(|e| TranscodeError::DecodeFailed(format!("bad archive: {}", e)))?;

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| TranscodeError::DecodeFailed(format!("bad entry: {}", e)))?;
            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_lowercase();
            if !SUBTITLE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
                continue;
            }

            debug!("extracting '{}' from archive", entry.name());
            let mut contents = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut contents)
                .map_err(|e| TranscodeError::DecodeFailed(format!("extract: {}", e)))?;
            return Ok(contents);
        }

        Err(TranscodeError::NoSubtitleEntry)
    })
    .await
    .map_err(|e| TranscodeError::DecodeFailed(format!("extract task: {}", e)))?
}

/// Decode `raw` from the named legacy charset into UTF-8 bytes.
///
/// UTF-8 input passes through unchanged: running valid UTF-8 through a
/// single-byte table would corrupt every non-ASCII character.
pub fn decode_charset(raw: &[u8], charset: &str) -> Result<Vec<u8>, TranscodeError> {
    let encoding = resolve_charset(charset)
        .ok_or_else(|| TranscodeError::DecodeFailed(format!("unknown charset '{}'", charset)))?;

    if encoding == UTF_8 {
        return Ok(raw.to_vec());
    }

    let (decoded, _, _) = encoding.decode(raw);
    Ok(decoded.into_owned().into_bytes())
}

/// Resolve a charset label, accepting the `cp####` alias family the original
/// provider uses for `windows-####` code pages
pub fn resolve_charset(label: &str) -> Option<&'static Encoding> {
    let label = label.trim().to_lowercase();
    let label = match label.strip_prefix("cp") {
        Some(digits) if digits.chars().all(|c| c.is_ascii_digit()) => {
            format!("windows-{}", digits)
        }
        _ => label,
    };
    Encoding::for_label(label.as_bytes())
}
