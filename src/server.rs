//! HTTP surface
//!
//! Thin axum router over the resolution pipeline: the Stremio addon routes
//! (`/manifest.json`, `/subtitles/...`), the deferred `/srt` transcode
//! endpoint, and health plumbing, all behind permissive CORS so players can
//! call the addon cross-origin.
//!
//! The subtitle handlers never fail: every pipeline error degrades to an
//! empty list. Only `/srt` surfaces errors: at transcode time there is no
//! fallback left to try.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::api::{IndexClient, MetadataClient, PrimaryClient};
use crate::config::Config;
use crate::deferred::{self, DeferredParams};
use crate::fallback::{FallbackOrchestrator, FallbackSubtitle};
use crate::models::{MediaReference, MediaType, SubtitleItem, SubtitlesResponse};
use crate::transcode::ArchiveTranscoder;

/// Shared per-process state: configuration plus the long-lived clients
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    primary: PrimaryClient,
    metadata: MetadataClient,
    fallback: FallbackOrchestrator<IndexClient>,
    transcoder: ArchiveTranscoder,
}

impl AppState {
    /// Build all clients from configuration
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let timeout = config.request_timeout();
        let index = IndexClient::new(&config.index_base, timeout, config.search_result_cap)?;
        let inner = Inner {
            primary: PrimaryClient::new(config.primary_base.clone(), timeout),
            metadata: MetadataClient::new(config.meta_base.clone(), timeout),
            fallback: FallbackOrchestrator::new(
                index,
                config.languages.clone(),
                config.fallback_fan_out,
            ),
            transcoder: ArchiveTranscoder::new(timeout),
            config,
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    fn config(&self) -> &Config {
        &self.inner.config
    }
}

/// Build the addon router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/manifest.json", get(manifest))
        .route("/subtitles/{type}/{id}", get(subtitles))
        .route("/subtitles/{type}/{id}/{extra}", get(subtitles_extra))
        .route("/srt", get(srt))
        .layer(cors)
        .with_state(state)
}

async fn root() -> &'static str {
    "OK - subwrap"
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn manifest() -> Json<serde_json::Value> {
    Json(json!({
        "id": "subwrap",
        "version": "1.2.1",
        "name": "Podnapisi UTF-8 Wrapper",
        "description": "ZIP/CP1250 -> UTF-8 .srt + fallback search",
        "resources": ["subtitles"],
        "types": ["movie", "series"],
        "idPrefixes": ["tt", "tmdb"],
        "catalogs": [],
        "behaviorHints": { "configurable": false, "configurationRequired": false }
    }))
}

async fn subtitles(
    State(state): State<AppState>,
    Path((media_type, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Json<SubtitlesResponse> {
    let id = strip_json_suffix(&id);
    Json(resolve_subtitles(&state, &media_type, id, None, &headers).await)
}

async fn subtitles_extra(
    State(state): State<AppState>,
    Path((media_type, id, extra)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Json<SubtitlesResponse> {
    // axum hands the segment over percent-decoded but otherwise untouched,
    // so a "1:5" season:episode extra keeps its colon
    let extra = strip_json_suffix(&extra);
    Json(resolve_subtitles(&state, &media_type, &id, Some(extra), &headers).await)
}

/// The shared subtitle handler: primary provider first, fallback pipeline
/// when it yields nothing, every result rewritten through `/srt`.
async fn resolve_subtitles(
    state: &AppState,
    media_type: &str,
    id: &str,
    extra: Option<&str>,
    headers: &HeaderMap,
) -> SubtitlesResponse {
    let Some(media_type) = MediaType::from_path(media_type) else {
        return SubtitlesResponse::empty();
    };
    let media = MediaReference::new(media_type, id, extra.map(String::from));
    let base = request_base(headers, state.config().port);
    let charset = &state.config().default_charset;

    let primary_items = state.inner.primary.subtitles(&media).await;
    if !primary_items.is_empty() {
        let subtitles = primary_items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let source = item.source_url()?;
                let lang = item.lang.clone().unwrap_or_else(|| "Slovenian".to_string());
                let name = item.title.clone().unwrap_or_else(|| lang.clone());
                Some(SubtitleItem {
                    id: item
                        .id
                        .clone()
                        .unwrap_or_else(|| format!("{}_{}", lang, i)),
                    lang,
                    url: deferred::encode(source, charset, &name, None, None, &base),
                    title: item.title.clone(),
                    format: Some("srt".to_string()),
                })
            })
            .collect();
        return SubtitlesResponse { subtitles };
    }

    info!("primary empty for {}, trying fallback", media);
    let Some(metadata) = state.inner.metadata.resolve(&media).await else {
        // No title, no query. Expected outcome, answered as "no subtitles".
        return SubtitlesResponse::empty();
    };

    match state.inner.fallback.find_fallback(&metadata).await {
        Some(hit) => SubtitlesResponse {
            subtitles: vec![fallback_item(hit, charset, &base)],
        },
        None => SubtitlesResponse::empty(),
    }
}

fn fallback_item(hit: FallbackSubtitle, charset: &str, base: &str) -> SubtitleItem {
    SubtitleItem {
        url: deferred::encode_archive(&hit.archive, charset, &hit.title, base),
        id: hit.id,
        lang: hit.lang,
        title: Some(hit.title),
        format: Some("srt".to_string()),
    }
}

/// Deferred transcode endpoint: fetch, extract, decode, stream
async fn srt(State(state): State<AppState>, Query(params): Query<DeferredParams>) -> Response {
    let charset = params
        .charset
        .unwrap_or_else(|| state.config().default_charset.clone());
    let name = deferred::sanitize_name(params.name.as_deref().unwrap_or("subtitles"));

    match state
        .inner
        .transcoder
        .transcode(
            &params.zip,
            &charset,
            params.cookie.as_deref(),
            params.referer.as_deref(),
        )
        .await
    {
        Ok(body) => (
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    "application/x-subrip; charset=utf-8".to_string(),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    format!("inline; filename=\"{}\"", name),
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!("transcode failed for {}: {}", params.zip, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Subtitle processing error",
            )
                .into_response()
        }
    }
}

/// Strip a trailing ".json" the Stremio routes carry inside the last segment
fn strip_json_suffix(segment: &str) -> &str {
    segment.strip_suffix(".json").unwrap_or(segment)
}

/// The inbound request's own origin, for building self-referencing links.
/// Honors `X-Forwarded-Proto` so links stay https behind a TLS proxy.
fn request_base(headers: &HeaderMap, port: u16) -> String {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| format!("localhost:{}", port));
    format!("{}://{}", proto, host)
}
