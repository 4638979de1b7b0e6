//! subwrap - Stremio subtitle wrapper
//!
//! Wraps a flaky primary subtitle addon with a Podnapisi fallback search and
//! normalizes everything it serves to UTF-8 SRT.
//!
//! # Modules
//!
//! - `models` - Shared data structures (media references, archives, items)
//! - `config` - Explicit configuration for all upstreams and limits
//! - `query` - Metadata-to-search-query construction
//! - `extract` - Brittle HTML anchor extraction, isolated
//! - `api` - Outbound clients (primary addon, metadata, subtitle index)
//! - `fallback` - Priority-tiered fallback orchestration
//! - `deferred` - Self-referencing /srt link encoding
//! - `transcode` - Archive fetch + legacy-charset decode
//! - `server` - axum routes and CORS

pub mod api;
pub mod config;
pub mod deferred;
pub mod extract;
pub mod fallback;
pub mod models;
pub mod query;
pub mod server;
pub mod transcode;

// Re-export commonly used types
pub use config::Config;
pub use fallback::{FallbackOrchestrator, FallbackSubtitle, SubtitleIndex};
pub use models::{
    MediaMetadata, MediaReference, MediaType, ResolvedArchive, SessionToken, SubtitleItem,
    SubtitlesResponse,
};
pub use server::{router, AppState};
pub use transcode::{ArchiveTranscoder, TranscodeError};
