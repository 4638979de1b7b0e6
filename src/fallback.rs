//! Fallback orchestration
//!
//! Drives the metadata-derived query set across the configured languages
//! until one detail link yields a usable archive. Languages are strict
//! priority tiers: no language-2 work starts until every language-1
//! candidate has failed. Within a tier, query attempts race with bounded
//! fan-out and the first success cancels the rest.
//!
//! The index is behind the [`SubtitleIndex`] trait so tests can substitute
//! a scripted mock and assert call ordering.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::api::IndexClient;
use crate::models::{language_label, MediaMetadata, ResolvedArchive};
use crate::query::build_queries;

/// Narrow seam over the subtitle index: one search call, one detail
/// resolution. Failures are represented as empty/`None`, never errors.
#[async_trait]
pub trait SubtitleIndex: Send + Sync {
    /// Candidate detail links for one (query, language) pair
    async fn search(&self, query: &str, language: &str) -> Vec<String>;

    /// Downloadable archive for one detail link, if any
    async fn resolve_detail(&self, detail_url: &str) -> Option<ResolvedArchive>;
}

#[async_trait]
impl SubtitleIndex for IndexClient {
    async fn search(&self, query: &str, language: &str) -> Vec<String> {
        IndexClient::search(self, query, language).await
    }

    async fn resolve_detail(&self, detail_url: &str) -> Option<ResolvedArchive> {
        IndexClient::resolve_detail(self, detail_url).await
    }
}

/// The single subtitle produced by a successful fallback run
#[derive(Debug, Clone)]
pub struct FallbackSubtitle {
    /// Language code, doubling as the item id
    pub id: String,
    /// Human-readable language label
    pub lang: String,
    /// Item title shown in the player ("Podnapisi: {query}")
    pub title: String,
    /// The archive to fetch and transcode later
    pub archive: ResolvedArchive,
}

/// Priority-ordered fallback search over the subtitle index
pub struct FallbackOrchestrator<I> {
    index: I,
    languages: Vec<String>,
    fan_out: usize,
}

impl<I: SubtitleIndex> FallbackOrchestrator<I> {
    pub fn new(index: I, languages: Vec<String>, fan_out: usize) -> Self {
        Self {
            index,
            languages,
            fan_out: fan_out.max(1),
        }
    }

    /// Find at most one subtitle for the given metadata.
    ///
    /// Iterates languages in strict order. For each language, every
    /// candidate query runs as one attempt (search, then in-order detail
    /// resolution); attempts are raced `fan_out` at a time and the first
    /// hit wins: dropping the stream cancels whatever is still in flight.
    /// Exhausting all tiers yields `None`, which the caller turns into an
    /// empty subtitle list rather than an error.
    pub async fn find_fallback(&self, metadata: &MediaMetadata) -> Option<FallbackSubtitle> {
        let queries = build_queries(metadata);
        if queries.is_empty() {
            debug!("no usable queries for '{}'", metadata.title);
            return None;
        }

        for language in &self.languages {
            let index = &self.index;
            let mut attempts = stream::iter(queries.iter().cloned())
                .map(|query| async move {
                    let links = index.search(&query, language).await;
                    for link in links {
                        if let Some(archive) = index.resolve_detail(&link).await {
                            return Some((query, archive));
                        }
                    }
                    None
                })
                .buffer_unordered(self.fan_out);

            while let Some(result) = attempts.next().await {
                if let Some((query, archive)) = result {
                    info!(
                        "fallback hit: '{}' ({}) -> {}",
                        query, language, archive.archive_url
                    );
                    return Some(FallbackSubtitle {
                        id: language.clone(),
                        lang: language_label(language),
                        title: format!("Podnapisi: {}", query),
                        archive,
                    });
                }
            }
            debug!("language tier '{}' exhausted", language);
        }

        None
    }
}
