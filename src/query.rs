//! Search query construction
//!
//! Turns resolved metadata into an ordered, deduplicated set of candidate
//! search strings for the subtitle index. Pure functions, no I/O: the
//! orchestrator feeds the result through the search client in order.

use crate::models::MediaMetadata;
use regex::Regex;
use std::sync::OnceLock;

/// Matches a standalone 4-digit year token (1900–2099)
fn year_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("year regex"))
}

/// Normalize a title into index search form: `:`, `/` and `|` become
/// spaces, runs of whitespace collapse to one space, ends trimmed.
pub fn normalize_title(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            ':' | '/' | '|' => ' ',
            other => other,
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the ordered candidate query set for one media item.
///
/// Priority order: base title; base title + year; each alternate title;
/// each alternate + year. A second pass appends every already-built query
/// with any year token stripped, but only when the stripped form is
/// non-empty and new. Exact-string dedup keeps the first occurrence.
///
/// Deterministic and idempotent; empty title yields an empty set.
pub fn build_queries(metadata: &MediaMetadata) -> Vec<String> {
    let mut queries: Vec<String> = Vec::new();

    let base = normalize_title(&metadata.title);
    if base.is_empty() {
        return queries;
    }

    let push = |q: String, queries: &mut Vec<String>| {
        if !q.is_empty() && !queries.contains(&q) {
            queries.push(q);
        }
    };

    push(base.clone(), &mut queries);
    if let Some(year) = metadata.year {
        push(format!("{} {}", base, year), &mut queries);
    }

    for alt in &metadata.alternate_titles {
        let alt = normalize_title(alt);
        if alt.is_empty() {
            continue;
        }
        push(alt.clone(), &mut queries);
        if let Some(year) = metadata.year {
            push(format!("{} {}", alt, year), &mut queries);
        }
    }

    // Year-stripped second pass: some index entries omit the year entirely.
    let stripped: Vec<String> = queries
        .iter()
        .map(|q| strip_year(q))
        .filter(|s| !s.is_empty())
        .collect();
    for s in stripped {
        push(s, &mut queries);
    }

    queries
}

/// Remove any standalone 4-digit year token and re-collapse whitespace
pub fn strip_year(query: &str) -> String {
    let without = year_token_re().replace_all(query, " ");
    without.split_whitespace().collect::<Vec<_>>().join(" ")
}
