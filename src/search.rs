//! Transcript Search Engine.
//!
//! Case-insensitive literal substring search over a project's
//! transcripts, returning bounded context-windowed snippets per video.
//! The query is escaped before compilation so user input is always a
//! literal, never a pattern. Results follow document insertion order;
//! relevance ranking is deliberately out of scope.

use std::sync::Arc;

use regex::RegexBuilder;
use serde::Serialize;

use crate::store::{ContentStore, Project, StoreError};

/// Hard cap on the number of matching videos returned per search.
pub const MAX_RESULTS: usize = 50;
/// Context characters kept on each side of a match.
pub const SNIPPET_RADIUS: usize = 50;
/// Snippets returned per video; `total_matches` still reports the truth.
pub const MATCHES_PER_VIDEO: usize = 5;

/// Matches found within a single transcript.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMatches {
    pub video_id: String,
    pub title: String,
    pub media_id: String,
    pub playback_url: String,
    /// At most [`MATCHES_PER_VIDEO`] context snippets.
    pub snippets: Vec<String>,
    /// True occurrence count, independent of the snippet cap.
    pub total_matches: usize,
}

/// A full search response for one project scope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub results: Vec<VideoMatches>,
    /// Transcripts scanned in scope, matched or not.
    pub total_videos: usize,
}

/// Scans transcripts fetched through the injected content store.
pub struct SearchEngine {
    store: Arc<dyn ContentStore>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Search a project's transcripts for literal occurrences of `query`.
    ///
    /// `limit` bounds the number of matching videos and is clamped to
    /// [`MAX_RESULTS`]. The empty query is rejected by the tool-argument
    /// validator before it reaches the engine.
    pub async fn search(
        &self,
        project: &Project,
        query: &str,
        limit: usize,
    ) -> Result<SearchResults, StoreError> {
        let limit = limit.clamp(1, MAX_RESULTS);
        let matcher = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
            .expect("escaped literal is a valid pattern");

        let transcripts = self.store.transcripts(&project.id).await?;
        let total_videos = transcripts.len();

        let mut results = Vec::new();
        for transcript in &transcripts {
            if results.len() == limit {
                break;
            }

            let mut snippets = Vec::new();
            let mut total_matches = 0;
            for found in matcher.find_iter(&transcript.text) {
                total_matches += 1;
                if snippets.len() < MATCHES_PER_VIDEO {
                    snippets.push(snippet(&transcript.text, found.start(), found.end()));
                }
            }
            if total_matches == 0 {
                continue;
            }

            results.push(VideoMatches {
                video_id: transcript.id.clone(),
                title: transcript.title.clone(),
                media_id: transcript.media_id.clone(),
                playback_url: transcript.playback_url.clone(),
                snippets,
                total_matches,
            });
        }

        Ok(SearchResults {
            results,
            total_videos,
        })
    }
}

/// Extract a context window around `text[start..end]`, trimming at
/// document boundaries and marking trimmed sides with an ellipsis.
/// Offsets are byte positions from the matcher; the window is measured
/// in characters so multi-byte text never splits.
fn snippet(text: &str, start: usize, end: usize) -> String {
    let before = &text[..start];
    let after = &text[end..];

    let from = before
        .char_indices()
        .rev()
        .nth(SNIPPET_RADIUS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let to = after
        .char_indices()
        .nth(SNIPPET_RADIUS)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    let mut out = String::new();
    if from > 0 {
        out.push_str("...");
    }
    out.push_str(&text[from..to]);
    if to < text.len() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Transcript};

    fn project() -> Project {
        Project {
            id: "p1".to_string(),
            owner_id: "user-1".to_string(),
            name: "Demo".to_string(),
            slug: "demo".to_string(),
        }
    }

    fn transcript(id: &str, text: &str) -> Transcript {
        Transcript {
            id: id.to_string(),
            project_id: "p1".to_string(),
            title: format!("Video {}", id),
            media_id: format!("media-{}", id),
            playback_url: format!("https://cdn.example/{}", id),
            text: text.to_string(),
        }
    }

    fn engine(store: MemoryStore) -> SearchEngine {
        SearchEngine::new(Arc::new(store))
    }

    #[tokio::test]
    async fn short_text_has_no_ellipsis() {
        let store = MemoryStore::new()
            .with_project(project())
            .with_transcript(transcript("t1", "the quick brown fox jumps"));

        let found = engine(store).search(&project(), "brown", 10).await.unwrap();
        assert_eq!(found.results.len(), 1);
        assert_eq!(found.results[0].total_matches, 1);
        let snip = &found.results[0].snippets[0];
        assert!(snip.contains("brown"));
        assert!(!snip.contains("..."));
        assert_eq!(snip, "the quick brown fox jumps");
    }

    #[tokio::test]
    async fn long_text_is_trimmed_with_ellipsis_on_both_sides() {
        let text = format!("{}needle{}", "a".repeat(200), "b".repeat(200));
        let store = MemoryStore::new()
            .with_project(project())
            .with_transcript(transcript("t1", &text));

        let found = engine(store).search(&project(), "needle", 10).await.unwrap();
        let snip = &found.results[0].snippets[0];
        assert!(snip.starts_with("..."));
        assert!(snip.ends_with("..."));
        // 50 context chars + match + 50 context chars + two markers.
        assert_eq!(snip.chars().count(), 3 + 50 + 6 + 50 + 3);
    }

    #[tokio::test]
    async fn snippet_cap_reports_true_total() {
        let text = "needle ".repeat(20);
        let store = MemoryStore::new()
            .with_project(project())
            .with_transcript(transcript("t1", &text));

        let found = engine(store).search(&project(), "needle", 10).await.unwrap();
        assert_eq!(found.results[0].snippets.len(), MATCHES_PER_VIDEO);
        assert_eq!(found.results[0].total_matches, 20);
    }

    #[tokio::test]
    async fn empty_project_is_empty_result_not_error() {
        let store = MemoryStore::new().with_project(project());

        let found = engine(store).search(&project(), "anything", 10).await.unwrap();
        assert!(found.results.is_empty());
        assert_eq!(found.total_videos, 0);
    }

    #[tokio::test]
    async fn query_is_matched_literally_and_case_insensitively() {
        let store = MemoryStore::new()
            .with_project(project())
            .with_transcript(transcript("t1", "Learn C++ (V2) fast"))
            .with_transcript(transcript("t2", "c plus plus version two"));

        let found = engine(store).search(&project(), "c++ (v2)", 10).await.unwrap();
        assert_eq!(found.results.len(), 1);
        assert_eq!(found.results[0].video_id, "t1");
        assert_eq!(found.total_videos, 2);
    }

    #[tokio::test]
    async fn limit_is_clamped_and_order_is_stable() {
        let mut store = MemoryStore::new().with_project(project());
        for i in 0..60 {
            store = store.with_transcript(transcript(&format!("t{:02}", i), "hit here"));
        }

        let found = engine(store).search(&project(), "hit", 500).await.unwrap();
        assert_eq!(found.results.len(), MAX_RESULTS);
        assert_eq!(found.total_videos, 60);
        assert_eq!(found.results[0].video_id, "t00");
        assert_eq!(found.results[49].video_id, "t49");
    }

    #[tokio::test]
    async fn multibyte_text_never_splits_characters() {
        let text = format!("{}züge{}", "é".repeat(80), "ß".repeat(80));
        let store = MemoryStore::new()
            .with_project(project())
            .with_transcript(transcript("t1", &text));

        let found = engine(store).search(&project(), "ZÜGE", 10).await.unwrap();
        let snip = &found.results[0].snippets[0];
        assert!(snip.contains("züge"));
        assert_eq!(snip.chars().count(), 3 + 50 + 4 + 50 + 3);
    }

    #[tokio::test]
    async fn occurrences_do_not_overlap() {
        let store = MemoryStore::new()
            .with_project(project())
            .with_transcript(transcript("t1", "aaaa"));

        let found = engine(store).search(&project(), "aa", 10).await.unwrap();
        assert_eq!(found.results[0].total_matches, 2);
    }
}
