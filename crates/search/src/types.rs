use postsearch_store::Post;
use serde::Serialize;

/// A neighbor joined with its stored post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostMatch {
    /// Identifier of the matched post
    pub id: String,

    /// Distance to the query, rounded to 2 decimals
    pub distance: f64,

    /// Post information associated with the match
    pub post: Post,
}

impl PostMatch {
    pub fn new(id: impl Into<String>, distance: f64, post: Post) -> Self {
        Self {
            id: id.into(),
            distance: round2(distance),
            post,
        }
    }
}

/// Outcome of one search, closest match first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    #[serde(rename = "latency")]
    latency_ms: f64,
    num_matches: usize,
    matches: Vec<PostMatch>,
}

impl SearchResult {
    pub fn new(latency_ms: f64, matches: Vec<PostMatch>) -> Self {
        Self {
            latency_ms: round2(latency_ms),
            num_matches: matches.len(),
            matches,
        }
    }

    /// Wall-clock time of the search in milliseconds, 2 decimals
    pub fn latency_ms(&self) -> f64 {
        self.latency_ms
    }

    pub fn num_matches(&self) -> usize {
        self.num_matches
    }

    pub fn matches(&self) -> &[PostMatch] {
        &self.matches
    }
}

/// Round to 2 decimal places, halves away from zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
