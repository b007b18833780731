use postsearch_common::{Result, SearchError};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct SuggestionEntry {
    question: String,
}

/// Sample questions shown to users before they type
#[derive(Debug, Clone, Default)]
pub struct Suggestions {
    questions: Vec<String>,
}

impl Suggestions {
    pub fn new(questions: Vec<String>) -> Self {
        Self { questions }
    }

    /// Load `[{"question": "..."}, ...]` from `path`.
    ///
    /// A missing file gives an empty list; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Suggestions file not found: {}", path.display());
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)?;
        let entries: Vec<SuggestionEntry> = serde_json::from_str(&data).map_err(|e| {
            SearchError::config(format!(
                "Invalid suggestions file {}: {}",
                path.display(),
                e
            ))
        })?;

        info!("Loaded {} search suggestions", entries.len());
        Ok(Self::new(entries.into_iter().map(|e| e.question).collect()))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Draw `n` questions at random, with replacement
    pub fn sample(&self, n: usize) -> Vec<String> {
        if self.questions.is_empty() {
            return Vec::new();
        }
        (0..n)
            .map(|_| self.questions[fastrand::usize(..self.questions.len())].clone())
            .collect()
    }
}
