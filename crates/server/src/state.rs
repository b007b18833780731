use chrono::{DateTime, Utc};
use postsearch_common::{AppConfig, Result};
use postsearch_search::SearchEngine;

use crate::suggestions::Suggestions;

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Search engine with its long-lived upstream clients
    pub engine: SearchEngine,

    /// Preloaded sample questions
    pub suggestions: Suggestions,

    /// Process start time
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, engine: SearchEngine, suggestions: Suggestions) -> Self {
        Self {
            config,
            engine,
            suggestions,
            started_at: Utc::now(),
        }
    }

    /// Connect all upstream clients and load suggestions
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let engine = SearchEngine::connect(&config).await?;
        let suggestions = Suggestions::load(&config.suggestions_path)?;

        Ok(Self::new(config, engine, suggestions))
    }
}
