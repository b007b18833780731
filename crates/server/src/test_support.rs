//! In-memory upstreams for route tests

use async_trait::async_trait;
use postsearch_common::{AppConfig, Result, SearchError};
use postsearch_embedding::{Embedder, Embedding};
use postsearch_search::{SearchEngine, SearchOptions};
use postsearch_store::{MetadataStore, Post};
use postsearch_vector::{Neighbor, NeighborIndex};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::state::AppState;
use crate::suggestions::Suggestions;

pub struct FakeEmbedder {
    embedding: Embedding,
    failures: u32,
    calls: AtomicU32,
}

impl FakeEmbedder {
    pub fn new(embedding: Embedding, failures: u32) -> Self {
        Self {
            embedding,
            failures,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            return Err(SearchError::upstream("model endpoint unavailable"));
        }
        Ok(self.embedding.clone())
    }
}

struct FixedIndex;

#[async_trait]
impl NeighborIndex for FixedIndex {
    async fn query(&self, _embedding: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        Ok(vec![Neighbor::new("1", 0.8), Neighbor::new("2", 0.9123)]
            .into_iter()
            .take(k)
            .collect())
    }
}

struct FixedStore;

#[async_trait]
impl MetadataStore for FixedStore {
    async fn fetch_many(&self, ids: &[String]) -> Result<Vec<Option<Post>>> {
        Ok(ids
            .iter()
            .map(|id| match id.as_str() {
                "1" => Some(Post::new(
                    "test_title",
                    "test_body",
                    vec!["redis".into(), "python".into()],
                )),
                "2" => Some(Post::new("second", "second body", vec!["rust".into()])),
                _ => None,
            })
            .collect())
    }
}

pub fn test_state_with(embedder: Arc<FakeEmbedder>) -> Arc<AppState> {
    let engine = SearchEngine::new(
        embedder,
        Arc::new(FixedIndex),
        Arc::new(FixedStore),
        SearchOptions::default(),
    );
    let suggestions = Suggestions::new(vec![
        "How to merge two dicts in python?".to_string(),
        "Why is my redis pipeline slow?".to_string(),
    ]);

    Arc::new(AppState::new(AppConfig::default(), engine, suggestions))
}

pub fn test_state(embedding: Embedding, failures: u32) -> Arc<AppState> {
    test_state_with(Arc::new(FakeEmbedder::new(embedding, failures)))
}
