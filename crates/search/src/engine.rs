use postsearch_common::{AppConfig, Result, SearchError};
use postsearch_embedding::{Embedder, VertexEmbeddingClient};
use postsearch_store::{MetadataStore, Post, RedisPostStore};
use postsearch_vector::{MatchingEngineClient, Neighbor, NeighborIndex};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::retry::RetryPolicy;
use crate::types::{PostMatch, SearchResult};

/// Shortest query accepted by `search`, in characters
pub const MIN_QUERY_LENGTH: usize = 3;

/// Retry and deadline settings of the engine
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub retry: RetryPolicy,

    /// Bound on each upstream call (embed, index query, metadata fetch)
    pub upstream_timeout: Duration,

    /// Bound on one whole search including retries
    pub deadline: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            upstream_timeout: Duration::from_secs(2),
            deadline: Duration::from_secs(10),
        }
    }
}

impl SearchOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            retry: RetryPolicy::from_config(config),
            upstream_timeout: config.upstream_timeout(),
            deadline: config.search_deadline(),
        }
    }
}

/// Semantic post search: embed, find neighbors, join metadata
///
/// Clients are shared handles; one engine serves any number of concurrent
/// searches.
pub struct SearchEngine {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn NeighborIndex>,
    store: Arc<dyn MetadataStore>,
    options: SearchOptions,
}

impl SearchEngine {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn NeighborIndex>,
        store: Arc<dyn MetadataStore>,
        options: SearchOptions,
    ) -> Self {
        Self {
            embedder,
            index,
            store,
            options,
        }
    }

    /// Build the engine with the hosted model, the deployed index and Redis
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let timeout = config.upstream_timeout();

        let embedder = VertexEmbeddingClient::new(
            &config.model_api_base_url,
            &config.model_endpoint_resource,
            config.access_token.clone(),
            timeout,
        )?;
        let index = MatchingEngineClient::new(
            &config.index_api_base_url,
            &config.index_endpoint_resource,
            config.deployed_index_id.clone(),
            config.access_token.clone(),
            timeout,
        )?;
        let store = RedisPostStore::connect(&config.redis_url()).await?;

        Ok(Self::new(
            Arc::new(embedder),
            Arc::new(index),
            Arc::new(store),
            SearchOptions::from_config(config),
        ))
    }

    /// Search the `k` posts closest to `query`, closest first.
    ///
    /// Validation failures return `InvalidArgument` without touching any
    /// upstream. Everything after validation is retried as one unit under
    /// the retry policy and bounded by the overall deadline.
    pub async fn search(&self, query: &str, k: usize) -> Result<SearchResult> {
        validate(query, k)?;

        info!("Trying to match {} neighbors to text {:?}", k, query);
        let start = Instant::now();

        let attempts = self
            .options
            .retry
            .run(|attempt| self.search_once(query, k, attempt));
        let matches = tokio::time::timeout(self.options.deadline, attempts)
            .await
            .map_err(|_| SearchError::DeadlineExceeded(self.options.deadline))??;

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        let result = SearchResult::new(latency_ms, matches);
        info!(
            "Search completed - {} matches in {} ms",
            result.num_matches(),
            result.latency_ms()
        );

        Ok(result)
    }

    async fn search_once(&self, query: &str, k: usize, attempt: u32) -> Result<Vec<PostMatch>> {
        debug!("Search attempt {}", attempt);

        let embedding = self.bounded("embedding", self.embedder.embed(query)).await?;
        if embedding.is_empty() {
            return Err(SearchError::invalid_response(format!(
                "There is a problem getting embedding for text {:?}",
                query
            )));
        }
        debug!("Resulting embedding dimension: {}", embedding.len());

        let neighbors = self.bounded("vector search", self.index.query(&embedding, k)).await?;
        debug!("Found {} match neighbors", neighbors.len());

        let ids: Vec<String> = neighbors.iter().map(|n| n.id.clone()).collect();
        let posts = self.bounded("metadata fetch", self.store.fetch_many(&ids)).await?;

        join_posts(neighbors, posts)
    }

    /// Apply the per-call timeout; an elapsed call counts as unavailable
    async fn bounded<T, F>(&self, stage: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.options.upstream_timeout, call)
            .await
            .map_err(|_| {
                SearchError::upstream(format!(
                    "{} timed out after {:?}",
                    stage, self.options.upstream_timeout
                ))
            })?
    }
}

fn validate(query: &str, k: usize) -> Result<()> {
    if query.is_empty() {
        return Err(SearchError::invalid_argument("Cannot match empty text"));
    }
    if query.chars().count() < MIN_QUERY_LENGTH {
        return Err(SearchError::invalid_argument(format!(
            "Query must be at least {} characters",
            MIN_QUERY_LENGTH
        )));
    }
    if k == 0 {
        return Err(SearchError::invalid_argument(
            "Number of neighbors must be greater than 0",
        ));
    }
    Ok(())
}

/// Pair neighbors and posts by position; the store keeps request order.
///
/// A neighbor without a stored post fails the whole search.
fn join_posts(neighbors: Vec<Neighbor>, posts: Vec<Option<Post>>) -> Result<Vec<PostMatch>> {
    if neighbors.len() != posts.len() {
        return Err(SearchError::invalid_response(format!(
            "Metadata store returned {} records for {} neighbors",
            posts.len(),
            neighbors.len()
        )));
    }

    neighbors
        .into_iter()
        .zip(posts)
        .map(|(neighbor, post)| match post {
            Some(post) => Ok(PostMatch::new(neighbor.id, neighbor.distance, post)),
            None => Err(SearchError::invalid_response(format!(
                "No metadata record for post {}",
                neighbor.id
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use postsearch_embedding::Embedding;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Fails the first `failures` calls, then returns `embedding`
    struct FakeEmbedder {
        embedding: Embedding,
        failures: u32,
        calls: AtomicU32,
    }

    impl FakeEmbedder {
        fn new(embedding: Embedding, failures: u32) -> Self {
            Self {
                embedding,
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
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

    struct FakeIndex {
        neighbors: Vec<Neighbor>,
        seen: Mutex<Vec<(Embedding, usize)>>,
    }

    impl FakeIndex {
        fn new(neighbors: Vec<Neighbor>) -> Self {
            Self {
                neighbors,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl NeighborIndex for FakeIndex {
        async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<Neighbor>> {
            self.seen.lock().unwrap().push((embedding.to_vec(), k));
            Ok(self.neighbors.iter().take(k).cloned().collect())
        }
    }

    struct FakeStore {
        posts: HashMap<String, Post>,
        calls: AtomicU32,
    }

    impl FakeStore {
        fn new(posts: Vec<(&str, Post)>) -> Self {
            Self {
                posts: posts.into_iter().map(|(id, p)| (id.to_string(), p)).collect(),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl MetadataStore for FakeStore {
        async fn fetch_many(&self, ids: &[String]) -> Result<Vec<Option<Post>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ids.iter().map(|id| self.posts.get(id).cloned()).collect())
        }
    }

    /// Never answers; used to exercise timeouts
    struct HangingStore;

    #[async_trait]
    impl MetadataStore for HangingStore {
        async fn fetch_many(&self, _ids: &[String]) -> Result<Vec<Option<Post>>> {
            std::future::pending().await
        }
    }

    fn post(title: &str) -> Post {
        Post::new(title, format!("{} body", title), vec!["rust".to_string()])
    }

    fn engine(
        embedder: Arc<FakeEmbedder>,
        index: Arc<FakeIndex>,
        store: Arc<dyn MetadataStore>,
    ) -> SearchEngine {
        SearchEngine::new(embedder, index, store, SearchOptions::default())
    }

    #[tokio::test]
    async fn test_end_to_end_single_match() {
        let embedder = Arc::new(FakeEmbedder::new(vec![1.0, 2.0, 3.0], 0));
        let index = Arc::new(FakeIndex::new(vec![Neighbor::new("1", 0.8)]));
        let store = Arc::new(FakeStore::new(vec![(
            "1",
            Post::new("test_title", "test_body", vec!["redis".into(), "python".into()]),
        )]));

        let result = engine(embedder, index.clone(), store)
            .search("test", 1)
            .await
            .unwrap();

        assert_eq!(result.num_matches(), 1);
        assert_eq!(
            result.matches(),
            &[PostMatch::new(
                "1",
                0.8,
                Post::new("test_title", "test_body", vec!["redis".into(), "python".into()])
            )]
        );
        assert!(result.latency_ms() >= 0.0);
        assert_eq!(index.seen.lock().unwrap()[0], (vec![1.0, 2.0, 3.0], 1));
    }

    #[tokio::test]
    async fn test_preserves_index_order_and_rounds() {
        let embedder = Arc::new(FakeEmbedder::new(vec![0.5], 0));
        let index = Arc::new(FakeIndex::new(vec![
            Neighbor::new("c", 0.1234),
            Neighbor::new("a", 0.5551),
            Neighbor::new("b", 0.5551),
            Neighbor::new("d", 0.9),
        ]));
        // Insertion order of the store is unrelated to the neighbor order
        let store = Arc::new(FakeStore::new(vec![
            ("a", post("A")),
            ("b", post("B")),
            ("d", post("D")),
            ("c", post("C")),
        ]));

        let result = engine(embedder, index, store)
            .search("ordering", 40)
            .await
            .unwrap();

        let got: Vec<(&str, f64, &str)> = result
            .matches()
            .iter()
            .map(|m| (m.id.as_str(), m.distance, m.post.title.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![("c", 0.12, "C"), ("a", 0.56, "A"), ("b", 0.56, "B"), ("d", 0.9, "D")]
        );
        assert_eq!(result.num_matches(), result.matches().len());
    }

    #[tokio::test]
    async fn test_no_neighbors_is_empty_result() {
        let embedder = Arc::new(FakeEmbedder::new(vec![0.5], 0));
        let index = Arc::new(FakeIndex::new(vec![]));
        let store = Arc::new(FakeStore::new(vec![]));

        let result = engine(embedder, index, store).search("nothing", 5).await.unwrap();
        assert_eq!(result.num_matches(), 0);
        assert!(result.matches().is_empty());
    }

    #[tokio::test]
    async fn test_validation_never_reaches_upstreams() {
        let embedder = Arc::new(FakeEmbedder::new(vec![1.0], 0));
        let index = Arc::new(FakeIndex::new(vec![Neighbor::new("1", 0.1)]));
        let store = Arc::new(FakeStore::new(vec![("1", post("one"))]));
        let engine = engine(embedder.clone(), index.clone(), store.clone());

        for (query, k) in [("", 10), ("ab", 10), ("valid query", 0)] {
            let err = engine.search(query, k).await.unwrap_err();
            assert!(
                matches!(err, SearchError::InvalidArgument(_)),
                "{:?} {}",
                query,
                k
            );
        }

        assert_eq!(embedder.calls(), 0);
        assert_eq!(index.calls(), 0);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_multibyte_query_length_counts_characters() {
        let embedder = Arc::new(FakeEmbedder::new(vec![1.0], 0));
        let index = Arc::new(FakeIndex::new(vec![]));
        let store = Arc::new(FakeStore::new(vec![]));

        // 3 characters, 9 bytes
        let result = engine(embedder, index, store).search("검색어", 1).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_retry_recovers_on_fifth_attempt() {
        let embedder = Arc::new(FakeEmbedder::new(vec![1.0], 4));
        let index = Arc::new(FakeIndex::new(vec![Neighbor::new("1", 0.25)]));
        let store = Arc::new(FakeStore::new(vec![("1", post("one"))]));

        let result = engine(embedder.clone(), index.clone(), store)
            .search("flaky model", 1)
            .await
            .unwrap();

        assert_eq!(result.num_matches(), 1);
        assert_eq!(embedder.calls(), 5);
        assert_eq!(index.calls(), 1);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_five_attempts() {
        let embedder = Arc::new(FakeEmbedder::new(vec![1.0], u32::MAX));
        let index = Arc::new(FakeIndex::new(vec![Neighbor::new("1", 0.25)]));
        let store = Arc::new(FakeStore::new(vec![("1", post("one"))]));

        let err = engine(embedder.clone(), index.clone(), store)
            .search("dead model", 1)
            .await
            .unwrap_err();

        match err {
            SearchError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 5);
                assert!(matches!(*last, SearchError::UpstreamUnavailable(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(embedder.calls(), 5);
        assert_eq!(index.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_metadata_fails_whole_search() {
        let embedder = Arc::new(FakeEmbedder::new(vec![1.0], 0));
        let index = Arc::new(FakeIndex::new(vec![
            Neighbor::new("1", 0.1),
            Neighbor::new("ghost", 0.2),
        ]));
        let store = Arc::new(FakeStore::new(vec![("1", post("one"))]));

        let err = engine(embedder.clone(), index, store.clone())
            .search("partial", 2)
            .await
            .unwrap_err();

        // retried as a whole, then reported with the missing id
        match err {
            SearchError::RetriesExhausted { last, .. } => {
                assert!(last.to_string().contains("ghost"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(embedder.calls(), 5);
        assert_eq!(store.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_missing_metadata_not_retried_when_configured() {
        let embedder = Arc::new(FakeEmbedder::new(vec![1.0], 0));
        let index = Arc::new(FakeIndex::new(vec![Neighbor::new("ghost", 0.2)]));
        let store = Arc::new(FakeStore::new(vec![]));
        let options = SearchOptions {
            retry: RetryPolicy {
                retry_invalid_responses: false,
                ..RetryPolicy::default()
            },
            ..SearchOptions::default()
        };

        let err = SearchEngine::new(embedder.clone(), index, store, options)
            .search("partial", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::InvalidResponse(_)));
        assert_eq!(embedder.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_upstream_hits_call_timeout_then_deadline() {
        let embedder = Arc::new(FakeEmbedder::new(vec![1.0], 0));
        let index = Arc::new(FakeIndex::new(vec![Neighbor::new("1", 0.1)]));
        let options = SearchOptions {
            retry: RetryPolicy::default(),
            upstream_timeout: Duration::from_millis(100),
            deadline: Duration::from_millis(250),
        };

        let err = SearchEngine::new(embedder.clone(), index, Arc::new(HangingStore), options)
            .search("slow store", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::DeadlineExceeded(_)));
        // 100 ms per attempt: the third attempt is cut by the deadline
        assert_eq!(embedder.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_upstream_exhausts_retries_within_deadline() {
        let embedder = Arc::new(FakeEmbedder::new(vec![1.0], 0));
        let index = Arc::new(FakeIndex::new(vec![Neighbor::new("1", 0.1)]));
        let options = SearchOptions {
            retry: RetryPolicy {
                max_attempts: 2,
                ..RetryPolicy::default()
            },
            upstream_timeout: Duration::from_millis(100),
            deadline: Duration::from_secs(10),
        };

        let err = SearchEngine::new(embedder, index, Arc::new(HangingStore), options)
            .search("slow store", 1)
            .await
            .unwrap_err();

        match err {
            SearchError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(last.to_string().contains("metadata fetch timed out"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_join_posts_length_mismatch() {
        let err = join_posts(vec![Neighbor::new("1", 0.1)], vec![]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidResponse(_)));
    }
}
