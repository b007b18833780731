use async_trait::async_trait;
use postsearch_common::Result;

use crate::types::Embedding;

/// Text to vector conversion
///
/// Implementations must reject empty text with `InvalidArgument` before any
/// network call, fail with `UpstreamUnavailable` when the model cannot be
/// reached and with `InvalidResponse` when it returns no usable vector.
/// They do not retry.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Embedding>;
}
