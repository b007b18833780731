use async_trait::async_trait;
use postsearch_common::Result;

use crate::types::Neighbor;

/// Nearest-neighbor search over stored embeddings
#[async_trait]
pub trait NeighborIndex: Send + Sync {
    /// Return up to `k` neighbors of `embedding`, closest first.
    ///
    /// The order is the upstream service's (ascending distance) and is not
    /// re-sorted. `k == 0` fails with `InvalidArgument` before any call.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}
