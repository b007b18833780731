use async_trait::async_trait;
use postsearch_common::Result;

use crate::types::Post;

/// Batched key to document lookup
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Fetch the posts for `ids` in one round trip.
    ///
    /// The output has exactly one slot per input id, in the same position.
    /// A missing or incomplete record yields `None` in its slot; only a
    /// connection failure fails the whole batch (`UpstreamUnavailable`).
    async fn fetch_many(&self, ids: &[String]) -> Result<Vec<Option<Post>>>;
}
