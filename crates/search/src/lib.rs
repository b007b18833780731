//! Post Search Retrieval
//!
//! Composes embedding, nearest-neighbor lookup and metadata join into a
//! single retried `search(query, k)` call.

mod engine;
mod retry;
mod types;

pub use engine::{SearchEngine, SearchOptions, MIN_QUERY_LENGTH};
pub use retry::RetryPolicy;
pub use types::{PostMatch, SearchResult};
