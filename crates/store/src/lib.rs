//! Post Search Metadata Store
//!
//! Per-document fields (title, body, tags) kept as Redis hashes keyed by
//! document id, fetched in one pipelined round trip per search.

mod redis_store;
mod store;
mod types;

pub use redis_store::RedisPostStore;
pub use store::MetadataStore;
pub use types::{decode_tags, encode_tags, Post, PostRecord, TAG_DELIMITER};
