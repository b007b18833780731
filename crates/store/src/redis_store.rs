use async_trait::async_trait;
use postsearch_common::{Result, SearchError};
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::store::MetadataStore;
use crate::types::{Post, PostRecord};

/// Redis-backed post store
///
/// Holds a multiplexed, auto-reconnecting connection that is cheap to clone
/// and safe to share between concurrent searches.
#[derive(Clone)]
pub struct RedisPostStore {
    connection: ConnectionManager,
}

impl RedisPostStore {
    /// Connect to the store at `redis_url` (e.g. "redis://localhost:6379/")
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| SearchError::config(format!("Invalid redis url {}: {}", redis_url, e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| SearchError::upstream(format!("Failed to connect to redis: {}", e)))?;

        info!("Initialized redis client on {}", redis_url);
        Ok(Self { connection })
    }

    /// Write posts as hashes in a single pipelined round trip.
    ///
    /// Every record is encoded before anything is sent, so a bad tag leaves
    /// the store untouched.
    pub async fn store_many(&self, records: &[PostRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut pipe = redis::pipe();
        for record in records {
            let cmd = pipe.cmd("HSET").arg(&record.id);
            for (field, value) in record.post.to_fields()? {
                cmd.arg(field).arg(value);
            }
            cmd.ignore();
        }

        let mut con = self.connection.clone();
        pipe.query_async::<_, ()>(&mut con)
            .await
            .map_err(|e| SearchError::upstream(format!("Redis pipeline failed: {}", e)))?;

        debug!("Stored {} posts", records.len());
        Ok(records.len())
    }
}

#[async_trait]
impl MetadataStore for RedisPostStore {
    async fn fetch_many(&self, ids: &[String]) -> Result<Vec<Option<Post>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for id in ids {
            pipe.cmd("HGETALL").arg(id);
        }

        debug!("Executing redis pipeline for {} ids", ids.len());
        let mut con = self.connection.clone();
        // Raw values; each slot is decoded on its own
        let hashes: Vec<HashMap<String, Vec<u8>>> = pipe
            .query_async(&mut con)
            .await
            .map_err(|e| SearchError::upstream(format!("Redis pipeline failed: {}", e)))?;

        decode_slots(ids, hashes)
    }
}

/// Pipeline replies come back in command order; keep one slot per id.
fn decode_slots(
    ids: &[String],
    hashes: Vec<HashMap<String, Vec<u8>>>,
) -> Result<Vec<Option<Post>>> {
    if hashes.len() != ids.len() {
        return Err(SearchError::invalid_response(format!(
            "Redis returned {} replies for {} keys",
            hashes.len(),
            ids.len()
        )));
    }

    Ok(ids
        .iter()
        .zip(&hashes)
        .map(|(id, hash)| {
            let post = Post::from_fields(hash);
            if post.is_none() && !hash.is_empty() {
                warn!("Post {} has an incomplete or undecodable record", id);
            }
            post
        })
        .collect())
}
