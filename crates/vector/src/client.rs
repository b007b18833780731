use async_trait::async_trait;
use postsearch_common::{Result, SearchError};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::index::NeighborIndex;
use crate::types::{
    FindNeighborsRequest, FindNeighborsResponse, IndexDatapoint, Neighbor, NeighborQuery,
};

/// Client for a deployed nearest-neighbor index (`:findNeighbors`)
#[derive(Debug, Clone)]
pub struct MatchingEngineClient {
    find_neighbors_url: String,
    deployed_index_id: String,
    access_token: Option<String>,
    client: Client,
}

impl MatchingEngineClient {
    /// Create new index client
    ///
    /// `index_endpoint_resource` is e.g.
    /// "projects/123/locations/us-central1/indexEndpoints/789".
    pub fn new(
        base_url: &str,
        index_endpoint_resource: &str,
        deployed_index_id: impl Into<String>,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::config(format!("Failed to create HTTP client: {}", e)))?;

        let find_neighbors_url = format!(
            "{}/{}:findNeighbors",
            base_url.trim_end_matches('/'),
            index_endpoint_resource.trim_matches('/')
        );
        let deployed_index_id = deployed_index_id.into();
        info!(
            "Connected to index endpoint: {} (deployed index {})",
            find_neighbors_url, deployed_index_id
        );

        Ok(Self {
            find_neighbors_url,
            deployed_index_id,
            access_token,
            client,
        })
    }

    fn build_request(&self, embedding: &[f32], k: usize) -> FindNeighborsRequest {
        FindNeighborsRequest {
            deployed_index_id: self.deployed_index_id.clone(),
            queries: vec![NeighborQuery {
                datapoint: IndexDatapoint {
                    datapoint_id: "0".to_string(),
                    feature_vector: embedding.to_vec(),
                },
                neighbor_count: k,
            }],
        }
    }

    async fn find_neighbors(&self, request: &FindNeighborsRequest) -> Result<FindNeighborsResponse> {
        let mut builder = self.client.post(&self.find_neighbors_url).json(request);
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SearchError::upstream(format!("Failed to send findNeighbors request: {}", e)))?
            .error_for_status()
            .map_err(|e| SearchError::upstream(format!("Index endpoint error: {}", e)))?;

        let body = response.bytes().await.map_err(|e| {
            SearchError::upstream(format!("Failed to read findNeighbors response: {}", e))
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            SearchError::invalid_response(format!("Failed to parse findNeighbors response: {}", e))
        })
    }
}

#[async_trait]
impl NeighborIndex for MatchingEngineClient {
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(SearchError::invalid_argument(
                "Number of neighbors must be greater than 0",
            ));
        }

        debug!("Performing vector search - k: {}, dimension: {}", k, embedding.len());
        let response = self.find_neighbors(&self.build_request(embedding, k)).await?;
        let neighbors = first_neighbor_list(response)?;
        debug!("Found {} match neighbors", neighbors.len());

        Ok(neighbors)
    }
}

/// Take the neighbor list of the only query, keeping the service's order.
///
/// Distances pass through as reported; dot-product indexes report negative
/// values for close vectors.
fn first_neighbor_list(response: FindNeighborsResponse) -> Result<Vec<Neighbor>> {
    let list = response
        .nearest_neighbors
        .into_iter()
        .next()
        .unwrap_or_default();

    let neighbors: Vec<Neighbor> = list.neighbors.into_iter().map(Neighbor::from).collect();
    if let Some(bad) = neighbors.iter().find(|n| n.id.is_empty()) {
        return Err(SearchError::invalid_response(format!(
            "Index returned an invalid neighbor: {:?}",
            bad
        )));
    }

    Ok(neighbors)
}
