use async_trait::async_trait;
use postsearch_common::{Result, SearchError};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::embedder::Embedder;
use crate::types::{Embedding, PredictRequest, PredictResponse};

/// Client for a hosted embedding model exposing a `:predict` method
#[derive(Debug, Clone)]
pub struct VertexEmbeddingClient {
    predict_url: String,
    access_token: Option<String>,
    client: Client,
}

impl VertexEmbeddingClient {
    /// Create new embedding client
    ///
    /// `endpoint_resource` is the fully-qualified endpoint name, e.g.
    /// "projects/123/locations/us-central1/endpoints/456".
    pub fn new(
        base_url: &str,
        endpoint_resource: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::config(format!("Failed to create HTTP client: {}", e)))?;

        let predict_url = predict_url(base_url, endpoint_resource);
        info!("Connected to model endpoint: {}", predict_url);

        Ok(Self {
            predict_url,
            access_token,
            client,
        })
    }

    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse> {
        let mut builder = self.client.post(&self.predict_url).json(request);
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SearchError::upstream(format!("Failed to send predict request: {}", e)))?
            .error_for_status()
            .map_err(|e| SearchError::upstream(format!("Model endpoint error: {}", e)))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| SearchError::upstream(format!("Failed to read predict response: {}", e)))?;

        serde_json::from_slice(&body).map_err(|e| {
            SearchError::invalid_response(format!("Failed to parse predict response: {}", e))
        })
    }
}

#[async_trait]
impl Embedder for VertexEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        if text.is_empty() {
            return Err(SearchError::invalid_argument("Cannot embed empty text"));
        }

        debug!("Requesting embedding - Text length: {}", text.len());
        let response = self.predict(&PredictRequest::single(text)).await?;
        let embedding = first_embedding(response, text)?;
        debug!("Resulting embedding dimension: {}", embedding.len());

        Ok(embedding)
    }
}

fn predict_url(base_url: &str, endpoint_resource: &str) -> String {
    format!(
        "{}/{}:predict",
        base_url.trim_end_matches('/'),
        endpoint_resource.trim_matches('/')
    )
}

/// Take the only prediction out of a single-item batch
fn first_embedding(response: PredictResponse, text: &str) -> Result<Embedding> {
    match response.predictions.into_iter().next().flatten() {
        Some(embedding) if !embedding.is_empty() => Ok(embedding),
        _ => Err(SearchError::invalid_response(format!(
            "There is a problem getting embedding for text {:?}",
            text
        ))),
    }
}
