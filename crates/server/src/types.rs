use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /search` query string
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search query text
    pub query: String,
}

/// Error body, `{"detail": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// `GET /` deployment identity
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub revision: String,
    pub started_at: DateTime<Utc>,
}
