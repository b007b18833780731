use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "https://us-central1-aiplatform.googleapis.com/v1";

/// Post search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the prediction API hosting the embedding model
    pub model_api_base_url: String,

    /// Model endpoint resource, e.g. "projects/123/locations/us-central1/endpoints/456"
    pub model_endpoint_resource: String,

    /// Base URL of the matching (nearest-neighbor) API
    pub index_api_base_url: String,

    /// Index endpoint resource, e.g. "projects/123/locations/us-central1/indexEndpoints/789"
    pub index_endpoint_resource: String,

    /// Id of the index deployed on the index endpoint
    pub deployed_index_id: String,

    /// Bearer token for the model and index APIs
    #[serde(skip_serializing)]
    pub access_token: Option<String>,

    /// Metadata store host
    pub redis_host: String,

    /// Metadata store port
    pub redis_port: u16,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Neighbors requested per search
    pub num_neighbors: usize,

    /// Maximum attempts of the whole search pipeline
    pub max_attempts: u32,

    /// Pause between attempts in milliseconds
    pub retry_delay_ms: u64,

    /// Spend retries on malformed upstream answers too
    pub retry_invalid_responses: bool,

    /// Timeout for a single upstream call in milliseconds
    pub upstream_timeout_ms: u64,

    /// Timeout for one search including retries in milliseconds
    pub search_deadline_ms: u64,

    /// JSON file with search suggestions
    pub suggestions_path: PathBuf,

    /// Deployed service name
    pub service_name: String,

    /// Deployed service revision
    pub service_revision: String,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model_endpoint_resource: String::new(),
            index_api_base_url: DEFAULT_API_BASE_URL.to_string(),
            index_endpoint_resource: String::new(),
            deployed_index_id: String::new(),
            access_token: None,
            redis_host: "localhost".to_string(),
            redis_port: 6379,
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            num_neighbors: 40,
            max_attempts: 5,
            retry_delay_ms: 0,
            retry_invalid_responses: true,
            upstream_timeout_ms: 2_000,
            search_deadline_ms: 10_000,
            suggestions_path: PathBuf::from("search_suggestion.json"),
            service_name: "Unknown service".to_string(),
            service_revision: "Unknown revision".to_string(),
            log_dir: PathBuf::from("./log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, SearchError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SearchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);

        Ok(Self {
            model_api_base_url: string("MODEL_API_BASE_URL", defaults.model_api_base_url),
            model_endpoint_resource: string(
                "MODEL_ENDPOINT_RESOURCE",
                defaults.model_endpoint_resource,
            ),
            index_api_base_url: string("INDEX_API_BASE_URL", defaults.index_api_base_url),
            index_endpoint_resource: string(
                "INDEX_ENDPOINT_RESOURCE",
                defaults.index_endpoint_resource,
            ),
            deployed_index_id: string("DEPLOYED_INDEX_ID", defaults.deployed_index_id),
            access_token: lookup("GCP_ACCESS_TOKEN").filter(|t| !t.is_empty()),
            redis_host: string("REDIS_HOST", defaults.redis_host),
            redis_port: parse_var(&lookup, "REDIS_PORT", defaults.redis_port)?,
            server_host: string("SERVER_HOST", defaults.server_host),
            server_port: parse_var(&lookup, "SERVER_PORT", defaults.server_port)?,
            num_neighbors: parse_var(&lookup, "NUM_NEIGHBORS", defaults.num_neighbors)?,
            max_attempts: parse_var(&lookup, "SEARCH_MAX_ATTEMPTS", defaults.max_attempts)?,
            retry_delay_ms: parse_var(&lookup, "SEARCH_RETRY_DELAY_MS", defaults.retry_delay_ms)?,
            retry_invalid_responses: parse_var(
                &lookup,
                "SEARCH_RETRY_INVALID_RESPONSES",
                defaults.retry_invalid_responses,
            )?,
            upstream_timeout_ms: parse_var(
                &lookup,
                "UPSTREAM_TIMEOUT_MS",
                defaults.upstream_timeout_ms,
            )?,
            search_deadline_ms: parse_var(
                &lookup,
                "SEARCH_DEADLINE_MS",
                defaults.search_deadline_ms,
            )?,
            suggestions_path: lookup("SUGGESTIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.suggestions_path),
            service_name: string("K_SERVICE", defaults.service_name),
            service_revision: string("K_REVISION", defaults.service_revision),
            log_dir: lookup("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
            log_level: string("LOG_LEVEL", defaults.log_level),
        })
    }

    /// Redis connection URL (redis://host:port/)
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }

    pub fn search_deadline(&self) -> Duration {
        Duration::from_millis(self.search_deadline_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SearchError> {
        let required = [
            ("MODEL_ENDPOINT_RESOURCE", &self.model_endpoint_resource),
            ("INDEX_ENDPOINT_RESOURCE", &self.index_endpoint_resource),
            ("DEPLOYED_INDEX_ID", &self.deployed_index_id),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(SearchError::config(format!("{} must be set", key)));
            }
        }

        for (key, url) in [
            ("MODEL_API_BASE_URL", &self.model_api_base_url),
            ("INDEX_API_BASE_URL", &self.index_api_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SearchError::config(format!(
                    "{} must start with http:// or https://",
                    key
                )));
            }
        }

        if self.server_port == 0 {
            return Err(SearchError::config("Server port cannot be 0"));
        }
        if self.redis_port == 0 {
            return Err(SearchError::config("Redis port cannot be 0"));
        }
        if self.num_neighbors == 0 {
            return Err(SearchError::config("NUM_NEIGHBORS must be greater than 0"));
        }
        if self.max_attempts == 0 {
            return Err(SearchError::config("SEARCH_MAX_ATTEMPTS must be greater than 0"));
        }
        if self.upstream_timeout_ms == 0 || self.search_deadline_ms == 0 {
            return Err(SearchError::config("Timeouts must be greater than 0"));
        }

        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, SearchError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| SearchError::config(format!("Invalid value for {}: {:?}", key, raw))),
        None => Ok(default),
    }
}
