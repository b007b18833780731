use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use postsearch_common::SearchError;
use tracing::{error, warn};

use crate::types::ErrorResponse;

/// Adapter turning a `SearchError` into an HTTP response.
///
/// Client errors carry their message; server-side failures get a generic
/// body and are logged with the full cause.
#[derive(Debug)]
pub struct ApiError(pub SearchError);

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match &self.0 {
            err if err.is_client_error() => {
                warn!("Rejected request: {}", err);
                err.to_string()
            }
            err @ SearchError::DeadlineExceeded(_) => {
                error!("Search failed: {}", err);
                "Search timed out".to_string()
            }
            err => {
                error!("Search failed: {}", err);
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse { detail })
    }
}
