use actix_web::{get, web, HttpResponse};

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::SearchParams;

/// Number of suggestions returned per request
const SUGGESTION_COUNT: usize = 3;

/// Semantic search over posts
#[get("/search")]
pub async fn search(
    params: web::Query<SearchParams>,
    state: web::Data<std::sync::Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let result = state
        .engine
        .search(&params.query, state.config.num_neighbors)
        .await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Random sample questions
#[get("/search/suggestions")]
pub async fn suggestions(
    state: web::Data<std::sync::Arc<AppState>>,
) -> actix_web::Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.suggestions.sample(SUGGESTION_COUNT)))
}
