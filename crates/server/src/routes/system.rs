use actix_web::{get, web, HttpResponse};

use crate::state::AppState;
use crate::types::ServiceInfo;

/// Deployment identity
#[get("/")]
pub async fn root(state: web::Data<std::sync::Arc<AppState>>) -> actix_web::Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ServiceInfo {
        service: state.config.service_name.clone(),
        revision: state.config.service_revision.clone(),
        started_at: state.started_at,
    }))
}
