//! Post Search HTTP Server
//!
//! Actix-web facade over the search engine: `/search`, `/search/suggestions`
//! and a service identity endpoint at `/`.

pub mod error;
pub mod routes;
pub mod state;
pub mod suggestions;
pub mod types;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use postsearch_common::{AppConfig, Result};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use error::ApiError;
pub use state::AppState;
pub use suggestions::Suggestions;

/// Build shared state from `config` and serve until the process is stopped
pub async fn start_server(config: AppConfig) -> Result<()> {
    let bind_addr = config.server_bind_address();
    let state = Arc::new(AppState::from_config(config).await?);

    info!("Starting HTTP server on http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .configure(routes::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod test_support;
