pub mod search;
pub mod system;

use actix_web::web;
use postsearch_common::SearchError;

use crate::error::ApiError;

/// Register all routes and extractor settings
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError(SearchError::invalid_argument(err.to_string())).into()
    }))
    .service(search::suggestions)
    .service(search::search)
    .service(system::root);
}
