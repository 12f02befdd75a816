pub mod contact;
pub mod videos;

use axum::Router;
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(contact::routes())
        .merge(videos::routes())
}
