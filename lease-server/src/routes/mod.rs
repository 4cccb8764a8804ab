pub mod backups;
pub mod stores;

use crate::state::AppState;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/backups", backups::router(state.clone()))
        .nest("/api/stores", stores::router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs a blocking closure on the blocking pool, flattening join errors
/// into the handler's error type.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, crate::error::AppError>
where
    F: FnOnce() -> Result<T, crate::error::AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow::anyhow!(e))?
}
