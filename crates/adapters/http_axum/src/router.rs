//! Axum router assembly.

use axum::Router;
use axum::http::Uri;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use haulhub_domain::error::{Entity, NotFoundError};

use crate::error::ApiError;
use crate::state::{AppState, Repositories};

/// Build the top-level axum [`Router`].
///
/// Serves the API under `/api` and a plain-text health check at `/health`.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem, and a permissive CORS layer
/// for browser clients.
pub fn build<R: Repositories>(state: AppState<R>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::Domain(
        NotFoundError {
            entity: Entity::Route,
            id: uri.path().to_string(),
        }
        .into(),
    )
}
