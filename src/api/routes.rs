use axum::{
    routing::{any, get},
    Router,
};

use crate::relay::relay_submission;
use crate::server::AppState;

use super::health::health;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // The handler answers non-POST methods itself
        .nest(
            "/api/v1",
            Router::new().route("/submissions", any(relay_submission)),
        )
}
