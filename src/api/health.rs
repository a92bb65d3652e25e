//! Health check endpoint.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether both the bot token and chat id are set. Never echoes them.
    pub telegram_configured: bool,
    pub timestamp: DateTime<Utc>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let telegram_configured = state.settings.telegram.is_configured();

    Json(HealthResponse {
        status: if telegram_configured {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        telegram_configured,
        timestamp: Utc::now(),
    })
}
