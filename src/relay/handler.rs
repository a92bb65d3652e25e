//! Submission relay endpoint

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::Method,
};
use uuid::Uuid;

use crate::error::{RelayError, Result};
use crate::server::AppState;

use super::{format, redact, Submission};

/// Relay one submission to the Telegram chat.
///
/// Every path answers: `ok` once Telegram accepts the message, a
/// [`RelayError`] response otherwise. Method and configuration problems
/// and undecodable bodies are rejected before anything is sent.
#[tracing::instrument(
    name = "http.relay_submission",
    skip_all,
    fields(invocation_id = %Uuid::new_v4(), method = %method)
)]
pub async fn relay_submission(
    State(state): State<AppState>,
    method: Method,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<&'static str> {
    if method != Method::POST {
        return Err(RelayError::MethodNotAllowed);
    }

    let credentials = state
        .settings
        .telegram
        .credentials()
        .map_err(RelayError::ConfigurationMissing)?;

    // Read failures, including an exceeded body limit, only count once the
    // method and configuration have been accepted
    let body = body.map_err(|e| RelayError::InvalidInput(e.body_text()))?;

    let submission =
        Submission::from_body(&body).map_err(|e| RelayError::InvalidInput(e.to_string()))?;

    tracing::debug!(
        field_count = submission.len(),
        submission = %serde_json::to_string(&redact(&submission)).unwrap_or_default(),
        "Submission received"
    );

    let max_chars = state.settings.telegram.max_message_chars;
    let (message, truncated) = format(&submission).bounded(max_chars);
    if truncated {
        tracing::warn!(max_chars, "Message exceeded length bound and was truncated");
    }

    state
        .telegram
        .deliver(&message, &credentials)
        .await
        .into_result()?;

    tracing::info!("Submission relayed");
    Ok("ok")
}
