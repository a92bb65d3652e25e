use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelayError;

/// Parse mode requested for outgoing text. Legacy `Markdown` matches the
/// escaper's metacharacter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    Markdown,
}

/// Body of a `sendMessage` call.
#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: ParseMode,
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct TelegramResponse {
    #[serde(default)]
    pub description: Option<String>,
}

/// Result of one `sendMessage` attempt.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// Accepted by the API. Carries the parsed response body when it was JSON.
    Delivered { response: Option<Value> },
    /// No response was obtained.
    TransportFailure(String),
    /// The API answered with a non-success status.
    RemoteRejected { status: u16, body: String },
}

impl DeliveryOutcome {
    /// Split into the delivered response or the error to report.
    pub fn into_result(self) -> Result<Option<Value>, RelayError> {
        match self {
            DeliveryOutcome::Delivered { response } => Ok(response),
            DeliveryOutcome::TransportFailure(detail) => Err(RelayError::TransportFailure(detail)),
            DeliveryOutcome::RemoteRejected { status, body } => {
                Err(RelayError::RemoteRejected { status, body })
            }
        }
    }
}
