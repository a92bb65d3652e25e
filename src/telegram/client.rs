//! HTTP client for the Telegram Bot API `sendMessage` call.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::config::{TelegramConfig, TelegramCredentials};
use crate::relay::FormattedMessage;

use super::types::{DeliveryOutcome, ParseMode, SendMessageRequest, TelegramResponse};

/// Stateless sender; one instance is shared by all requests.
///
/// The bot token is supplied per call and never stored or logged.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: Client,
    api_base_url: String,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn send_message_url(&self, token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base_url, token)
    }

    /// POST `message` to the configured chat. Sends exactly one request.
    pub async fn deliver(
        &self,
        message: &FormattedMessage,
        credentials: &TelegramCredentials,
    ) -> DeliveryOutcome {
        let req = SendMessageRequest {
            chat_id: &credentials.chat_id,
            text: message.as_str(),
            parse_mode: ParseMode::Markdown,
        };

        debug!(
            chat_id = %credentials.chat_id,
            chars = message.char_count(),
            "sending message"
        );

        let resp = match self
            .http
            .post(self.send_message_url(&credentials.token))
            .json(&req)
            .send()
            .await
        {
            Ok(resp) => resp,
            // The URL embeds the token
            Err(e) => return DeliveryOutcome::TransportFailure(e.without_url().to_string()),
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    status = status.as_u16(),
                    error = %e.without_url(),
                    "failed to read response body"
                );
                String::new()
            }
        };

        if !status.is_success() {
            let description = serde_json::from_str::<TelegramResponse>(&body)
                .ok()
                .and_then(|r| r.description);
            debug!(
                status = status.as_u16(),
                description = ?description,
                body = %body,
                "sendMessage rejected"
            );
            return DeliveryOutcome::RemoteRejected {
                status: status.as_u16(),
                body,
            };
        }

        // The echoed message carries raw credentials, so only the id is logged
        let response = serde_json::from_str::<serde_json::Value>(&body).ok();
        let message_id = response
            .as_ref()
            .and_then(|r| r.pointer("/result/message_id"))
            .and_then(serde_json::Value::as_i64);
        debug!(status = status.as_u16(), message_id = ?message_id, "sendMessage accepted");

        DeliveryOutcome::Delivered { response }
    }
}
