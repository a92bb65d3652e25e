//! Delivery of formatted messages to a Telegram chat.

mod client;
mod types;

pub use client::TelegramClient;
pub use types::{DeliveryOutcome, ParseMode, SendMessageRequest, TelegramResponse};
