use std::env;
use std::fmt;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Environment variable holding the Telegram bot token.
pub const TOKEN_VAR: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the destination chat id.
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Largest accepted submission body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Upper bound on the rendered message, in characters
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    /// Outbound request timeout; `None` leaves the transport default in place
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

/// Bot token and chat id, both known to be present.
#[derive(Clone)]
pub struct TelegramCredentials {
    pub token: String,
    pub chat_id: String,
}

impl fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Names of the required configuration values that are absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingConfig(pub Vec<&'static str>);

impl fmt::Display for MissingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" or "))
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    64 * 1024
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_max_message_chars() -> usize {
    4096 // sendMessage text limit
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "submission-relay".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("telegram.api_base_url", default_api_base_url())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // RELAY_SERVER__PORT, RELAY_TELEGRAM__MAX_MESSAGE_CHARS, RELAY_OTEL__ENABLED, ...
            .add_source(
                Environment::with_prefix("RELAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            .set_override_option("telegram.token", env::var(TOKEN_VAR).ok())?
            .set_override_option("telegram.chat_id", env::var(CHAT_ID_VAR).ok())?;

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl TelegramConfig {
    /// Resolve the bot token and chat id, naming whichever is absent.
    ///
    /// Empty values count as absent.
    pub fn credentials(&self) -> Result<TelegramCredentials, MissingConfig> {
        let token = self.token.as_deref().filter(|t| !t.is_empty());
        let chat_id = self.chat_id.as_deref().filter(|c| !c.is_empty());

        match (token, chat_id) {
            (Some(token), Some(chat_id)) => Ok(TelegramCredentials {
                token: token.to_string(),
                chat_id: chat_id.to_string(),
            }),
            (token, chat_id) => {
                let mut missing = Vec::with_capacity(2);
                if token.is_none() {
                    missing.push(TOKEN_VAR);
                }
                if chat_id.is_none() {
                    missing.push(CHAT_ID_VAR);
                }
                Err(MissingConfig(missing))
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_ok()
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("api_base_url", &self.api_base_url)
            .field("max_message_chars", &self.max_message_chars)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            chat_id: None,
            api_base_url: default_api_base_url(),
            max_message_chars: default_max_message_chars(),
            timeout_seconds: None,
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}
