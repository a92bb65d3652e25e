mod settings;

pub use settings::{
    LogConfig, LogFormat, MissingConfig, OtelConfig, ServerConfig, Settings, TelegramConfig,
    TelegramCredentials, CHAT_ID_VAR, TOKEN_VAR,
};
