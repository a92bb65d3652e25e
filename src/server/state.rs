use std::sync::Arc;

use crate::config::Settings;
use crate::telegram::TelegramClient;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub telegram: Arc<TelegramClient>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, reqwest::Error> {
        let telegram = Arc::new(TelegramClient::new(&settings.telegram)?);

        Ok(Self {
            settings: Arc::new(settings),
            telegram,
        })
    }
}
