use std::sync::Arc;

use anyhow::Context;
use kakijun_client::{HttpKanjiApi, KanjiApi, QueryDispatcher};
use kakijun_config::Config;
use kakijun_strokes::AnimationTiming;
use tokio::sync::RwLock;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub api: Arc<dyn KanjiApi>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let api = HttpKanjiApi::new(&config.api)
            .with_context(|| format!("Failed to set up API client for {}", config.api.base_url))?;

        Ok(Self::with_api(config, Arc::new(api)))
    }

    pub fn with_api(config: Config, api: Arc<dyn KanjiApi>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            api,
        }
    }

    pub fn dispatcher(&self) -> QueryDispatcher {
        QueryDispatcher::new(self.api.clone())
    }

    pub async fn animation_timing(&self) -> AnimationTiming {
        let config = self.config.read().await;
        AnimationTiming::from_config(&config.animation, config.max_loops)
    }
}
