use std::env;

use serde::{Deserialize, Serialize};

use self::animation::AnimationConfig;
use self::api::ApiConfig;
use self::ui::UiConfig;

pub mod animation;
pub mod api;
pub mod ui;

fn default_delta_time() -> u64 {
    50
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub animation: AnimationConfig,
    pub ui: UiConfig,

    /// UI redraw interval in milliseconds
    #[serde(default = "default_delta_time")]
    pub delta_time: u64,
    /// Number of animation loops per diagram, unlimited when unset
    pub max_loops: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            animation: AnimationConfig::default(),
            ui: UiConfig::default(),
            delta_time: default_delta_time(),
            max_loops: None,
        }
    }
}

impl Config {
    pub fn apply_env(&mut self) {
        self.api.apply_env();

        self.delta_time = env::var("DELTA_TIME_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.delta_time);

        self.animation.stroke_duration_ms = env::var("KAKIJUN_STROKE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.animation.stroke_duration_ms);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.api.base_url.clone()));
        }

        if self.animation.stroke_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration("animation.stroke_duration_ms"));
        }

        if self.animation.frame_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("animation.frame_interval_ms"));
        }

        if self.delta_time == 0 {
            return Err(ConfigError::ZeroDuration("delta_time"));
        }

        if self.max_loops == Some(0) {
            return Err(ConfigError::ZeroLoops);
        }

        if self.animation.stroke_width <= 0.0 {
            return Err(ConfigError::InvalidStrokeWidth(self.animation.stroke_width));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API base URL must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("max_loops must be at least 1, leave it unset to loop forever")]
    ZeroLoops,

    #[error("Stroke width must be positive, got {0}")]
    InvalidStrokeWidth(f64),
}
