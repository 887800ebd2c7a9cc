use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_stroke_duration_ms() -> u64 {
    1000
}

fn default_stroke_pause_ms() -> u64 {
    250
}

fn default_loop_pause_ms() -> u64 {
    1500
}

fn default_frame_interval_ms() -> u64 {
    33
}

fn default_stroke_width() -> f64 {
    3.0
}

/// Stroke-order animation pacing
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Time to draw one stroke
    #[serde(default = "default_stroke_duration_ms")]
    pub stroke_duration_ms: u64,
    /// Pause after each stroke
    #[serde(default = "default_stroke_pause_ms")]
    pub stroke_pause_ms: u64,
    /// Pause after the last stroke, before the diagram resets
    #[serde(default = "default_loop_pause_ms")]
    pub loop_pause_ms: u64,
    /// Time between two dash-offset updates
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Stroke width in SVG user units
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            stroke_duration_ms: default_stroke_duration_ms(),
            stroke_pause_ms: default_stroke_pause_ms(),
            loop_pause_ms: default_loop_pause_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            stroke_width: default_stroke_width(),
        }
    }
}

impl AnimationConfig {
    pub fn stroke_duration(&self) -> Duration {
        Duration::from_millis(self.stroke_duration_ms)
    }

    pub fn stroke_pause(&self) -> Duration {
        Duration::from_millis(self.stroke_pause_ms)
    }

    pub fn loop_pause(&self) -> Duration {
        Duration::from_millis(self.loop_pause_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}
