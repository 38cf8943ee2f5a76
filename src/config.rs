//! Generation settings: provider endpoint, models, poll policy and limits.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{StoryflowError, StoryflowResult};

/// Environment variable holding the provider access credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Hard ceiling on requested video length, in seconds.
pub const MAX_VIDEO_SECONDS: u32 = 59;

/// Settings for the generation client. Every field has a default, so a config
/// file only needs the values it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of the Generative Language REST API.
    pub api_base_url: String,
    /// Model used for speech synthesis.
    pub tts_model: String,
    /// Model used for video jobs.
    pub video_model: String,
    /// Seconds between job status checks.
    pub poll_interval_secs: u64,
    /// Upper bound on status checks per job (`None` = unbounded).
    pub max_poll_attempts: Option<u32>,
    /// Wall-clock budget per job in seconds (`None` = unbounded).
    pub deadline_secs: Option<u64>,
    /// Cap applied to every requested video duration.
    pub max_video_seconds: u32,
    /// Length requested for single-prompt clips.
    pub clip_duration_seconds: u32,
    /// Aspect ratio requested for every video job.
    pub aspect_ratio: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            video_model: "veo-2.0-generate-001".to_string(),
            poll_interval_secs: 5,
            max_poll_attempts: Some(120),
            deadline_secs: Some(900),
            max_video_seconds: MAX_VIDEO_SECONDS,
            clip_duration_seconds: 5,
            aspect_ratio: "16:9".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Loads and validates a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> StoryflowResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parses and validates a JSON config document.
    pub fn from_json(raw: &str) -> StoryflowResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> StoryflowResult<()> {
        if self.poll_interval_secs == 0 {
            return Err(StoryflowError::invalid_config("poll_interval_secs must be positive"));
        }
        if self.max_video_seconds == 0 || self.max_video_seconds > MAX_VIDEO_SECONDS {
            return Err(StoryflowError::invalid_config(format!(
                "max_video_seconds must be between 1 and {}",
                MAX_VIDEO_SECONDS
            )));
        }
        if self.clip_duration_seconds == 0 {
            return Err(StoryflowError::invalid_config("clip_duration_seconds must be positive"));
        }
        if self.max_poll_attempts == Some(0) {
            return Err(StoryflowError::invalid_config("max_poll_attempts must be positive"));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(StoryflowError::invalid_config("api_base_url must not be empty"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    /// Clamps a requested video length to `1..=max_video_seconds`.
    ///
    /// The configured maximum is itself held to `1..=MAX_VIDEO_SECONDS`.
    pub fn cap_duration(&self, requested: u32) -> u32 {
        let max = self.max_video_seconds.clamp(1, MAX_VIDEO_SECONDS);
        requested.clamp(1, max)
    }
}
