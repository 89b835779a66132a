// Configuration module
// Centralized management of application configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Policy applied when the selected stock video is shorter than the narration audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortSourcePolicy {
    /// Use the footage from time 0; the video ends before the audio does.
    Truncate,
    /// Fail the compositing stage instead of producing a too-short video.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root for per-job audio/subtitle artifacts (`saved_audio/<job_id>/...`).
    pub saved_audio_dir: PathBuf,
    /// Pool of candidate background clips.
    pub stock_videos_dir: PathBuf,
    /// Final deliverables (`output/<job_id>.mp4`).
    pub output_dir: PathBuf,
    /// Directory for the JSON-file story store.
    pub stories_dir: PathBuf,

    pub openrouter_api_key: String,
    pub openrouter_base_url: String,
    pub kokoro_base_url: String,

    pub short_source_policy: ShortSourcePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            saved_audio_dir: PathBuf::from("saved_audio"),
            stock_videos_dir: PathBuf::from("stock_videos"),
            output_dir: PathBuf::from("output"),
            stories_dir: PathBuf::from("stories"),
            openrouter_api_key: String::new(),
            openrouter_base_url: "https://openrouter.ai/api/v1".to_string(),
            kokoro_base_url: "http://127.0.0.1:8880".to_string(),
            short_source_policy: ShortSourcePolicy::Truncate,
        }
    }
}

impl AppConfig {
    /// Build a configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            config.openrouter_api_key = key;
        }
        if let Ok(url) = std::env::var("OPENROUTER_BASE_URL") {
            config.openrouter_base_url = url;
        }
        if let Ok(url) = std::env::var("KOKORO_BASE_URL") {
            config.kokoro_base_url = url;
        }
        if let Ok(dir) = std::env::var("STORYREEL_DATA_DIR") {
            let root = PathBuf::from(dir);
            config.saved_audio_dir = root.join("saved_audio");
            config.stock_videos_dir = root.join("stock_videos");
            config.output_dir = root.join("output");
            config.stories_dir = root.join("stories");
        }
        config
    }
}
