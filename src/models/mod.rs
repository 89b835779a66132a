// Domain models module
// Contains core data structures used throughout the application

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated narration script, as persisted in the story store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRecord {
    pub id: String,
    pub topic: String,
    pub content: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// Per-job knobs passed to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// TTS voice identifier.
    pub voice: String,
    /// Language/accent code for synthesis and alignment.
    pub language: String,
    /// Whisper model size used for transcription and alignment.
    pub model_size: String,
    /// Speech speed multiplier.
    pub speed: f32,
    /// Explicit background clip; a random one is picked from the pool when absent.
    pub stock_video_path: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            voice: "am_liam".to_string(),
            language: "en".to_string(),
            model_size: "tiny".to_string(),
            speed: 1.0,
            stock_video_path: None,
        }
    }
}

/// Aggregated result of a successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub status: String,
    pub script_uuid: String,
    pub audio_path: PathBuf,
    pub srt_path: PathBuf,
    pub video_path: PathBuf,
}
