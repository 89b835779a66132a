use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Story not found: {0}")]
    StoryNotFound(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("No stock videos found in {0}")]
    NoStockVideo(PathBuf),

    #[error("Stock video is shorter than the narration audio ({video:.2}s < {audio:.2}s)")]
    StockVideoTooShort { video: f64, audio: f64 },

    #[error("Subtitle path cannot be used in a filter expression: {0}")]
    UnsafeSubtitlePath(PathBuf),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Alignment error: {0}")]
    Alignment(String),

    #[error("Video processing error: {0}")]
    VideoProcessing(String),

    #[error("Pipeline stage `{stage}` failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("Pipeline cancelled before stage `{0}`")]
    Cancelled(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// The label of the failed stage, if this error was tagged by the orchestrator.
    pub fn failed_stage(&self) -> Option<&'static str> {
        match self {
            AppError::Stage { stage, .. } => Some(stage),
            AppError::Cancelled(stage) => Some(stage),
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
