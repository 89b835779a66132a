//! storyreel turns a text prompt into a short vertical video: narration text
//! from a language model, speech synthesis, word-level forced alignment, and
//! compositing over a stock clip with burned-in subtitles.

pub mod config;
pub mod errors;
pub mod layout;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{AppConfig, ShortSourcePolicy};
pub use errors::{AppError, AppResult};
pub use layout::JobPaths;
pub use models::{PipelineOptions, PipelineReport, StoryRecord};
pub use services::pipeline::{Pipeline, PipelineStage};
