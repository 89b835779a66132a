//! Transcription and forced alignment via the `whisperx` command-line tool.
//!
//! WhisperX transcribes to coarse segments, then refines per-word timestamps
//! with a CTC alignment model over the same audio. We drive it as a
//! subprocess with JSON output and parse the result.

use std::path::Path;
use std::process::Command;

use log::{debug, info};
use serde::Deserialize;

use crate::errors::{AppError, AppResult};
use crate::services::align::{AlignedSegment, AlignerConfig, ForcedAligner, WordToken};

pub struct WhisperXAligner {
    config: AlignerConfig,
}

impl WhisperXAligner {
    pub fn new(config: AlignerConfig) -> Self {
        Self { config }
    }
}

#[derive(Debug, Deserialize)]
struct WhisperXOutput {
    #[serde(default)]
    segments: Vec<WhisperXSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperXSegment {
    #[serde(default)]
    start: f64,
    #[serde(default)]
    end: f64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    words: Vec<WhisperXWord>,
}

#[derive(Debug, Deserialize)]
struct WhisperXWord {
    #[serde(default)]
    word: String,
    // Alignment can fail to place a word (numerals, OOV tokens); whisperx then
    // omits its timestamps.
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
}

fn convert_segments(output: WhisperXOutput) -> Vec<AlignedSegment> {
    output
        .segments
        .into_iter()
        .map(|segment| AlignedSegment {
            start: segment.start,
            end: segment.end,
            text: segment.text,
            words: segment
                .words
                .into_iter()
                .map(|word| WordToken {
                    text: word.word,
                    start: word.start.unwrap_or(0.0),
                    end: word.end.unwrap_or(0.0),
                })
                .collect(),
        })
        .collect()
}

impl ForcedAligner for WhisperXAligner {
    fn transcribe_and_align(&self, audio_path: &Path) -> AppResult<Vec<AlignedSegment>> {
        let whisperx = which::which("whisperx")
            .map_err(|_| AppError::Alignment("whisperx not found on PATH".to_string()))?;

        let output_dir = tempfile::tempdir()?;
        info!(
            "Transcribing {} (model={}, device={})",
            audio_path.display(),
            self.config.model_size,
            self.config.device
        );

        let output = Command::new(whisperx)
            .arg(audio_path)
            .args(["--model", &self.config.model_size])
            .args(["--language", &self.config.language])
            .args(["--device", &self.config.device])
            .args(["--compute_type", "int8"])
            .args(["--batch_size", "16"])
            .args(["--output_format", "json"])
            .arg("--output_dir")
            .arg(output_dir.path())
            .output()?;

        if !output.status.success() {
            return Err(AppError::Alignment(format!(
                "whisperx exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stem = audio_path
            .file_stem()
            .ok_or_else(|| AppError::Alignment("Audio path has no file stem".to_string()))?;
        let json_path = output_dir.path().join(stem).with_extension("json");
        debug!("Reading alignment output from {}", json_path.display());

        let raw = std::fs::read_to_string(&json_path).map_err(|e| {
            AppError::Alignment(format!(
                "Missing whisperx output {}: {e}",
                json_path.display()
            ))
        })?;
        let parsed: WhisperXOutput = serde_json::from_str(&raw)
            .map_err(|e| AppError::Alignment(format!("Malformed whisperx output: {e}")))?;

        Ok(convert_segments(parsed))
    }
}
