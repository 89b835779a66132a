//! FFmpeg-backed media probing and compositing.

use std::path::Path;
use std::process::Command;

use log::{debug, info};

use crate::errors::{AppError, AppResult};
use crate::services::video::{ComposeSpec, SUBTITLE_STYLE};

/// Backend the compositing stage talks to. Probing and composing are separate
/// so tests can substitute a recording implementation.
pub trait MediaBackend: Send + Sync {
    /// Container duration in seconds.
    fn probe_duration(&self, path: &Path) -> AppResult<f64>;

    /// Width and height of the first video stream.
    fn probe_resolution(&self, path: &Path) -> AppResult<(u32, u32)>;

    /// Trim, crop, scale, burn subtitles, and mux per the spec.
    fn compose(&self, spec: &ComposeSpec) -> AppResult<()>;
}

#[derive(Default)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    pub fn new() -> Self {
        Self
    }

    fn run_ffprobe(args: &[&str]) -> AppResult<String> {
        let output = Command::new("ffprobe").args(args).output()?;
        if !output.status.success() {
            return Err(AppError::VideoProcessing(format!(
                "ffprobe failed with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Escape a subtitle path for embedding in an ffmpeg filter expression.
///
/// Backslashes and single quotes are escaped; paths containing the filter
/// syntax delimiters themselves are rejected outright rather than quoted,
/// since this string is interpolated into the `-vf` expression.
pub fn escape_subtitle_path(path: &Path) -> AppResult<String> {
    let raw = path.to_str().ok_or_else(|| {
        AppError::UnsafeSubtitlePath(path.to_path_buf())
    })?;
    if raw.chars().any(|c| matches!(c, ',' | ';' | ':' | '[' | ']')) {
        return Err(AppError::UnsafeSubtitlePath(path.to_path_buf()));
    }
    Ok(raw.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Build the `-vf` filter chain: crop, scale, and optionally burned subtitles.
fn build_filter(spec: &ComposeSpec) -> AppResult<String> {
    let mut filter = format!(
        "crop={}:{}:{}:{},scale={}:{}",
        spec.crop.width,
        spec.crop.height,
        spec.crop.x,
        spec.crop.y,
        spec.scale_width,
        spec.scale_height
    );
    if let Some(srt) = &spec.subtitle_path {
        let escaped = escape_subtitle_path(srt)?;
        filter.push_str(&format!(
            ",subtitles='{escaped}':force_style='{SUBTITLE_STYLE}'"
        ));
    }
    Ok(filter)
}

impl MediaBackend for FfmpegBackend {
    fn probe_duration(&self, path: &Path) -> AppResult<f64> {
        let stdout = Self::run_ffprobe(&[
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
            path.to_str().ok_or_else(|| {
                AppError::VideoProcessing(format!("Non-UTF-8 path: {}", path.display()))
            })?,
        ])?;
        stdout.trim().parse::<f64>().map_err(|_| {
            AppError::VideoProcessing(format!("Failed to parse video duration: {stdout}"))
        })
    }

    fn probe_resolution(&self, path: &Path) -> AppResult<(u32, u32)> {
        let stdout = Self::run_ffprobe(&[
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=s=x:p=0",
            path.to_str().ok_or_else(|| {
                AppError::VideoProcessing(format!("Non-UTF-8 path: {}", path.display()))
            })?,
        ])?;
        let trimmed = stdout.trim();
        let (w, h) = trimmed.split_once('x').ok_or_else(|| {
            AppError::VideoProcessing(format!("Failed to parse video resolution: {trimmed}"))
        })?;
        let width = w.parse::<u32>().map_err(|_| {
            AppError::VideoProcessing(format!("Failed to parse video width: {w}"))
        })?;
        let height = h.parse::<u32>().map_err(|_| {
            AppError::VideoProcessing(format!("Failed to parse video height: {h}"))
        })?;
        Ok((width, height))
    }

    fn compose(&self, spec: &ComposeSpec) -> AppResult<()> {
        let filter = build_filter(spec)?;
        debug!("ffmpeg filter chain: {filter}");

        let mut command = Command::new("ffmpeg");
        command
            .arg("-y")
            .args(["-ss", &format!("{:.3}", spec.trim.start)])
            .args(["-t", &format!("{:.3}", spec.trim.duration)])
            .arg("-i")
            .arg(&spec.video_input)
            .arg("-i")
            .arg(&spec.audio_input)
            .args(["-map", "0:v:0", "-map", "1:a:0"])
            .args(["-vf", &filter])
            .args(["-c:v", "libx264", "-c:a", "aac"])
            .arg("-shortest")
            .arg(&spec.output);

        info!("Running ffmpeg -> {}", spec.output.display());
        // output() waits for the child, so the encoder is always reaped even
        // when it fails.
        let output = command.output()?;
        if !output.status.success() {
            return Err(AppError::VideoProcessing(format!(
                "ffmpeg failed with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }
}
