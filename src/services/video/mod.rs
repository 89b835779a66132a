// Video compositing services module
// Geometry planning, stock selection, and the compositing stage

use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::ShortSourcePolicy;
use crate::errors::{AppError, AppResult};

pub mod ffmpeg;
pub mod stage;

pub use ffmpeg::{FfmpegBackend, MediaBackend};
pub use stage::compose_video;

/// Final deliverable resolution, 9:16 vertical.
pub const TARGET_WIDTH: u32 = 1080;
pub const TARGET_HEIGHT: u32 = 1920;

/// Burned-in caption style: centered vertically, small font, thin outline.
pub const SUBTITLE_STYLE: &str = "FontName=Arial,FontSize=8,PrimaryColour=&H00FFFFFF&,\
OutlineColour=&H00000000&,OutlineWidth=0.5,Alignment=10,MarginL=0,MarginR=0,MarginV=0";

/// Centered crop fitting the source to the target aspect ratio.
/// Exactly one dimension is ever cropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropPlan {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropPlan {
    /// Compare source aspect to target aspect: a wider source loses width
    /// symmetrically about the horizontal center, a taller one loses height
    /// about the vertical center.
    pub fn compute(width: u32, height: u32, target_width: u32, target_height: u32) -> Self {
        let current_aspect = width as f64 / height as f64;
        let target_aspect = target_width as f64 / target_height as f64;

        if current_aspect > target_aspect {
            let new_width = (height as f64 * target_aspect) as u32;
            Self {
                x: (width - new_width) / 2,
                y: 0,
                width: new_width,
                height,
            }
        } else {
            let new_height = (width as f64 / target_aspect) as u32;
            Self {
                x: 0,
                y: (height - new_height) / 2,
                width,
                height: new_height,
            }
        }
    }
}

/// Time window taken from the stock video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimWindow {
    /// Start offset into the stock video, seconds.
    pub start: f64,
    /// Window length, seconds.
    pub duration: f64,
}

impl TrimWindow {
    /// Fit the stock video to the audio duration. The audio is authoritative:
    /// a longer source gets a uniformly random window of the audio's length, a
    /// shorter one is handled per the configured policy.
    pub fn choose<R: Rng>(
        video_duration: f64,
        audio_duration: f64,
        policy: ShortSourcePolicy,
        rng: &mut R,
    ) -> AppResult<Self> {
        if video_duration <= audio_duration {
            return match policy {
                ShortSourcePolicy::Truncate => Ok(Self {
                    start: 0.0,
                    duration: video_duration,
                }),
                ShortSourcePolicy::Reject => Err(AppError::StockVideoTooShort {
                    video: video_duration,
                    audio: audio_duration,
                }),
            };
        }
        let max_start = video_duration - audio_duration;
        Ok(Self {
            start: rng.gen_range(0.0..=max_start),
            duration: audio_duration,
        })
    }
}

/// Pick a background clip uniformly at random from the stock directory.
pub fn pick_stock_video<R: Rng>(stock_dir: &Path, rng: &mut R) -> AppResult<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(stock_dir)
        .map_err(|_| AppError::NoStockVideo(stock_dir.to_path_buf()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    candidates.sort();

    candidates
        .choose(rng)
        .cloned()
        .ok_or_else(|| AppError::NoStockVideo(stock_dir.to_path_buf()))
}

/// Everything the compositing backend needs, passed structurally rather than
/// as a preassembled command line.
#[derive(Debug, Clone)]
pub struct ComposeSpec {
    pub video_input: PathBuf,
    pub audio_input: PathBuf,
    pub trim: TrimWindow,
    pub crop: CropPlan,
    pub scale_width: u32,
    pub scale_height: u32,
    /// Subtitles to burn in, when the job has a subtitle artifact.
    pub subtitle_path: Option<PathBuf>,
    pub output: PathBuf,
}

/// Duration of a WAV file in seconds, from its header.
pub fn wav_duration_secs(path: &Path) -> AppResult<f64> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}
