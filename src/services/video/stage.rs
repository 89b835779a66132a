//! Video compositing stage: audio + stock clip + subtitles in, MP4 out.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::layout::JobPaths;
use crate::services::video::{
    pick_stock_video, wav_duration_secs, ComposeSpec, CropPlan, MediaBackend, TrimWindow,
    TARGET_HEIGHT, TARGET_WIDTH,
};

/// Composite the final video for one job.
///
/// The audio artifact's duration is the authoritative target length; the
/// stock footage is fitted to it, never the reverse. When no explicit stock
/// clip is given one is picked uniformly at random from the configured pool.
/// The subtitle artifact is burned in when present at its canonical path.
///
/// Skip rule: an existing deliverable is returned unchanged, the same
/// resume-on-retry mechanism the other stages use.
pub fn compose_video(
    backend: &dyn MediaBackend,
    paths: &JobPaths,
    config: &AppConfig,
    stock_video_path: Option<&Path>,
) -> AppResult<PathBuf> {
    if paths.video_path.exists() {
        info!(
            "[{}] Video artifact already exists, skipping compositing: {}",
            paths.job_id,
            paths.video_path.display()
        );
        return Ok(paths.video_path.clone());
    }

    if !paths.audio_path.exists() {
        return Err(AppError::VideoProcessing(format!(
            "Audio artifact missing for job {}: {}",
            paths.job_id,
            paths.audio_path.display()
        )));
    }
    let audio_duration = wav_duration_secs(&paths.audio_path)?;

    let mut rng = rand::thread_rng();
    let stock = match stock_video_path {
        Some(path) => path.to_path_buf(),
        None => {
            let picked = pick_stock_video(&config.stock_videos_dir, &mut rng)?;
            info!("[{}] Using stock video: {}", paths.job_id, picked.display());
            picked
        }
    };

    let video_duration = backend.probe_duration(&stock)?;
    let (width, height) = backend.probe_resolution(&stock)?;

    let trim = TrimWindow::choose(
        video_duration,
        audio_duration,
        config.short_source_policy,
        &mut rng,
    )?;
    let crop = CropPlan::compute(width, height, TARGET_WIDTH, TARGET_HEIGHT);

    if let Some(parent) = paths.video_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let spec = ComposeSpec {
        video_input: stock,
        audio_input: paths.audio_path.clone(),
        trim,
        crop,
        scale_width: TARGET_WIDTH,
        scale_height: TARGET_HEIGHT,
        subtitle_path: paths.srt_path.exists().then(|| paths.srt_path.clone()),
        output: paths.video_path.clone(),
    };
    if spec.subtitle_path.is_some() {
        info!(
            "[{}] Burning subtitles from: {}",
            paths.job_id,
            paths.srt_path.display()
        );
    }

    backend.compose(&spec)?;
    info!("[{}] Video generated: {}", paths.job_id, paths.video_path.display());
    Ok(paths.video_path.clone())
}
