//! Subtitle alignment stage: audio artifact in, word-level SRT out.

use std::path::PathBuf;

use log::info;

use crate::errors::AppResult;
use crate::layout::JobPaths;
use crate::services::align::{srt, AlignerConfig, AlignerFactory};

/// Produce the job's word-level subtitle file from its audio artifact.
///
/// Skip rule: an existing subtitle file is returned unchanged without loading
/// models or transcribing. The SRT content is assembled in full before the
/// single write, so a transcription failure never commits a partial file.
pub fn align_and_save(
    factory: &dyn AlignerFactory,
    paths: &JobPaths,
    config: &AlignerConfig,
) -> AppResult<PathBuf> {
    if paths.srt_path.exists() {
        info!(
            "[{}] Subtitle artifact already exists, skipping alignment: {}",
            paths.job_id,
            paths.srt_path.display()
        );
        return Ok(paths.srt_path.clone());
    }

    let aligner = factory.aligner(config)?;
    let segments = aligner.transcribe_and_align(&paths.audio_path)?;
    let entries = srt::entries_from_segments(&segments);
    info!(
        "[{}] Aligned {} segment(s) into {} caption(s)",
        paths.job_id,
        segments.len(),
        entries.len()
    );

    srt::write_srt(&entries, &paths.srt_path)?;
    info!("[{}] SRT saved: {}", paths.job_id, paths.srt_path.display());
    Ok(paths.srt_path.clone())
}
