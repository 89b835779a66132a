//! Canonical per-job artifact paths.
//!
//! Every artifact is addressed solely by the job identifier, so re-running a
//! stage for the same identifier resolves to the same file. The skip-if-exists
//! checks in each stage rely on these paths being stable.

use std::path::PathBuf;

use crate::config::AppConfig;

pub const AUDIO_FILE_NAME: &str = "full_script_audio.wav";
pub const SRT_FILE_NAME: &str = "full_sub_words.srt";

/// Resolved artifact locations for one job.
#[derive(Debug, Clone)]
pub struct JobPaths {
    pub job_id: String,
    /// `saved_audio/<job_id>/`
    pub job_dir: PathBuf,
    /// `saved_audio/<job_id>/full_script_audio.wav`
    pub audio_path: PathBuf,
    /// `saved_audio/<job_id>/full_sub_words.srt`
    pub srt_path: PathBuf,
    /// `output/<job_id>.mp4`
    pub video_path: PathBuf,
}

impl JobPaths {
    pub fn new(config: &AppConfig, job_id: &str) -> Self {
        let job_dir = config.saved_audio_dir.join(job_id);
        Self {
            job_id: job_id.to_string(),
            audio_path: job_dir.join(AUDIO_FILE_NAME),
            srt_path: job_dir.join(SRT_FILE_NAME),
            video_path: config.output_dir.join(format!("{job_id}.mp4")),
            job_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_derived_from_job_id_only() {
        let config = AppConfig::default();
        let paths = JobPaths::new(&config, "abc123");
        assert_eq!(
            paths.audio_path,
            PathBuf::from("saved_audio/abc123/full_script_audio.wav")
        );
        assert_eq!(
            paths.srt_path,
            PathBuf::from("saved_audio/abc123/full_sub_words.srt")
        );
        assert_eq!(paths.video_path, PathBuf::from("output/abc123.mp4"));

        // Same id resolves to the same paths on every call.
        let again = JobPaths::new(&config, "abc123");
        assert_eq!(paths.audio_path, again.audio_path);
    }
}
