//! Pipeline orchestration: synthesis → alignment → compositing for one job.
//!
//! Stages run strictly sequentially and hand artifacts to each other by path
//! only, which is what makes each stage independently idempotent: a retry of
//! the whole pipeline resumes from the failed stage via each stage's own
//! skip-if-exists rule. The orchestrator never rolls back earlier artifacts.

use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::layout::JobPaths;
use crate::models::{PipelineOptions, PipelineReport};
use crate::services::align::{self, AlignerConfig, AlignerFactory, CachingAlignerFactory};
use crate::services::story::StoryStore;
use crate::services::text;
use crate::services::tts::{self, SynthesisParams, TtsEngine};
use crate::services::video::{self, FfmpegBackend, MediaBackend};

/// The three sequential pipeline stages. Any failure is tagged with the
/// failing stage's label; there is no branching and no per-job parallelism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Synthesis,
    Alignment,
    Compositing,
}

impl PipelineStage {
    pub fn label(self) -> &'static str {
        match self {
            Self::Synthesis => "synthesis",
            Self::Alignment => "alignment",
            Self::Compositing => "compositing",
        }
    }
}

/// Owns the pipeline's collaborators explicitly so model lifetime and test
/// substitution are visible, instead of hiding them in module-level globals.
pub struct Pipeline {
    config: AppConfig,
    tts: Arc<dyn TtsEngine>,
    aligners: Arc<dyn AlignerFactory>,
    media: Arc<dyn MediaBackend>,
}

impl Pipeline {
    /// Pipeline with the production components: the shared Kokoro engine, the
    /// caching whisperx aligner factory, and the ffmpeg backend.
    pub fn new(config: AppConfig) -> Self {
        let tts = tts::shared_engine(&config);
        Self::with_components(
            config,
            tts,
            Arc::new(CachingAlignerFactory::whisperx()),
            Arc::new(FfmpegBackend::new()),
        )
    }

    pub fn with_components(
        config: AppConfig,
        tts: Arc<dyn TtsEngine>,
        aligners: Arc<dyn AlignerFactory>,
        media: Arc<dyn MediaBackend>,
    ) -> Self {
        Self {
            config,
            tts,
            aligners,
            media,
        }
    }

    /// Fetch the stored story for `job_id` and run the full pipeline on its
    /// content. A missing story fails before any stage runs and creates no
    /// artifacts.
    pub async fn run_for_story(
        &self,
        store: &dyn StoryStore,
        job_id: &str,
        options: &PipelineOptions,
    ) -> AppResult<PipelineReport> {
        let story = store.get(job_id)?;
        self.run(job_id, &story.content, options, &CancellationToken::new())
            .await
    }

    /// Run the three stages for one job.
    ///
    /// Cancellation is honored between stages only: a cancelled token stops
    /// the pipeline before the next stage starts, leaving completed artifacts
    /// in place just like a failure would.
    pub async fn run(
        &self,
        job_id: &str,
        script_text: &str,
        options: &PipelineOptions,
        cancel: &CancellationToken,
    ) -> AppResult<PipelineReport> {
        info!("[{job_id}] Starting complete pipeline");
        let paths = JobPaths::new(&self.config, job_id);
        let prepared_text = text::add_pauses(&text::normalize(script_text));

        info!("[{job_id}] Step 1/3: Generating TTS audio");
        let synthesis_params = SynthesisParams {
            voice: options.voice.clone(),
            language: options.language.clone(),
            speed: options.speed,
            ..SynthesisParams::default()
        };
        let audio_path = {
            let engine = self.tts.clone();
            let paths = paths.clone();
            self.run_stage(PipelineStage::Synthesis, job_id, cancel, move || {
                tts::synthesize_and_save(engine.as_ref(), &paths, &prepared_text, &synthesis_params)
            })
            .await?
        };

        info!("[{job_id}] Step 2/3: Generating SRT subtitles");
        let aligner_config = AlignerConfig::new(&options.model_size, &options.language);
        let srt_path = {
            let factory = self.aligners.clone();
            let paths = paths.clone();
            self.run_stage(PipelineStage::Alignment, job_id, cancel, move || {
                align::align_and_save(factory.as_ref(), &paths, &aligner_config)
            })
            .await?
        };

        info!("[{job_id}] Step 3/3: Generating video");
        let video_path = {
            let backend = self.media.clone();
            let paths = paths.clone();
            let config = self.config.clone();
            let stock = options.stock_video_path.clone();
            self.run_stage(PipelineStage::Compositing, job_id, cancel, move || {
                video::compose_video(backend.as_ref(), &paths, &config, stock.as_deref())
            })
            .await?
        };

        info!("[{job_id}] Complete pipeline finished successfully");
        Ok(PipelineReport {
            status: "success".to_string(),
            script_uuid: job_id.to_string(),
            audio_path,
            srt_path,
            video_path,
        })
    }

    /// Run one stage's blocking body off the async scheduler, tagging any
    /// error with the stage label. Stage errors are logged and re-raised
    /// unchanged inside the tag; no compensating rollback is attempted.
    async fn run_stage<F>(
        &self,
        stage: PipelineStage,
        job_id: &str,
        cancel: &CancellationToken,
        body: F,
    ) -> AppResult<PathBuf>
    where
        F: FnOnce() -> AppResult<PathBuf> + Send + 'static,
    {
        if cancel.is_cancelled() {
            info!("[{job_id}] Pipeline cancelled before {} stage", stage.label());
            return Err(AppError::Cancelled(stage.label()));
        }
        match tokio::task::spawn_blocking(body).await {
            Ok(Ok(path)) => Ok(path),
            Ok(Err(e)) => {
                error!("[{job_id}] Error in {} stage: {e}", stage.label());
                Err(AppError::Stage {
                    stage: stage.label(),
                    source: Box::new(e),
                })
            }
            Err(join_error) => {
                error!("[{job_id}] {} stage task failed: {join_error}", stage.label());
                Err(AppError::Stage {
                    stage: stage.label(),
                    source: Box::new(AppError::Other(anyhow::anyhow!(
                        "stage task panicked: {join_error}"
                    ))),
                })
            }
        }
    }
}
