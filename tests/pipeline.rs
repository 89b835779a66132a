//! End-to-end pipeline tests with substituted engine/aligner/backend
//! components. Verifies stage ordering, artifact layout, skip-on-retry
//! behavior, and failure tagging through the public API.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use storyreel::config::AppConfig;
use storyreel::errors::{AppError, AppResult};
use storyreel::models::{PipelineOptions, StoryRecord};
use storyreel::services::align::{
    AlignedSegment, AlignerConfig, AlignerFactory, ForcedAligner, WordToken,
};
use storyreel::services::story::{JsonFileStore, StoryStore};
use storyreel::services::tts::{
    AudioChunk, ChunkStream, SynthesisParams, TtsEngine, SAMPLE_RATE,
};
use storyreel::services::video::{ComposeSpec, MediaBackend};
use storyreel::{JobPaths, Pipeline};

struct MockTts {
    calls: Arc<AtomicUsize>,
}

impl TtsEngine for MockTts {
    fn synthesize(&self, text: &str, _params: &SynthesisParams) -> AppResult<ChunkStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // One second of a quiet 220 Hz tone per chunk.
        let samples: Vec<f32> = (0..SAMPLE_RATE)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                0.2 * (2.0 * std::f32::consts::PI * 220.0 * t).sin()
            })
            .collect();
        let chunk = AudioChunk {
            graphemes: text.to_string(),
            phonemes: String::new(),
            samples,
        };
        Ok(Box::new(std::iter::once(Ok(chunk))))
    }

    fn engine_name(&self) -> &str {
        "mock"
    }
}

struct MockAligner {
    calls: Arc<AtomicUsize>,
}

impl ForcedAligner for MockAligner {
    fn transcribe_and_align(&self, _audio_path: &Path) -> AppResult<Vec<AlignedSegment>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![AlignedSegment {
            start: 0.0,
            end: 0.95,
            text: "Hello world.".to_string(),
            words: vec![
                WordToken {
                    text: "Hello".to_string(),
                    start: 0.05,
                    end: 0.4,
                },
                WordToken {
                    text: "world.".to_string(),
                    start: 0.5,
                    end: 0.95,
                },
            ],
        }])
    }
}

struct MockFactory {
    aligner: Arc<MockAligner>,
}

impl AlignerFactory for MockFactory {
    fn aligner(&self, _config: &AlignerConfig) -> AppResult<Arc<dyn ForcedAligner>> {
        Ok(self.aligner.clone())
    }
}

struct StubBackend {
    compose_calls: Arc<AtomicUsize>,
    fail: bool,
}

impl MediaBackend for StubBackend {
    fn probe_duration(&self, _path: &Path) -> AppResult<f64> {
        Ok(60.0)
    }

    fn probe_resolution(&self, _path: &Path) -> AppResult<(u32, u32)> {
        Ok((1920, 1080))
    }

    fn compose(&self, spec: &ComposeSpec) -> AppResult<()> {
        self.compose_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::VideoProcessing("codec exploded".to_string()));
        }
        fs::write(&spec.output, b"mp4")?;
        Ok(())
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    config: AppConfig,
    tts_calls: Arc<AtomicUsize>,
    align_calls: Arc<AtomicUsize>,
    compose_calls: Arc<AtomicUsize>,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            saved_audio_dir: dir.path().join("saved_audio"),
            stock_videos_dir: dir.path().join("stock_videos"),
            output_dir: dir.path().join("output"),
            stories_dir: dir.path().join("stories"),
            ..AppConfig::default()
        };
        fs::create_dir_all(&config.stock_videos_dir).unwrap();
        fs::write(config.stock_videos_dir.join("clip.mp4"), b"stub").unwrap();
        Self {
            _dir: dir,
            config,
            tts_calls: Arc::new(AtomicUsize::new(0)),
            align_calls: Arc::new(AtomicUsize::new(0)),
            compose_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn pipeline(&self, failing_backend: bool) -> Pipeline {
        Pipeline::with_components(
            self.config.clone(),
            Arc::new(MockTts {
                calls: self.tts_calls.clone(),
            }),
            Arc::new(MockFactory {
                aligner: Arc::new(MockAligner {
                    calls: self.align_calls.clone(),
                }),
            }),
            Arc::new(StubBackend {
                compose_calls: self.compose_calls.clone(),
                fail: failing_backend,
            }),
        )
    }
}

#[tokio::test]
async fn end_to_end_produces_all_three_artifacts() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(false);

    let report = pipeline
        .run(
            "abc123",
            "Hello world.",
            &PipelineOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.status, "success");
    assert_eq!(report.script_uuid, "abc123");

    let paths = JobPaths::new(&harness.config, "abc123");
    assert_eq!(report.audio_path, paths.audio_path);
    assert_eq!(report.srt_path, paths.srt_path);
    assert_eq!(report.video_path, paths.video_path);

    // Audio: single mono file with positive duration.
    let reader = hound::WavReader::open(&report.audio_path).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
    assert!(reader.duration() > 0);

    // Subtitles: exactly two entries with strictly increasing, non-overlapping ranges.
    let srt = fs::read_to_string(&report.srt_path).unwrap();
    let entries: Vec<&str> = srt.split("\n\n").collect();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].contains("Hello"));
    assert!(entries[1].contains("world."));
    assert!(srt.contains("00:00:00,050 --> 00:00:00,400"));
    assert!(srt.contains("00:00:00,500 --> 00:00:00,950"));

    assert!(report.video_path.exists());
}

#[tokio::test]
async fn rerun_skips_completed_stages() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(false);
    let options = PipelineOptions::default();

    pipeline
        .run("abc123", "Hello world.", &options, &CancellationToken::new())
        .await
        .unwrap();
    pipeline
        .run("abc123", "Hello world.", &options, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(harness.tts_calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.align_calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.compose_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_stage_is_tagged_and_retry_resumes_from_it() {
    let harness = Harness::new();
    let options = PipelineOptions::default();

    let err = harness
        .pipeline(true)
        .run("abc123", "Hello world.", &options, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.failed_stage(), Some("compositing"));

    // Earlier artifacts stay in place...
    let paths = JobPaths::new(&harness.config, "abc123");
    assert!(paths.audio_path.exists());
    assert!(paths.srt_path.exists());
    assert!(!paths.video_path.exists());

    // ...so the retry only re-runs the failed stage.
    harness
        .pipeline(false)
        .run("abc123", "Hello world.", &options, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(harness.tts_calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.align_calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.compose_calls.load(Ordering::SeqCst), 2);
    assert!(paths.video_path.exists());
}

#[tokio::test]
async fn unknown_story_fails_before_any_stage() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(false);
    let store = JsonFileStore::new(harness.config.stories_dir.clone());

    let err = pipeline
        .run_for_story(&store, "missing-id", &PipelineOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::StoryNotFound(_)));

    assert_eq!(harness.tts_calls.load(Ordering::SeqCst), 0);
    assert!(!harness.config.saved_audio_dir.join("missing-id").exists());
    assert!(!harness.config.output_dir.join("missing-id.mp4").exists());
}

#[tokio::test]
async fn stored_story_feeds_the_pipeline() {
    let harness = Harness::new();
    let store = JsonFileStore::new(harness.config.stories_dir.clone());
    store
        .insert(&StoryRecord {
            id: "story-1".to_string(),
            topic: "greetings".to_string(),
            content: "Hello world.".to_string(),
            model: "test-model".to_string(),
            created_at: Utc::now(),
        })
        .unwrap();

    let report = harness
        .pipeline(false)
        .run_for_story(&store, "story-1", &PipelineOptions::default())
        .await
        .unwrap();
    assert_eq!(report.script_uuid, "story-1");
    assert!(report.video_path.exists());
}

#[tokio::test]
async fn cancelled_token_stops_before_the_first_stage() {
    let harness = Harness::new();
    let pipeline = harness.pipeline(false);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = pipeline
        .run("abc123", "Hello world.", &PipelineOptions::default(), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.failed_stage(), Some("synthesis"));
    assert_eq!(harness.tts_calls.load(Ordering::SeqCst), 0);
}
