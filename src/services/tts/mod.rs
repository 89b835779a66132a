// TTS services module
// Contains the synthesis engine contract and the synthesis pipeline stage

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::AppConfig;
use crate::errors::AppResult;

pub mod kokoro;
pub mod stage;

pub use kokoro::KokoroHttpEngine;
pub use stage::synthesize_and_save;

/// Sample rate of all synthesized audio, in Hz. Mono.
pub const SAMPLE_RATE: u32 = 24_000;

/// Per-request synthesis parameters.
#[derive(Debug, Clone)]
pub struct SynthesisParams {
    /// Voice identifier, e.g. `am_liam`.
    pub voice: String,
    /// Language/accent code, e.g. `en`.
    pub language: String,
    /// Speed multiplier, 1.0 is normal speed.
    pub speed: f32,
    /// Regex delimiting independently-synthesizable chunks of the input text.
    pub split_pattern: String,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            voice: "am_liam".to_string(),
            language: "en".to_string(),
            speed: 1.0,
            split_pattern: r"\n+".to_string(),
        }
    }
}

/// One synthesized chunk, emitted in text order.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// The text this chunk was synthesized from.
    pub graphemes: String,
    /// Phoneme representation, when the engine exposes one.
    pub phonemes: String,
    /// Mono samples at [`SAMPLE_RATE`].
    pub samples: Vec<f32>,
}

/// Iterator over synthesized chunks. Chunks arrive lazily so the caller can
/// stream them to disk without holding the whole waveform in memory.
pub type ChunkStream = Box<dyn Iterator<Item = AppResult<AudioChunk>> + Send>;

/// Trait that all TTS engines must implement.
///
/// Engines are driven as blocking work (the pipeline wraps stage calls in
/// `spawn_blocking`), so implementations may block freely.
pub trait TtsEngine: Send + Sync {
    /// Synthesize `text`, yielding chunks in text order.
    fn synthesize(&self, text: &str, params: &SynthesisParams) -> AppResult<ChunkStream>;

    fn engine_name(&self) -> &str;
}

static SHARED_ENGINE: OnceCell<Arc<dyn TtsEngine>> = OnceCell::new();

/// Process-wide engine instance, lazily constructed on first use and reused
/// across all jobs. The cell serializes construction, so concurrent first-use
/// cannot build the engine twice.
pub fn shared_engine(config: &AppConfig) -> Arc<dyn TtsEngine> {
    SHARED_ENGINE
        .get_or_init(|| {
            let device = crate::utils::device::preferred_device();
            log::info!("Initializing TTS engine (device preference: {device})");
            Arc::new(KokoroHttpEngine::new(config.kokoro_base_url.clone()))
        })
        .clone()
}
