// Forced alignment services module
// Contains the aligner contract, the model cache, and the subtitle stage

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::errors::AppResult;

pub mod srt;
pub mod stage;
pub mod whisperx;

pub use srt::{format_timestamp, SubtitleEntry};
pub use stage::align_and_save;
pub use whisperx::WhisperXAligner;

/// Full configuration of an aligner instance. The model cache is keyed by
/// this whole tuple; requesting a second model size within one process loads
/// a second model instead of silently reusing the first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlignerConfig {
    pub model_size: String,
    pub language: String,
    pub device: String,
}

impl AlignerConfig {
    pub fn new(model_size: &str, language: &str) -> Self {
        Self {
            model_size: model_size.to_string(),
            language: language.to_string(),
            device: crate::utils::device::preferred_device().to_string(),
        }
    }
}

/// A word with refined start/end timestamps, in seconds.
#[derive(Debug, Clone)]
pub struct WordToken {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// A coarse transcription segment holding zero or more aligned words.
#[derive(Debug, Clone)]
pub struct AlignedSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub words: Vec<WordToken>,
}

/// Trait for transcription + forced-alignment backends.
pub trait ForcedAligner: Send + Sync {
    /// Transcribe the audio file and refine per-word timestamps against it.
    /// Segments and their words are returned in reading order.
    fn transcribe_and_align(&self, audio_path: &Path) -> AppResult<Vec<AlignedSegment>>;
}

/// Hands out aligner instances for a given configuration.
pub trait AlignerFactory: Send + Sync {
    fn aligner(&self, config: &AlignerConfig) -> AppResult<Arc<dyn ForcedAligner>>;
}

/// Factory that caches one aligner per configuration tuple for the lifetime
/// of the process. Model loading is expensive, so concurrent first-use is
/// serialized behind the mutex and construction happens at most once per
/// configuration.
pub struct CachingAlignerFactory {
    cache: Mutex<HashMap<AlignerConfig, Arc<dyn ForcedAligner>>>,
    build: Box<dyn Fn(&AlignerConfig) -> AppResult<Arc<dyn ForcedAligner>> + Send + Sync>,
}

impl CachingAlignerFactory {
    pub fn new(
        build: impl Fn(&AlignerConfig) -> AppResult<Arc<dyn ForcedAligner>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            build: Box::new(build),
        }
    }

    /// Factory producing whisperx-backed aligners.
    pub fn whisperx() -> Self {
        Self::new(|config| {
            log::info!(
                "Loading alignment models (size={}, language={}, device={})",
                config.model_size,
                config.language,
                config.device
            );
            Ok(Arc::new(WhisperXAligner::new(config.clone())) as Arc<dyn ForcedAligner>)
        })
    }
}

impl AlignerFactory for CachingAlignerFactory {
    fn aligner(&self, config: &AlignerConfig) -> AppResult<Arc<dyn ForcedAligner>> {
        let mut cache = self.cache.lock().expect("aligner cache poisoned");
        if let Some(existing) = cache.get(config) {
            return Ok(existing.clone());
        }
        let built = (self.build)(config)?;
        cache.insert(config.clone(), built.clone());
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct NoopAligner;

    impl ForcedAligner for NoopAligner {
        fn transcribe_and_align(&self, _audio_path: &Path) -> AppResult<Vec<AlignedSegment>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn factory_builds_once_per_config_tuple() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let factory = CachingAlignerFactory::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NoopAligner) as Arc<dyn ForcedAligner>)
        });

        let tiny = AlignerConfig {
            model_size: "tiny".into(),
            language: "en".into(),
            device: "cpu".into(),
        };
        factory.aligner(&tiny).unwrap();
        factory.aligner(&tiny).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);

        // A different model size is a different cache entry, not a silent reuse.
        let small = AlignerConfig {
            model_size: "small".into(),
            ..tiny.clone()
        };
        factory.aligner(&small).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }
}
