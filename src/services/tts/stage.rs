//! Speech synthesis stage: normalized text in, one WAV artifact out.

use std::fs;
use std::path::PathBuf;

use log::info;

use crate::errors::AppResult;
use crate::layout::JobPaths;
use crate::services::tts::{SynthesisParams, TtsEngine, SAMPLE_RATE};

/// Synthesize `text` and write the waveform to the job's canonical audio path.
///
/// Skip rule: when the audio artifact already exists the engine is not invoked
/// at all and the existing path is returned. This is the only defense against
/// re-running expensive synthesis on retry, and it doubles as the resume
/// mechanism after a downstream failure.
///
/// Chunks are written through a single writer in emission order, so the output
/// file holds chunk N's audio immediately before chunk N+1's with no gap.
/// A mid-stream engine failure leaves the partially written file in place; no
/// cleanup is attempted.
pub fn synthesize_and_save(
    engine: &dyn TtsEngine,
    paths: &JobPaths,
    text: &str,
    params: &SynthesisParams,
) -> AppResult<PathBuf> {
    if paths.audio_path.exists() {
        info!(
            "[{}] Audio artifact already exists, skipping synthesis: {}",
            paths.job_id,
            paths.audio_path.display()
        );
        return Ok(paths.audio_path.clone());
    }

    fs::create_dir_all(&paths.job_dir)?;

    info!(
        "[{}] Synthesizing speech with engine `{}`",
        paths.job_id,
        engine.engine_name()
    );

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&paths.audio_path, spec)?;

    let mut chunk_count = 0usize;
    let mut total_samples = 0usize;
    for chunk in engine.synthesize(text, params)? {
        let chunk = chunk?;
        for sample in &chunk.samples {
            writer.write_sample(*sample)?;
        }
        chunk_count += 1;
        total_samples += chunk.samples.len();
    }
    writer.finalize()?;

    info!(
        "[{}] Wrote {} chunk(s), {:.2}s of audio to {}",
        paths.job_id,
        chunk_count,
        total_samples as f64 / SAMPLE_RATE as f64,
        paths.audio_path.display()
    );
    Ok(paths.audio_path.clone())
}
