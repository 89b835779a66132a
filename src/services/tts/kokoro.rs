//! Client for a Kokoro TTS server exposing an OpenAI-compatible speech API.
//!
//! Each chunk of the input text is synthesized with a separate request and
//! the returned WAV payload is decoded into raw samples, so chunks can be
//! streamed to disk as they arrive.

use std::io::Cursor;

use log::{debug, info};
use regex::Regex;
use reqwest::blocking::Client;
use serde_json::json;

use crate::errors::{AppError, AppResult};
use crate::services::tts::{AudioChunk, ChunkStream, SynthesisParams, TtsEngine, SAMPLE_RATE};

pub struct KokoroHttpEngine {
    client: Client,
    base_url: String,
}

impl KokoroHttpEngine {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Split the input into independently-synthesizable chunks. Falls back to
    /// the whole text when the pattern matches nothing.
    fn split_chunks(text: &str, pattern: &str) -> AppResult<Vec<String>> {
        let re = Regex::new(pattern)
            .map_err(|e| AppError::Synthesis(format!("Invalid split pattern: {e}")))?;
        let chunks: Vec<String> = re
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if chunks.is_empty() {
            Ok(vec![text.to_string()])
        } else {
            Ok(chunks)
        }
    }

    fn fetch_chunk(&self, text: &str, params: &SynthesisParams) -> AppResult<AudioChunk> {
        let response = self
            .client
            .post(format!("{}/v1/audio/speech", self.base_url))
            .json(&json!({
                "model": "kokoro",
                "input": text,
                "voice": params.voice,
                "lang_code": params.language,
                "speed": params.speed,
                "response_format": "wav",
            }))
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(AppError::Synthesis(format!(
                "TTS server returned {status}: {body}"
            )));
        }

        let bytes = response.bytes()?;
        let samples = decode_wav_samples(&bytes)?;
        debug!("Synthesized chunk: {} samples", samples.len());

        Ok(AudioChunk {
            graphemes: text.to_string(),
            // The serving API does not expose phoneme output.
            phonemes: String::new(),
            samples,
        })
    }
}

impl TtsEngine for KokoroHttpEngine {
    fn synthesize(&self, text: &str, params: &SynthesisParams) -> AppResult<ChunkStream> {
        let chunks = Self::split_chunks(text, &params.split_pattern)?;
        info!(
            "Synthesizing {} chunk(s) with voice {} at speed {}",
            chunks.len(),
            params.voice,
            params.speed
        );

        let client = Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
        };
        let params = params.clone();
        Ok(Box::new(
            chunks
                .into_iter()
                .map(move |chunk| client.fetch_chunk(&chunk, &params)),
        ))
    }

    fn engine_name(&self) -> &str {
        "kokoro-http"
    }
}

/// Decode a WAV payload into mono f32 samples at the pipeline sample rate.
fn decode_wav_samples(bytes: &[u8]) -> AppResult<Vec<f32>> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(AppError::Synthesis(format!(
            "Expected mono audio from TTS server, got {} channels",
            spec.channels
        )));
    }
    if spec.sample_rate != SAMPLE_RATE {
        return Err(AppError::Synthesis(format!(
            "Expected {SAMPLE_RATE} Hz audio from TTS server, got {} Hz",
            spec.sample_rate
        )));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<f32>, _>>()?
        }
    };
    Ok(samples)
}
