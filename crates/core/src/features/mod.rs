//! Per-chunk acoustic feature extraction.
//!
//! Chunks arrive as little-endian PCM16 bytes. Each one is reduced to a
//! [`FeatureSample`]: an RMS volume on a 0-100 scale and, when the
//! frame is periodic enough, a fundamental frequency estimate.

use std::sync::Arc;

mod pitch;

pub use pitch::YinPitchDetector;

/// Estimates the fundamental frequency of a mono frame.
///
/// Implementations return `None` for unvoiced or unreliable frames and
/// report internal failure the same way; they must not panic on any
/// input.
pub trait PitchDetector: Send + Sync {
    fn detect(&self, samples: &[f32], sample_rate_hz: u32) -> Option<f32>;
}

/// One chunk's features, stamped with the caller's timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureSample {
    pub timestamp_ms: i64,
    /// RMS volume, 0-100. 0 exactly when every sample in the chunk is 0.
    pub volume: f32,
    /// Fundamental frequency in Hz, `None` for unvoiced frames.
    pub pitch: Option<f32>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    #[error("audio chunk is empty")]
    EmptyChunk,
    #[error("pcm16 chunk length must be even, got {0} bytes")]
    OddByteLength(usize),
}

pub struct FeatureExtractor {
    sample_rate_hz: u32,
    detector: Arc<dyn PitchDetector>,
}

impl FeatureExtractor {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self::with_detector(sample_rate_hz, Arc::new(YinPitchDetector::default()))
    }

    pub fn with_detector(sample_rate_hz: u32, detector: Arc<dyn PitchDetector>) -> Self {
        Self {
            sample_rate_hz,
            detector,
        }
    }

    /// Extracts features from one PCM16 chunk. Pure except for a debug
    /// event when the detector declines a frame.
    pub fn extract(&self, pcm: &[u8], timestamp_ms: i64) -> Result<FeatureSample, FeatureError> {
        let samples = parse_pcm16(pcm)?;
        let volume = rms_volume(&samples);
        let normalized = pcm16_to_f32(&samples);
        let pitch = self
            .detector
            .detect(&normalized, self.sample_rate_hz)
            .filter(|hz| hz.is_finite() && *hz > 0.0);
        if pitch.is_none() {
            tracing::debug!(timestamp_ms, "no reliable pitch in frame");
        }
        Ok(FeatureSample {
            timestamp_ms,
            volume,
            pitch,
        })
    }
}

/// Decodes little-endian PCM16 bytes into samples.
pub fn parse_pcm16(raw: &[u8]) -> Result<Vec<i16>, FeatureError> {
    if raw.is_empty() {
        return Err(FeatureError::EmptyChunk);
    }
    if !raw.len().is_multiple_of(2) {
        return Err(FeatureError::OddByteLength(raw.len()));
    }
    Ok(raw
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// RMS of the chunk scaled to 0-100, where 100 is a full-scale signal.
pub fn rms_volume(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples
        .iter()
        .map(|&s| {
            let normalized = f64::from(s) / 32_768.0;
            normalized * normalized
        })
        .sum();
    let rms = (sum_squares / samples.len() as f64).sqrt();
    ((rms * 100.0) as f32).clamp(0.0, 100.0)
}

fn pcm16_to_f32(samples: &[i16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&s| f32::from(s) / 32_768.0)
        .collect()
}
