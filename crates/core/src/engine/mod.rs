//! The engine proper: session events in, emotion events out.
//!
//! [`Engine::handle_event`] is synchronous and deterministic; all
//! timing comes from the timestamps already on the events. The async
//! [`Engine::run`] loop only adds channel plumbing around it, in the
//! usual shape: rejected events are logged and skipped, a failing sink
//! ends the run.

use tokio::sync::mpsc;

use crate::classify::classify;
use crate::config::EngineConfig;
use crate::events::{ContinuousEmotion, EmotionEvent, SessionEvent, TurnEmotion};
use crate::features::{FeatureError, FeatureExtractor};
use crate::realtime::RealtimeAggregator;
use crate::sink::{EmotionSink, SinkError};
use crate::store::SessionStore;
use crate::turn::TurnAligner;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("rejected audio chunk: {0}")]
    Feature(#[from] FeatureError),
    #[error("emotion sink failed: {0}")]
    Sink(#[from] SinkError),
}

/// Counters over an engine's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub chunks_processed: u64,
    pub chunks_rejected: u64,
    pub turns_aligned: u64,
    pub turns_skipped: u64,
    pub sessions_started: u64,
    pub sessions_released: u64,
}

pub struct Engine {
    store: SessionStore,
    extractor: FeatureExtractor,
    realtime: RealtimeAggregator,
    aligner: TurnAligner,
    stats: EngineStats,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_extractor(config, FeatureExtractor::new(config.sample_rate_hz))
    }

    /// Builds an engine around a caller-supplied extractor, e.g. one
    /// with a different pitch detector.
    pub fn with_extractor(config: &EngineConfig, extractor: FeatureExtractor) -> Self {
        Self {
            store: SessionStore::new(config),
            extractor,
            realtime: RealtimeAggregator::new(config.min_rolling_samples),
            aligner: TurnAligner::new(config.turn_lookback_ms),
            stats: EngineStats::default(),
        }
    }

    /// Applies one event. `Ok(Some)` carries the emission it produced:
    /// every accepted chunk yields a continuous estimate, an aligned
    /// turn yields a turn estimate, and lifecycle events yield nothing.
    /// A rejected chunk leaves the session untouched.
    pub fn handle_event(
        &mut self,
        event: SessionEvent,
    ) -> Result<Option<EmotionEvent>, EngineError> {
        match event {
            SessionEvent::Start { session_id } => {
                if self.store.start_session(&session_id) {
                    self.stats.sessions_started += 1;
                    tracing::debug!(session = %session_id, "session started");
                } else {
                    tracing::debug!(session = %session_id, "session already active");
                }
                Ok(None)
            }
            SessionEvent::Audio {
                session_id,
                pcm,
                timestamp_ms,
            } => {
                let sample = match self.extractor.extract(&pcm, timestamp_ms) {
                    Ok(sample) => sample,
                    Err(e) => {
                        self.stats.chunks_rejected += 1;
                        return Err(e.into());
                    }
                };
                self.store.append(&session_id, sample);
                let averages = self
                    .store
                    .rolling_averages(&session_id)
                    .unwrap_or_default();
                let classification = self.realtime.evaluate(&averages);
                self.stats.chunks_processed += 1;
                Ok(Some(EmotionEvent::Continuous(ContinuousEmotion {
                    session_id,
                    volume: sample.volume,
                    pitch: sample.pitch.unwrap_or(0.0),
                    emotion: classification.emotion,
                    confidence: classification.confidence,
                    visual_style: classification.visual_style.to_owned(),
                    timestamp_ms,
                })))
            }
            SessionEvent::Turn {
                session_id,
                turn,
                received_at_ms,
            } => match self.aligner.align(&self.store, &session_id, &turn, received_at_ms) {
                Some(features) => {
                    let classification =
                        classify(features.avg_volume, features.avg_pitch, features.wpm);
                    self.stats.turns_aligned += 1;
                    Ok(Some(EmotionEvent::Turn(TurnEmotion {
                        session_id,
                        emotion: classification.emotion,
                        confidence: classification.confidence,
                        visual_style: classification.visual_style.to_owned(),
                        avg_volume: features.avg_volume,
                        avg_pitch: features.avg_pitch,
                        wpm: features.wpm,
                        transcript: turn.text,
                        timestamp_ms: received_at_ms,
                    })))
                }
                None => {
                    self.stats.turns_skipped += 1;
                    tracing::debug!(session = %session_id, "no samples aligned with turn, skipping");
                    Ok(None)
                }
            },
            SessionEvent::End { session_id } => {
                if self.store.release(&session_id) {
                    self.stats.sessions_released += 1;
                    tracing::debug!(session = %session_id, "session released");
                }
                Ok(None)
            }
        }
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn active_sessions(&self) -> usize {
        self.store.session_count()
    }

    /// Drives the engine from an event channel until the sender side
    /// closes, relaying every emission into the sink.
    pub async fn run<S: EmotionSink>(
        mut self,
        mut events: mpsc::Receiver<SessionEvent>,
        sink: S,
    ) -> Result<EngineStats, EngineError> {
        while let Some(event) = events.recv().await {
            match self.handle_event(event) {
                Ok(Some(emission)) => {
                    if let Err(e) = sink.emit(emission).await {
                        tracing::error!(error = %e, "emotion sink failed");
                        return Err(e.into());
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "event rejected");
                }
            }
        }
        Ok(self.stats)
    }
}
