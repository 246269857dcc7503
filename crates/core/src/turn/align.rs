use super::rate::words_per_minute;
use super::TurnFeatures;
use crate::events::{SessionId, TranscriptTurn};
use crate::store::SessionStore;

/// Pairs finalized turns with the acoustic samples recorded while they
/// were spoken.
#[derive(Clone, Copy, Debug)]
pub struct TurnAligner {
    lookback_ms: i64,
}

impl TurnAligner {
    pub fn new(lookback_ms: i64) -> Self {
        Self { lookback_ms }
    }

    /// Aggregates the session's history over the turn's window. The
    /// window spans the first word's start to the last word's end;
    /// turns without word timings fall back to a fixed lookback ending
    /// at arrival. `None` when no retained sample lands in the window,
    /// in which case there is nothing to classify.
    pub fn align(
        &self,
        store: &SessionStore,
        session_id: &SessionId,
        turn: &TranscriptTurn,
        received_at_ms: i64,
    ) -> Option<TurnFeatures> {
        let (window_start_ms, window_end_ms) = self.turn_window(turn, received_at_ms);
        let samples = store.window_samples(session_id, window_start_ms, window_end_ms);
        if samples.is_empty() {
            return None;
        }
        let avg_volume = samples.iter().map(|s| s.volume).sum::<f32>() / samples.len() as f32;
        let voiced: Vec<f32> = samples
            .iter()
            .filter_map(|s| s.pitch)
            .filter(|p| *p > 0.0)
            .collect();
        let avg_pitch = if voiced.is_empty() {
            0.0
        } else {
            voiced.iter().sum::<f32>() / voiced.len() as f32
        };
        Some(TurnFeatures {
            avg_volume,
            avg_pitch,
            wpm: words_per_minute(&turn.words),
            window_start_ms,
            window_end_ms,
        })
    }

    fn turn_window(&self, turn: &TranscriptTurn, received_at_ms: i64) -> (i64, i64) {
        match (turn.words.first(), turn.words.last()) {
            (Some(first), Some(last)) => (first.start_ms, last.end_ms),
            _ => (received_at_ms - self.lookback_ms, received_at_ms),
        }
    }
}
