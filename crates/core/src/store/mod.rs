//! Per-session feature state.
//!
//! The store owns two views of each session: a timestamp-ordered
//! history trimmed to a retention span, which turn alignment queries by
//! window, and a small rolling window feeding the continuous estimate.
//! Appending to an unknown session creates it; read paths never do.

use std::collections::{HashMap, VecDeque};

use crate::config::EngineConfig;
use crate::events::SessionId;
use crate::features::FeatureSample;

mod rolling;

pub use rolling::{RollingAverages, RollingWindow};

pub struct SessionStore {
    sessions: HashMap<SessionId, SessionState>,
    retention_ms: i64,
    rolling_capacity: usize,
}

struct SessionState {
    history: VecDeque<FeatureSample>,
    rolling: RollingWindow,
}

impl SessionState {
    fn new(rolling_capacity: usize) -> Self {
        Self {
            history: VecDeque::new(),
            rolling: RollingWindow::new(rolling_capacity),
        }
    }

    /// Samples normally arrive in timestamp order, so scan insertion
    /// points from the back; in-order appends stay O(1).
    fn insert_ordered(&mut self, sample: FeatureSample) {
        let mut idx = self.history.len();
        while idx > 0 && self.history[idx - 1].timestamp_ms > sample.timestamp_ms {
            idx -= 1;
        }
        self.history.insert(idx, sample);
    }

    fn evict_expired(&mut self, retention_ms: i64) {
        let Some(newest) = self.history.back().map(|s| s.timestamp_ms) else {
            return;
        };
        let cutoff = newest - retention_ms;
        while self
            .history
            .front()
            .is_some_and(|s| s.timestamp_ms < cutoff)
        {
            self.history.pop_front();
        }
    }
}

impl SessionStore {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            retention_ms: config.retention_ms,
            rolling_capacity: config.rolling_capacity,
        }
    }

    /// Registers a session ahead of its first chunk. Returns false when
    /// it already exists; existing state is kept.
    pub fn start_session(&mut self, id: &SessionId) -> bool {
        if self.sessions.contains_key(id) {
            return false;
        }
        self.sessions
            .insert(id.clone(), SessionState::new(self.rolling_capacity));
        true
    }

    /// Appends one feature sample, creating the session on first use.
    /// History stays timestamp-ordered and trimmed to the retention
    /// span behind its newest sample.
    pub fn append(&mut self, id: &SessionId, sample: FeatureSample) {
        let state = self
            .sessions
            .entry(id.clone())
            .or_insert_with(|| SessionState::new(self.rolling_capacity));
        state.insert_ordered(sample);
        state.evict_expired(self.retention_ms);
        state.rolling.push(sample.volume, sample.pitch);
    }

    /// Retained samples with timestamps in `[start_ms, end_ms]`, oldest
    /// first. Unknown sessions yield an empty vec.
    pub fn window_samples(&self, id: &SessionId, start_ms: i64, end_ms: i64) -> Vec<FeatureSample> {
        let Some(state) = self.sessions.get(id) else {
            return Vec::new();
        };
        state
            .history
            .iter()
            .filter(|s| s.timestamp_ms >= start_ms && s.timestamp_ms <= end_ms)
            .copied()
            .collect()
    }

    pub fn rolling_averages(&self, id: &SessionId) -> Option<RollingAverages> {
        self.sessions.get(id).map(|state| state.rolling.averages())
    }

    /// Drops all state for a session. Returns false when it was not
    /// present, so releases are idempotent.
    pub fn release(&mut self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(&EngineConfig::default())
    }

    fn id(name: &str) -> SessionId {
        SessionId::new(name).expect("valid id")
    }

    fn sample(timestamp_ms: i64, volume: f32) -> FeatureSample {
        FeatureSample {
            timestamp_ms,
            volume,
            pitch: None,
        }
    }

    #[test]
    fn append_creates_the_session_lazily() {
        let mut store = store();
        let session = id("s1");
        assert!(!store.contains(&session));
        store.append(&session, sample(0, 10.0));
        assert!(store.contains(&session));
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn start_session_is_idempotent_and_preserves_state() {
        let mut store = store();
        let session = id("s1");
        assert!(store.start_session(&session));
        store.append(&session, sample(0, 10.0));
        assert!(!store.start_session(&session));
        assert_eq!(store.window_samples(&session, 0, 100).len(), 1);
    }

    #[test]
    fn history_span_respects_retention() {
        let mut store = store();
        let session = id("s1");
        for ts in (0..=6_000).step_by(1_000) {
            store.append(&session, sample(ts, 10.0));
        }
        let samples = store.window_samples(&session, i64::MIN, i64::MAX);
        let oldest = samples.first().expect("non-empty").timestamp_ms;
        let newest = samples.last().expect("non-empty").timestamp_ms;
        assert_eq!(newest, 6_000);
        assert_eq!(oldest, 1_000);
        assert!(newest - oldest <= 5_000);
    }

    #[test]
    fn out_of_order_appends_keep_history_sorted() {
        let mut store = store();
        let session = id("s1");
        for ts in [100, 300, 200, 50] {
            store.append(&session, sample(ts, 10.0));
        }
        let timestamps: Vec<i64> = store
            .window_samples(&session, i64::MIN, i64::MAX)
            .iter()
            .map(|s| s.timestamp_ms)
            .collect();
        assert_eq!(timestamps, vec![50, 100, 200, 300]);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let mut store = store();
        let session = id("s1");
        for ts in [100, 200, 300, 400] {
            store.append(&session, sample(ts, 10.0));
        }
        let samples = store.window_samples(&session, 200, 300);
        let timestamps: Vec<i64> = samples.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(timestamps, vec![200, 300]);
    }

    #[test]
    fn unknown_sessions_read_as_empty() {
        let store = store();
        let session = id("ghost");
        assert!(store.window_samples(&session, 0, 1_000).is_empty());
        assert_eq!(store.rolling_averages(&session), None);
    }

    #[test]
    fn rolling_window_caps_at_configured_capacity() {
        let mut store = store();
        let session = id("s1");
        for ts in 0..15 {
            store.append(&session, sample(ts, ts as f32));
        }
        let averages = store.rolling_averages(&session).expect("known session");
        assert_eq!(averages.samples, 10);
        // Entries 5..=14 survive.
        assert!((averages.avg_volume - 9.5).abs() < 1e-4);
    }

    #[test]
    fn release_drops_state_and_is_idempotent() {
        let mut store = store();
        let session = id("s1");
        store.append(&session, sample(0, 10.0));
        assert!(store.release(&session));
        assert!(!store.release(&session));
        assert!(store.window_samples(&session, 0, 100).is_empty());
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn sessions_do_not_share_state() {
        let mut store = store();
        let first = id("s1");
        let second = id("s2");
        store.append(&first, sample(0, 10.0));
        store.append(&second, sample(0, 90.0));
        let first_avg = store.rolling_averages(&first).expect("known session");
        let second_avg = store.rolling_averages(&second).expect("known session");
        assert!((first_avg.avg_volume - 10.0).abs() < 1e-4);
        assert!((second_avg.avg_volume - 90.0).abs() < 1e-4);
    }
}
