use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::Emotion;

/// Opaque caller-chosen identifier for one audio/transcript stream.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, InvalidSessionId> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(InvalidSessionId);
        }
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = InvalidSessionId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("session id must not be empty")]
pub struct InvalidSessionId;

/// One word of a finalized transcript with its timing on the session
/// timeline.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WordTiming {
    pub text: String,
    pub start_ms: i64,
    pub end_ms: i64,
}

/// A finalized transcript turn. `words` may be empty when the upstream
/// recognizer produced no per-word timings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TranscriptTurn {
    pub text: String,
    pub confidence: f32,
    pub words: Vec<WordTiming>,
}

/// Inbound events driving the engine. Timestamps are milliseconds on
/// whatever epoch the caller uses, as long as it is consistent per
/// session.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Start {
        session_id: SessionId,
    },
    Audio {
        session_id: SessionId,
        pcm: Bytes,
        timestamp_ms: i64,
    },
    Turn {
        session_id: SessionId,
        turn: TranscriptTurn,
        received_at_ms: i64,
    },
    End {
        session_id: SessionId,
    },
}

impl SessionEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::Start { session_id }
            | Self::Audio { session_id, .. }
            | Self::Turn { session_id, .. }
            | Self::End { session_id } => session_id,
        }
    }
}

/// Outbound emotion estimates.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmotionEvent {
    Continuous(ContinuousEmotion),
    Turn(TurnEmotion),
}

impl EmotionEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::Continuous(e) => &e.session_id,
            Self::Turn(e) => &e.session_id,
        }
    }
}

/// Per-chunk estimate. `volume` and `pitch` are the chunk's own
/// measurements; the emotion fields come from the smoothed rolling
/// window. An unvoiced chunk reports `pitch` 0.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContinuousEmotion {
    pub session_id: SessionId,
    pub volume: f32,
    pub pitch: f32,
    pub emotion: Emotion,
    pub confidence: f32,
    pub visual_style: String,
    pub timestamp_ms: i64,
}

/// Turn-aligned estimate over the acoustic window of one finalized
/// turn. `timestamp_ms` is the turn's arrival time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TurnEmotion {
    pub session_id: SessionId,
    pub emotion: Emotion,
    pub confidence: f32,
    pub visual_style: String,
    pub avg_volume: f32,
    pub avg_pitch: f32,
    pub wpm: f32,
    pub transcript: String,
    pub timestamp_ms: i64,
}
