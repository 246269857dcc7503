//! Line-delimited JSON wire format for `--events` mode.
//!
//! Each stdin line is one inbound message; PCM payloads ride along as
//! base64 so the whole stream stays plain text. Outbound lines are the
//! core `EmotionEvent` serialization unchanged.

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use voice_emotion_core::events::{SessionEvent, SessionId, TranscriptTurn, WordTiming};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    SessionStart {
        session_id: String,
    },
    AudioChunk {
        session_id: String,
        pcm_base64: String,
        timestamp_ms: i64,
    },
    TurnFinalized {
        session_id: String,
        transcript: String,
        confidence: f32,
        #[serde(default)]
        words: Vec<WordTiming>,
        received_at_ms: i64,
    },
    SessionEnd {
        session_id: String,
    },
}

impl InboundMessage {
    pub fn into_event(self) -> anyhow::Result<SessionEvent> {
        match self {
            Self::SessionStart { session_id } => Ok(SessionEvent::Start {
                session_id: SessionId::new(session_id)?,
            }),
            Self::AudioChunk {
                session_id,
                pcm_base64,
                timestamp_ms,
            } => {
                let pcm = STANDARD
                    .decode(pcm_base64.as_bytes())
                    .context("invalid base64 pcm payload")?;
                Ok(SessionEvent::Audio {
                    session_id: SessionId::new(session_id)?,
                    pcm: Bytes::from(pcm),
                    timestamp_ms,
                })
            }
            Self::TurnFinalized {
                session_id,
                transcript,
                confidence,
                words,
                received_at_ms,
            } => Ok(SessionEvent::Turn {
                session_id: SessionId::new(session_id)?,
                turn: TranscriptTurn {
                    text: transcript,
                    confidence,
                    words,
                },
                received_at_ms,
            }),
            Self::SessionEnd { session_id } => Ok(SessionEvent::End {
                session_id: SessionId::new(session_id)?,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_chunk_lines_decode_to_audio_events() {
        // Two little-endian samples: 1 and -1.
        let encoded = STANDARD.encode([0x01, 0x00, 0xFF, 0xFF]);
        let line = format!(
            "{{\"type\":\"audio_chunk\",\"session_id\":\"s1\",\"pcm_base64\":\"{encoded}\",\"timestamp_ms\":250}}"
        );
        let message: InboundMessage = serde_json::from_str(&line).expect("valid line");
        let event = message.into_event().expect("valid message");
        let SessionEvent::Audio {
            session_id,
            pcm,
            timestamp_ms,
        } = event
        else {
            panic!("expected audio event");
        };
        assert_eq!(session_id.as_str(), "s1");
        assert_eq!(pcm.as_ref(), &[0x01, 0x00, 0xFF, 0xFF]);
        assert_eq!(timestamp_ms, 250);
    }

    #[test]
    fn turn_lines_may_omit_words() {
        let line = "{\"type\":\"turn_finalized\",\"session_id\":\"s1\",\
                    \"transcript\":\"uh huh\",\"confidence\":0.7,\"received_at_ms\":9000}";
        let message: InboundMessage = serde_json::from_str(line).expect("valid line");
        let event = message.into_event().expect("valid message");
        let SessionEvent::Turn { turn, .. } = event else {
            panic!("expected turn event");
        };
        assert_eq!(turn.text, "uh huh");
        assert!(turn.words.is_empty());
    }

    #[test]
    fn turn_lines_carry_word_timings() {
        let line = "{\"type\":\"turn_finalized\",\"session_id\":\"s1\",\
                    \"transcript\":\"hello there\",\"confidence\":0.92,\
                    \"words\":[{\"text\":\"hello\",\"start_ms\":100,\"end_ms\":400},\
                    {\"text\":\"there\",\"start_ms\":450,\"end_ms\":800}],\
                    \"received_at_ms\":900}";
        let message: InboundMessage = serde_json::from_str(line).expect("valid line");
        let event = message.into_event().expect("valid message");
        let SessionEvent::Turn {
            turn,
            received_at_ms,
            ..
        } = event
        else {
            panic!("expected turn event");
        };
        assert_eq!(turn.words.len(), 2);
        assert_eq!(turn.words[0].text, "hello");
        assert_eq!(turn.words[1].end_ms, 800);
        assert_eq!(received_at_ms, 900);
    }

    #[test]
    fn lifecycle_lines_decode() {
        let start: InboundMessage =
            serde_json::from_str("{\"type\":\"session_start\",\"session_id\":\"s1\"}")
                .expect("valid line");
        assert!(matches!(
            start.into_event().expect("valid message"),
            SessionEvent::Start { .. }
        ));
        let end: InboundMessage =
            serde_json::from_str("{\"type\":\"session_end\",\"session_id\":\"s1\"}")
                .expect("valid line");
        assert!(matches!(
            end.into_event().expect("valid message"),
            SessionEvent::End { .. }
        ));
    }

    #[test]
    fn corrupt_base64_is_rejected() {
        let message = InboundMessage::AudioChunk {
            session_id: "s1".to_owned(),
            pcm_base64: "not@base64!".to_owned(),
            timestamp_ms: 0,
        };
        assert!(message.into_event().is_err());
    }

    #[test]
    fn blank_session_ids_are_rejected() {
        let message = InboundMessage::SessionStart {
            session_id: "  ".to_owned(),
        };
        assert!(message.into_event().is_err());
    }
}
