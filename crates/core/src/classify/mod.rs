//! Rule-based emotion classification over prosodic features.
//!
//! Every estimate, continuous or turn-aligned, funnels through
//! [`classify`]: volume (0-100) is converted to dBFS, then an ordered
//! rule table is scanned top-down and the first matching rule wins.
//! The ordering is part of the contract; a loud, high, fast utterance
//! satisfies several predicates and must come out `excited`, not
//! `happy`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Floor applied when volume is zero and the log is undefined.
pub const SILENCE_FLOOR_DB: f32 = -60.0;
/// Confidence reported when no rule matches.
pub const NEUTRAL_CONFIDENCE: f32 = 0.5;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Excited,
    Sad,
    Angry,
    Happy,
    Calm,
    Neutral,
}

impl Emotion {
    /// Rendering hint consumers map to an animation preset.
    pub fn visual_style(&self) -> &'static str {
        match self {
            Self::Excited => "vivid-pulse",
            Self::Sad => "slow-fade",
            Self::Angry => "hard-strobe",
            Self::Happy => "warm-glow",
            Self::Calm => "soft-drift",
            Self::Neutral => "steady-glow",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excited => "excited",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Happy => "happy",
            Self::Calm => "calm",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The feature vector a classification was derived from, echoed back so
/// consumers can display or log it.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct FeatureSnapshot {
    pub volume: f32,
    pub pitch: f32,
    pub wpm: f32,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Classification {
    pub emotion: Emotion,
    pub confidence: f32,
    pub visual_style: &'static str,
    pub features: FeatureSnapshot,
}

impl Classification {
    pub fn neutral(features: FeatureSnapshot) -> Self {
        Self {
            emotion: Emotion::Neutral,
            confidence: NEUTRAL_CONFIDENCE,
            visual_style: Emotion::Neutral.visual_style(),
            features,
        }
    }
}

struct Rule {
    emotion: Emotion,
    confidence: f32,
    matches: fn(db: f32, pitch_hz: f32, wpm: f32) -> bool,
}

// Evaluated top-down; first match wins.
const RULES: &[Rule] = &[
    Rule {
        emotion: Emotion::Excited,
        confidence: 0.8,
        matches: |db, pitch_hz, wpm| db > -15.0 && pitch_hz > 200.0 && wpm > 160.0,
    },
    Rule {
        emotion: Emotion::Sad,
        confidence: 0.7,
        matches: |db, pitch_hz, wpm| db < -25.0 && pitch_hz < 150.0 && wpm < 100.0,
    },
    Rule {
        emotion: Emotion::Angry,
        confidence: 0.6,
        matches: |db, _pitch_hz, wpm| db > -10.0 && wpm < 120.0,
    },
    Rule {
        emotion: Emotion::Happy,
        confidence: 0.7,
        matches: |_db, pitch_hz, wpm| pitch_hz > 180.0 && wpm > 140.0,
    },
    Rule {
        emotion: Emotion::Calm,
        confidence: 0.6,
        matches: |_db, pitch_hz, wpm| pitch_hz < 120.0 && wpm < 80.0,
    },
];

/// Converts a 0-100 volume to dBFS, with 100 mapping to 0 dB.
pub fn volume_db(volume: f32) -> f32 {
    if volume > 0.0 {
        20.0 * (volume / 100.0).log10()
    } else {
        SILENCE_FLOOR_DB
    }
}

/// Classifies a feature vector. `pitch_hz` 0 means unvoiced; `wpm` 0
/// means no speech-rate signal (continuous mode always passes 0).
pub fn classify(volume: f32, pitch_hz: f32, wpm: f32) -> Classification {
    let db = volume_db(volume);
    let features = FeatureSnapshot {
        volume,
        pitch: pitch_hz,
        wpm,
    };
    for rule in RULES {
        if (rule.matches)(db, pitch_hz, wpm) {
            return Classification {
                emotion: rule.emotion,
                confidence: rule.confidence,
                visual_style: rule.emotion.visual_style(),
                features,
            };
        }
    }
    Classification::neutral(features)
}
