//! Alignment of finalized transcript turns with acoustic history.

mod align;
mod rate;

pub use align::TurnAligner;
pub use rate::words_per_minute;

/// Acoustic aggregates over one turn's window, ready for
/// classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnFeatures {
    pub avg_volume: f32,
    /// Voiced-sample average, 0 when nothing in the window was voiced.
    pub avg_pitch: f32,
    pub wpm: f32,
    pub window_start_ms: i64,
    pub window_end_ms: i64,
}
