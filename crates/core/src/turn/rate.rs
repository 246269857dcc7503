use crate::events::WordTiming;

/// Speech rate in words per minute over a turn's word timings.
///
/// Fewer than two words, or a non-positive span between the first
/// word's start and the last word's end, is too little signal to call a
/// rate and yields 0.
pub fn words_per_minute(words: &[WordTiming]) -> f32 {
    if words.len() < 2 {
        return 0.0;
    }
    let span_ms = words[words.len() - 1].end_ms - words[0].start_ms;
    if span_ms <= 0 {
        return 0.0;
    }
    let duration_minutes = span_ms as f32 / 60_000.0;
    words.len() as f32 / duration_minutes
}
