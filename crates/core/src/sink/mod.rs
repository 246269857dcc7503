mod channel;
mod dummy;

use futures::future::BoxFuture;

use crate::events::EmotionEvent;

pub use channel::ChannelSink;
pub use dummy::DummySink;

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("emotion receiver closed")]
    Closed,
    #[error("emission failed: {0}")]
    Delivery(String),
}

/// Transport-facing side of the engine. The engine hands every emission
/// to a sink and treats delivery failure as fatal for the run.
pub trait EmotionSink: Send + Sync {
    fn emit(&self, event: EmotionEvent) -> BoxFuture<'_, Result<(), SinkError>>;
}
