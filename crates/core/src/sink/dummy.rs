use futures::future::BoxFuture;
use futures::FutureExt;

use crate::events::EmotionEvent;
use crate::sink::{EmotionSink, SinkError};

/// Discards every emission. Useful in tests and for running the engine
/// for its stats alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct DummySink;

impl EmotionSink for DummySink {
    fn emit(&self, _event: EmotionEvent) -> BoxFuture<'_, Result<(), SinkError>> {
        async { Ok(()) }.boxed()
    }
}
