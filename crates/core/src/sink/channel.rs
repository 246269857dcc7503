use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;

use crate::events::EmotionEvent;
use crate::sink::{EmotionSink, SinkError};

/// Bridges emissions onto a bounded tokio channel for a transport task
/// to relay.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<EmotionEvent>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<EmotionEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl EmotionSink for ChannelSink {
    fn emit(&self, event: EmotionEvent) -> BoxFuture<'_, Result<(), SinkError>> {
        async move { self.tx.send(event).await.map_err(|_| SinkError::Closed) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Emotion;
    use crate::events::{ContinuousEmotion, SessionId};

    fn continuous_event() -> EmotionEvent {
        EmotionEvent::Continuous(ContinuousEmotion {
            session_id: SessionId::new("s1").expect("valid id"),
            volume: 40.0,
            pitch: 180.0,
            emotion: Emotion::Neutral,
            confidence: 0.5,
            visual_style: "steady-glow".to_owned(),
            timestamp_ms: 0,
        })
    }

    #[tokio::test]
    async fn emitted_events_arrive_in_order() {
        let (sink, mut rx) = ChannelSink::new(4);
        sink.emit(continuous_event()).await.expect("receiver open");
        sink.emit(continuous_event()).await.expect("receiver open");
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn emitting_after_receiver_drop_reports_closed() {
        let (sink, rx) = ChannelSink::new(4);
        drop(rx);
        let err = sink.emit(continuous_event()).await.expect_err("closed");
        assert!(matches!(err, SinkError::Closed));
    }
}
