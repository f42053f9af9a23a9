use super::types::BracketEvent;
use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

#[derive(Debug, Error)]
pub enum EventSinkError {
    #[error("event channel closed")]
    ChannelClosed,

    #[error("event channel full")]
    ChannelFull,

    #[error("event sink unavailable: {0}")]
    Unavailable(String),
}

/// Accepts events for publication. Implementations must not wait on a
/// slow consumer: callers publish after their write has committed.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: BracketEvent) -> impl Future<Output = Result<(), EventSinkError>> + Send;
}

impl EventSink for mpsc::Sender<BracketEvent> {
    async fn publish(&self, event: BracketEvent) -> Result<(), EventSinkError> {
        self.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => EventSinkError::ChannelFull,
            TrySendError::Closed(_) => EventSinkError::ChannelClosed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{DEFAULT_CHANNEL_BUFFER, bracket_event_channel};
    use std::time::Duration;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_channel_sink() {
        let (tx, mut rx) = bracket_event_channel();
        let event = BracketEvent::BracketGenerated {
            tournament_id: Uuid::new_v4(),
            rounds: 2,
            matches: 3,
        };
        tx.publish(event.clone()).await.unwrap();
        assert_eq!(rx.recv().await, Some(event.clone()));

        drop(rx);
        assert!(matches!(
            tx.publish(event.clone()).await,
            Err(EventSinkError::ChannelClosed)
        ));
    }

    #[tokio::test]
    async fn test_full_channel_rejects_without_waiting() {
        let (tx, mut rx) = bracket_event_channel();
        let event = BracketEvent::BracketGenerated {
            tournament_id: Uuid::new_v4(),
            rounds: 1,
            matches: 1,
        };
        for _ in 0..DEFAULT_CHANNEL_BUFFER {
            tx.publish(event.clone()).await.unwrap();
        }

        let overflow = tokio::time::timeout(Duration::from_secs(1), tx.publish(event.clone()))
            .await
            .unwrap();
        assert!(matches!(overflow, Err(EventSinkError::ChannelFull)));

        rx.recv().await.unwrap();
        assert!(tx.publish(event).await.is_ok());
    }
}
