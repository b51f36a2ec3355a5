use tokio::sync::broadcast;

use lms_common::types::Notification;
use lms_engine::NotificationSink;

/// Publishes notifications on a tokio broadcast channel.
///
/// Sending never blocks; with no subscribers the notification is dropped,
/// and a lagging subscriber loses the oldest entries.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl NotificationSink for BroadcastSink {
    fn notify(&self, notification: &Notification) {
        if self.tx.send(notification.clone()).is_err() {
            tracing::trace!(resource = %notification.resource, "No notification subscribers");
        }
    }
}
