//! Shared application state for the Axum API server.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use lms_common::config::AppConfig;
use lms_common::types::Notification;
use lms_engine::{ActionRunner, Synchronizer};
use lms_engine::simulator::EventLog;

/// Number of notifications kept for `GET /api/notifications`.
pub const NOTIFICATION_FEED_CAPACITY: usize = 50;

/// Most recent notifications, newest first.
#[derive(Debug, Clone, Default)]
pub struct NotificationFeed {
    items: Arc<Mutex<VecDeque<Notification>>>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notification: Notification) {
        let mut items = self.items.lock();
        items.push_front(notification);
        items.truncate(NOTIFICATION_FEED_CAPACITY);
    }

    pub fn recent(&self) -> Vec<Notification> {
        self.items.lock().iter().cloned().collect()
    }

    /// Drain a broadcast receiver into the feed until the sender is gone.
    pub async fn follow(self, mut rx: broadcast::Receiver<Notification>) {
        loop {
            match rx.recv().await {
                Ok(notification) => self.push(notification),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Notification feed lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub sync: Synchronizer,
    pub actions: ActionRunner,
    pub events: EventLog,
    pub notifications: NotificationFeed,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(sync: Synchronizer, actions: ActionRunner, events: EventLog, config: AppConfig) -> Self {
        Self {
            sync,
            actions,
            events,
            notifications: NotificationFeed::new(),
            config,
        }
    }
}
