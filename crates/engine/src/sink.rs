use lms_common::types::Notification;

/// Receives synchronizer state changes.
///
/// Called after the synchronizer lock is released, once per change:
/// `Pending` only on a false→true flag transition, `Updated` after every
/// successful fetch, `Failed` after every failed one.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}
