use lms_common::types::{Notification, NotificationKind};
use lms_engine::NotificationSink;

/// Logs each notification. Failures are warnings, the rest info.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Pending => tracing::info!(
                resource = %notification.resource,
                "New data available"
            ),
            NotificationKind::Updated => tracing::info!(
                resource = %notification.resource,
                at = %notification.timestamp,
                "Data refreshed"
            ),
            NotificationKind::Failed => tracing::warn!(
                resource = %notification.resource,
                error = notification.error.as_deref().unwrap_or("unknown"),
                "Refresh failed"
            ),
        }
    }
}
