//! In-process notification bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`NotificationBus`] is shared via `Arc<NotificationBus>` between the
//! hooks layer (publisher) and every view rendering toasts (subscribers).

use tokio::sync::broadcast;

use crate::notification::Notification;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest notifications are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notification to all current subscribers.
    ///
    /// Without subscribers the notification is dropped; it is still logged.
    pub fn publish(&self, notification: Notification) {
        if notification.is_error() {
            tracing::warn!(
                title = %notification.title,
                source = notification.source.as_deref().unwrap_or("-"),
                "{}",
                notification.message,
            );
        } else {
            tracing::debug!(title = %notification.title, "Notification published");
        }
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(notification);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barbearia_core::CoreError;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = NotificationBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            Notification::from_error(&CoreError::Conflict("slot taken".into()))
                .with_source("appointment.create"),
        );

        let received = rx.recv().await.expect("should receive the notification");
        assert_eq!(received.title, "Conflito");
        assert_eq!(received.source.as_deref(), Some("appointment.create"));
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_notification() {
        let bus = NotificationBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(Notification::info("Unidade alterada", "Centro"));

        let n1 = rx1.recv().await.expect("subscriber 1 should receive");
        let n2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(n1.id, n2.id);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = NotificationBus::default();
        bus.publish(Notification::success("Salvo", ""));
    }
}
