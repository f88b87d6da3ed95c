//! In-process event bus for cross-component notification.
//!
//! The dashboard broadcast status changes between components (the KYC page
//! updating the header badge, for example). Here that is a typed
//! [`tokio::sync::broadcast`] channel: services publish [`AppEvent`]s,
//! subscribers receive them, and the long-poll endpoint relays them to
//! clients. Publishing with no subscribers is fine; events are
//! fire-and-forget.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Domain events published on the bus.
///
/// Serialized with a `type` tag so clients can switch on the event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// A merchant's KYC status moved (submitted, verified, rejected).
    KycStatusChanged { user_id: Uuid, status: String },

    /// A payout request was processed or failed.
    PayoutStatusChanged {
        user_id: Uuid,
        payout_id: Uuid,
        status: String,
    },

    /// A refund request was processed or rejected.
    RefundStatusChanged {
        user_id: Uuid,
        refund_id: Uuid,
        status: String,
    },

    /// A settlement batch was created for a merchant.
    SettlementCreated {
        user_id: Uuid,
        settlement_id: Uuid,
    },
}

impl AppEvent {
    /// The merchant this event concerns, used to scope delivery per session.
    pub fn user_id(&self) -> Uuid {
        match self {
            AppEvent::KycStatusChanged { user_id, .. }
            | AppEvent::PayoutStatusChanged { user_id, .. }
            | AppEvent::RefundStatusChanged { user_id, .. }
            | AppEvent::SettlementCreated { user_id, .. } => *user_id,
        }
    }
}

/// Shared handle to the broadcast channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` undelivered events per
    /// subscriber before older ones are dropped.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: AppEvent) {
        match self.tx.send(event) {
            Ok(n) => tracing::debug!("event delivered to {n} subscribers"),
            // send() errors only when nobody is listening.
            Err(_) => tracing::debug!("event published with no subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let user_id = Uuid::new_v4();
        bus.publish(AppEvent::KycStatusChanged {
            user_id,
            status: "submitted".to_string(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.user_id(), user_id);
        match event {
            AppEvent::KycStatusChanged { status, .. } => assert_eq!(status, "submitted"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new(8);
        bus.publish(AppEvent::SettlementCreated {
            user_id: Uuid::new_v4(),
            settlement_id: Uuid::new_v4(),
        });
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = AppEvent::PayoutStatusChanged {
            user_id: Uuid::new_v4(),
            payout_id: Uuid::new_v4(),
            status: "processed".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "payout_status_changed");
        assert_eq!(json["status"], "processed");
    }
}
