use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{NotificationKind, PaymentEvent};

/// A payment notification that passed signature verification (and corroboration, if enabled).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpnReceivedEvent {
    pub message_id: String,
    pub topic_id: String,
    pub received_at: DateTime<Utc>,
    pub payment: PaymentEvent,
    /// True if the transaction was confirmed independently with the gateway.
    pub corroborated: bool,
}

impl IpnReceivedEvent {
    pub fn new<S1: Into<String>, S2: Into<String>>(message_id: S1, topic_id: S2, payment: PaymentEvent) -> Self {
        Self {
            message_id: message_id.into(),
            topic_id: topic_id.into(),
            received_at: Utc::now(),
            payment,
            corroborated: false,
        }
    }

    pub fn corroborated(mut self, corroborated: bool) -> Self {
        self.corroborated = corroborated;
        self
    }
}

/// An authenticated subscription or unsubscription message for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionEvent {
    pub kind: NotificationKind,
    pub topic_id: String,
    pub subscribe_url: String,
    /// True if the service visited `subscribe_url` to confirm the subscription.
    pub confirmed: bool,
}
