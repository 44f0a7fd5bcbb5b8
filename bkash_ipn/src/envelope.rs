use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::IpnError;

const KEY_TYPE: &str = "Type";
const KEY_MESSAGE_ID: &str = "MessageId";
const KEY_TOPIC: &str = "TopicArn";
const KEY_MESSAGE: &str = "Message";
const KEY_SUBJECT: &str = "Subject";
const KEY_TIMESTAMP: &str = "Timestamp";
const KEY_SIGNATURE_VERSION: &str = "SignatureVersion";
const KEY_SIGNATURE: &str = "Signature";
const KEY_SIGNING_CERT_URL: &str = "SigningCertURL";
const KEY_SUBSCRIBE_URL: &str = "SubscribeURL";
const KEY_UNSUBSCRIBE_URL: &str = "UnsubscribeURL";
const KEY_TOKEN: &str = "Token";

const KNOWN_KEYS: [&str; 12] = [
    KEY_TYPE,
    KEY_MESSAGE_ID,
    KEY_TOPIC,
    KEY_MESSAGE,
    KEY_SUBJECT,
    KEY_TIMESTAMP,
    KEY_SIGNATURE_VERSION,
    KEY_SIGNATURE,
    KEY_SIGNING_CERT_URL,
    KEY_SUBSCRIBE_URL,
    KEY_UNSUBSCRIBE_URL,
    KEY_TOKEN,
];

//--------------------------------------   NotificationKind   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    Notification,
    SubscriptionConfirmation,
    UnsubscribeConfirmation,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notification => "Notification",
            Self::SubscriptionConfirmation => "SubscriptionConfirmation",
            Self::UnsubscribeConfirmation => "UnsubscribeConfirmation",
        }
    }

    /// Subscription lifecycle messages carry `SubscribeURL` and `Token`, and sign a different field set.
    pub fn is_lifecycle(&self) -> bool {
        !matches!(self, Self::Notification)
    }
}

impl FromStr for NotificationKind {
    type Err = IpnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Notification" => Ok(Self::Notification),
            "SubscriptionConfirmation" => Ok(Self::SubscriptionConfirmation),
            "UnsubscribeConfirmation" => Ok(Self::UnsubscribeConfirmation),
            other => Err(IpnError::MalformedPayload(format!("Unrecognised notification type '{other}'"))),
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//-------------------------------------   NotificationEnvelope   ------------------------------------------------------
/// One inbound push message, as delivered by the notification relay.
///
/// An envelope can only be obtained through [`NotificationEnvelope::from_slice`] or
/// [`NotificationEnvelope::from_value`], both of which guarantee that every field required for its `kind` is present
/// and non-empty. Unknown keys are kept in `extra`.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEnvelope {
    pub kind: NotificationKind,
    pub message_id: String,
    pub topic_id: String,
    /// The embedded payload, exactly as transmitted. For payment notifications this is itself a JSON document.
    pub message: String,
    pub subject: Option<String>,
    /// The timestamp string as transmitted. This is what gets signed.
    pub timestamp: String,
    pub issued_at: DateTime<Utc>,
    pub signature_version: String,
    pub signature: String,
    pub signing_cert_url: String,
    pub subscribe_url: Option<String>,
    pub unsubscribe_url: Option<String>,
    pub token: Option<String>,
    pub extra: Map<String, Value>,
}

impl NotificationEnvelope {
    /// Parses a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, IpnError> {
        let value = serde_json::from_slice::<Value>(body)
            .map_err(|e| IpnError::MalformedPayload(format!("Body is not valid JSON. {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, IpnError> {
        let Value::Object(mut obj) = value else {
            return Err(IpnError::MalformedPayload("Body is not a JSON object".to_string()));
        };
        let kind = required(&obj, KEY_TYPE)?.parse::<NotificationKind>()?;
        let message_id = required(&obj, KEY_MESSAGE_ID)?;
        let topic_id = required(&obj, KEY_TOPIC)?;
        let message = required(&obj, KEY_MESSAGE)?;
        let timestamp = required(&obj, KEY_TIMESTAMP)?;
        let signature_version = required(&obj, KEY_SIGNATURE_VERSION)?;
        let signature = required(&obj, KEY_SIGNATURE)?;
        let signing_cert_url = required(&obj, KEY_SIGNING_CERT_URL)?;
        let (subscribe_url, token) = if kind.is_lifecycle() {
            (Some(required(&obj, KEY_SUBSCRIBE_URL)?), Some(required(&obj, KEY_TOKEN)?))
        } else {
            (optional(&obj, KEY_SUBSCRIBE_URL)?, optional(&obj, KEY_TOKEN)?)
        };
        // An empty subject is treated the same as a missing one.
        let subject = optional(&obj, KEY_SUBJECT)?.filter(|s| !s.is_empty());
        let unsubscribe_url = optional(&obj, KEY_UNSUBSCRIBE_URL)?;
        let issued_at = DateTime::parse_from_rfc3339(&timestamp)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| IpnError::MalformedPayload(format!("Invalid {KEY_TIMESTAMP} '{timestamp}'. {e}")))?;
        for key in KNOWN_KEYS {
            obj.remove(key);
        }
        Ok(Self {
            kind,
            message_id,
            topic_id,
            message,
            subject,
            timestamp,
            issued_at,
            signature_version,
            signature,
            signing_cert_url,
            subscribe_url,
            unsubscribe_url,
            token,
            extra: obj,
        })
    }
}

fn optional(obj: &Map<String, Value>, key: &str) -> Result<Option<String>, IpnError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(IpnError::MalformedPayload(format!("Field '{key}' must be a string"))),
    }
}

fn required(obj: &Map<String, Value>, key: &str) -> Result<String, IpnError> {
    match optional(obj, key)? {
        Some(s) if !s.is_empty() => Ok(s),
        Some(_) => Err(IpnError::MalformedPayload(format!("Required field '{key}' is empty"))),
        None => Err(IpnError::MalformedPayload(format!("Required field '{key}' is missing"))),
    }
}
