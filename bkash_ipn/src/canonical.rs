use crate::{NotificationEnvelope, NotificationKind};

fn push_pair(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push('\n');
    out.push_str(value);
    out.push('\n');
}

/// Builds the exact string the relay signed for this envelope.
///
/// Each signed field contributes its name and value, each followed by a newline, in a fixed order that depends on the
/// notification kind. Values are used verbatim; in particular the timestamp is the string as transmitted, not a
/// re-rendering of the parsed time.
pub fn canonical_string(envelope: &NotificationEnvelope) -> String {
    let mut out = String::with_capacity(envelope.message.len() + 256);
    match envelope.kind {
        NotificationKind::Notification => {
            push_pair(&mut out, "Message", &envelope.message);
            push_pair(&mut out, "MessageId", &envelope.message_id);
            if let Some(subject) = envelope.subject.as_deref().filter(|s| !s.is_empty()) {
                push_pair(&mut out, "Subject", subject);
            }
            push_pair(&mut out, "Timestamp", &envelope.timestamp);
            push_pair(&mut out, "TopicArn", &envelope.topic_id);
        },
        NotificationKind::SubscriptionConfirmation | NotificationKind::UnsubscribeConfirmation => {
            push_pair(&mut out, "Message", &envelope.message);
            push_pair(&mut out, "MessageId", &envelope.message_id);
            push_pair(&mut out, "SubscribeURL", envelope.subscribe_url.as_deref().unwrap_or_default());
            push_pair(&mut out, "Timestamp", &envelope.timestamp);
            push_pair(&mut out, "Token", envelope.token.as_deref().unwrap_or_default());
            push_pair(&mut out, "TopicArn", &envelope.topic_id);
        },
    }
    push_pair(&mut out, "Type", envelope.kind.as_str());
    out
}
