//! The IPN webhook.
//!
//! Status codes matter here: the relay retries any delivery that is not answered with a 2xx. Transient failures
//! (fetching the signing certificate, reaching the gateway) therefore answer 503, while forged or malformed messages
//! answer 4xx and are never retried successfully.
use actix_web::{web, HttpRequest, HttpResponse};
use bkash_ipn::{
    events::{EventProducers, IpnReceivedEvent, SubscriptionEvent},
    CertHostPolicy,
    CertificateSource,
    IpnVerifier,
    NotificationEnvelope,
    NotificationKind,
    VerifiedNotification,
};
use log::*;

use crate::{
    config::IpnOptions,
    data_objects::JsonResponse,
    errors::ServerError,
    integrations::{
        bkash::{corroborate, TransactionLookup},
        sns::SubscriptionConfirmer,
    },
    route,
};

/// Set by the relay on every delivery. Must agree with the `Type` in the body when present.
pub const SNS_MESSAGE_TYPE_HEADER: &str = "x-amz-sns-message-type";
pub const MAX_IPN_BODY_SIZE: usize = 64 * 1024;

route!(payment_notification => Post "/bkash/ipn" impl CertificateSource, TransactionLookup, SubscriptionConfirmer);
pub async fn payment_notification<S, L, C>(
    req: HttpRequest,
    body: web::Bytes,
    verifier: web::Data<IpnVerifier<S>>,
    lookup: web::Data<L>,
    confirmer: web::Data<C>,
    options: web::Data<IpnOptions>,
    producers: web::Data<EventProducers>,
) -> Result<HttpResponse, ServerError>
where
    S: CertificateSource,
    L: TransactionLookup,
    C: SubscriptionConfirmer,
{
    trace!("🔔️ Received IPN request ({} bytes) from {:?}", body.len(), req.peer_addr());
    let envelope = NotificationEnvelope::from_slice(&body).map_err(|e| {
        info!("🔔️ Rejected IPN request. {e}");
        e
    })?;
    check_message_type_header(&req, &envelope)?;
    let verified = verifier.verify_envelope(&envelope).await?;
    match verified.kind() {
        NotificationKind::Notification => {
            handle_payment_notification(verified, lookup.as_ref(), options.as_ref(), producers.as_ref()).await
        },
        NotificationKind::SubscriptionConfirmation => {
            let policy = verifier.certificates().policy();
            handle_subscription_confirmation(verified, policy, confirmer.as_ref(), options.as_ref(), producers.as_ref())
                .await
        },
        NotificationKind::UnsubscribeConfirmation => {
            let envelope = verified.envelope();
            warn!(
                "🔔️ The relay reports that topic {} has been unsubscribed. No more payment notifications will arrive \
                 until it is subscribed again.",
                envelope.topic_id
            );
            let event = SubscriptionEvent {
                kind: envelope.kind,
                topic_id: envelope.topic_id.clone(),
                subscribe_url: envelope.subscribe_url.clone().unwrap_or_default(),
                confirmed: false,
            };
            producers.publish_subscription_change(event).await;
            Ok(HttpResponse::Ok().json(JsonResponse::success("Unsubscribe confirmation received.")))
        },
    }
}

fn check_message_type_header(req: &HttpRequest, envelope: &NotificationEnvelope) -> Result<(), ServerError> {
    let Some(value) = req.headers().get(SNS_MESSAGE_TYPE_HEADER) else {
        return Ok(());
    };
    let header = value.to_str().unwrap_or("<not utf-8>");
    if header == envelope.kind.as_str() {
        Ok(())
    } else {
        warn!("🔔️ Message type header {header} does not match the body's {}", envelope.kind);
        Err(ServerError::MessageTypeMismatch { header: header.to_string(), body: envelope.kind.to_string() })
    }
}

async fn handle_payment_notification<L: TransactionLookup>(
    verified: VerifiedNotification,
    lookup: &L,
    options: &IpnOptions,
    producers: &EventProducers,
) -> Result<HttpResponse, ServerError> {
    let payment = verified.payment_event()?;
    let message_id = verified.message_id();
    info!(
        "🔔️ Authentic payment notification {message_id}: transaction {} is {} for {} {}",
        payment.trx_id, payment.transaction_status, payment.amount, payment.currency
    );
    if options.corroborate_payments {
        corroborate(&payment, lookup).await.map_err(|e| {
            warn!("🔔️ Could not corroborate {message_id} (transaction {}). {e}", payment.trx_id);
            e
        })?;
    }
    let message = format!("Notification {message_id} for transaction {} accepted.", payment.trx_id);
    let event = IpnReceivedEvent::new(message_id, &verified.envelope().topic_id, payment)
        .corroborated(options.corroborate_payments);
    producers.publish_payment_notification(event).await;
    Ok(HttpResponse::Ok().json(JsonResponse::success(message)))
}

async fn handle_subscription_confirmation<C: SubscriptionConfirmer>(
    verified: VerifiedNotification,
    policy: &CertHostPolicy,
    confirmer: &C,
    options: &IpnOptions,
    producers: &EventProducers,
) -> Result<HttpResponse, ServerError> {
    let envelope = verified.into_envelope();
    let subscribe_url = envelope.subscribe_url.clone().unwrap_or_default();
    let confirmed = if options.auto_confirm_subscriptions {
        let url = policy.check(&subscribe_url)?;
        confirmer.confirm_subscription(&url).await?;
        info!("🔔️ Subscription to topic {} confirmed.", envelope.topic_id);
        true
    } else {
        info!(
            "🔔️ Subscription to topic {} is awaiting confirmation. Visit {subscribe_url} to confirm it.",
            envelope.topic_id
        );
        false
    };
    let event = SubscriptionEvent { kind: envelope.kind, topic_id: envelope.topic_id, subscribe_url, confirmed };
    producers.publish_subscription_change(event).await;
    let message = if confirmed { "Subscription confirmed." } else { "Subscription confirmation received." };
    Ok(HttpResponse::Ok().json(JsonResponse::success(message)))
}
