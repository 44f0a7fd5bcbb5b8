use std::{sync::Arc, time::Duration};

use log::*;

use crate::{
    canonical_string,
    verify_signature,
    CachedCertificate,
    CertHostPolicy,
    CertificateCache,
    CertificateSource,
    HttpCertificateSource,
    IpnConfig,
    IpnError,
    NotificationEnvelope,
    NotificationKind,
    PaymentEvent,
};

//-------------------------------------   VerifiedNotification   ------------------------------------------------------
/// A notification whose signature has been checked. This is the only way to get at a [`PaymentEvent`].
#[derive(Debug, Clone)]
pub struct VerifiedNotification {
    envelope: NotificationEnvelope,
    certificate: Arc<CachedCertificate>,
}

impl VerifiedNotification {
    pub fn envelope(&self) -> &NotificationEnvelope {
        &self.envelope
    }

    pub fn into_envelope(self) -> NotificationEnvelope {
        self.envelope
    }

    pub fn kind(&self) -> NotificationKind {
        self.envelope.kind
    }

    pub fn message_id(&self) -> &str {
        &self.envelope.message_id
    }

    pub fn message(&self) -> &str {
        &self.envelope.message
    }

    /// The certificate the signature was checked against.
    pub fn certificate(&self) -> &CachedCertificate {
        &self.certificate
    }

    /// Decodes the payment details. Only `Notification` messages carry a payment event.
    pub fn payment_event(&self) -> Result<PaymentEvent, IpnError> {
        match self.envelope.kind {
            NotificationKind::Notification => PaymentEvent::from_message(&self.envelope.message),
            kind => Err(IpnError::MalformedPayload(format!("A {kind} message does not carry a payment event"))),
        }
    }
}

//---------------------------------------   IpnVerifier   -------------------------------------------------------------
/// Authenticates raw notification bodies.
///
/// Cloning is cheap; clones share the certificate cache.
pub struct IpnVerifier<S = HttpCertificateSource> {
    certificates: Arc<CertificateCache<S>>,
}

impl<S> Clone for IpnVerifier<S> {
    fn clone(&self) -> Self {
        Self { certificates: Arc::clone(&self.certificates) }
    }
}

impl IpnVerifier<HttpCertificateSource> {
    /// A verifier that fetches certificates over HTTPS.
    pub fn from_config(config: &IpnConfig) -> Result<Self, IpnError> {
        let source = HttpCertificateSource::new(config.cert_fetch_timeout)?;
        Ok(Self::new(source, config.cert_host_policy.clone(), config.cert_cache_ttl))
    }
}

impl<S> IpnVerifier<S>
where S: CertificateSource
{
    pub fn new(source: S, policy: CertHostPolicy, cache_ttl: Option<Duration>) -> Self {
        Self { certificates: Arc::new(CertificateCache::new(source, policy, cache_ttl)) }
    }

    pub fn certificates(&self) -> &CertificateCache<S> {
        &self.certificates
    }

    /// Returns `Ok(())` if and only if `body` is an authentic notification from the relay.
    pub async fn is_message_signature_valid(&self, body: &[u8]) -> Result<(), IpnError> {
        self.verify(body).await.map(|_| ())
    }

    /// Parses and authenticates `body`.
    pub async fn verify(&self, body: &[u8]) -> Result<VerifiedNotification, IpnError> {
        let envelope = NotificationEnvelope::from_slice(body).map_err(|e| {
            info!("🔏️ Rejected notification. {e}");
            e
        })?;
        self.verify_envelope(&envelope).await
    }

    /// Authenticates an envelope that has already been parsed.
    pub async fn verify_envelope(&self, envelope: &NotificationEnvelope) -> Result<VerifiedNotification, IpnError> {
        let id = envelope.message_id.as_str();
        trace!("🔏️ Verifying {} {id} from topic {}", envelope.kind, envelope.topic_id);
        let result = self.check(envelope).await;
        match &result {
            Ok(_) => debug!("🔏️ {} {id} is authentic", envelope.kind),
            Err(e @ IpnError::MalformedPayload(_)) => info!("🔏️ Rejected {id}. {e}"),
            Err(e @ IpnError::FetchFailed(_)) => warn!("🔏️ Could not verify {id} ({}). The relay may retry. {e}", e.stage()),
            Err(e) => warn!("🔏️ SECURITY: rejected {id} from topic {} ({}). {e}", envelope.topic_id, e.stage()),
        }
        result
    }

    async fn check(&self, envelope: &NotificationEnvelope) -> Result<VerifiedNotification, IpnError> {
        let certificate = self.certificates.get(&envelope.signing_cert_url).await?;
        let canonical = canonical_string(envelope);
        verify_signature(canonical.as_bytes(), &envelope.signature, &envelope.signature_version, &certificate)?;
        Ok(VerifiedNotification { envelope: envelope.clone(), certificate })
    }
}
