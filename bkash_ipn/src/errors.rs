use thiserror::Error;

/// Verification outcome for a rejected notification, tagged by the stage that rejected it.
///
/// Every stage fails closed. There is no variant for "could not decide".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IpnError {
    /// Structurally invalid input. Never retried.
    #[error("Malformed notification payload. {0}")]
    MalformedPayload(String),
    /// The signing certificate URL is outside the allow-list. A security event.
    #[error("Signing certificate URL is not trusted. {0}")]
    UntrustedSource(String),
    /// The certificate could not be retrieved or parsed. Transient, may be retried.
    #[error("Could not fetch the signing certificate. {0}")]
    FetchFailed(String),
    /// The signature does not verify. A security event.
    #[error("Notification signature is invalid. {0}")]
    SignatureInvalid(String),
}

impl IpnError {
    /// Only certificate fetch failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed(_))
    }

    pub fn is_security_event(&self) -> bool {
        matches!(self, Self::UntrustedSource(_) | Self::SignatureInvalid(_))
    }

    /// A short, stable label for the failing stage, suitable for log fields and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MalformedPayload(_) => "malformed_payload",
            Self::UntrustedSource(_) => "untrusted_source",
            Self::FetchFailed(_) => "fetch_failed",
            Self::SignatureInvalid(_) => "signature_invalid",
        }
    }
}
