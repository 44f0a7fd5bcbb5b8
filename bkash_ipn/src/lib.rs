//! bKash Instant Payment Notification (IPN) authentication
//!
//! bKash pushes asynchronous payment notifications through an SNS-style relay. Before a notification may change any
//! financial state (e.g. marking an invoice as paid), the receiver must establish that the body was produced by the
//! relay and not by whoever happened to reach the webhook URL. This crate answers exactly that question.
//!
//! The pipeline, leaves first:
//! 1. [`NotificationEnvelope::from_slice`] parses and validates the JSON envelope. Malformed input fails fast with
//!    [`IpnError::MalformedPayload`], before any network or cryptographic work.
//! 2. [`CertificateCache`] checks the `SigningCertURL` against the [`CertHostPolicy`] allow-list, then returns the
//!    signer's certificate, fetching it through a [`CertificateSource`] on a cache miss.
//! 3. [`canonical_string`] rebuilds the exact byte string the relay signed.
//! 4. [`verify_signature`] checks the RSA signature over that string with SHA-1 (`SignatureVersion` 1) or SHA-256
//!    (`SignatureVersion` 2).
//!
//! [`IpnVerifier`] composes the four stages and reports which stage failed.
//!
//! Replay detection (rejecting a previously seen `MessageId`) is deliberately left to the embedding service.
mod canonical;
mod cert_cache;
mod cert_source;
mod config;
mod envelope;
mod errors;
mod host_policy;
mod payment_event;
mod signature;
mod verifier;

pub mod events;

pub use canonical::canonical_string;
pub use cert_cache::{CachedCertificate, CertificateCache};
pub use cert_source::{CertificateSource, HttpCertificateSource, PinnedCertificateSource, MAX_CERTIFICATE_SIZE};
pub use config::{IpnConfig, DEFAULT_CERT_FETCH_TIMEOUT};
pub use envelope::{NotificationEnvelope, NotificationKind};
pub use errors::IpnError;
pub use host_policy::CertHostPolicy;
pub use payment_event::PaymentEvent;
pub use signature::{verify_signature, SignatureVersion};
pub use verifier::{IpnVerifier, VerifiedNotification};
