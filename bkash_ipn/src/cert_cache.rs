use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use log::*;
use rsa::{pkcs8::DecodePublicKey, RsaPublicKey};
use tokio::sync::RwLock;
use x509_cert::{
    der::{Decode, DecodePem, Encode},
    Certificate,
};

use crate::{CertHostPolicy, CertificateSource, IpnError};

fn trim_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &bytes[start..end]
}

//-------------------------------------   CachedCertificate   ---------------------------------------------------------
/// The RSA public key of a signing certificate, and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedCertificate {
    source_url: String,
    public_key: RsaPublicKey,
    fetched_at: DateTime<Utc>,
}

impl CachedCertificate {
    /// Parses a PEM (or, failing the PEM marker, DER) X.509 certificate and extracts its RSA public key.
    ///
    /// Any parsing problem, including a non-RSA key, is reported as [`IpnError::FetchFailed`]: as far as the caller is
    /// concerned, no usable certificate could be obtained.
    pub fn parse(source_url: &str, body: &[u8]) -> Result<Self, IpnError> {
        let body = trim_whitespace(body);
        let cert = if body.starts_with(b"-----BEGIN") {
            Certificate::from_pem(body)
        } else {
            Certificate::from_der(body)
        }
        .map_err(|e| IpnError::FetchFailed(format!("{source_url} is not a valid X.509 certificate. {e}")))?;
        let spki = cert
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| IpnError::FetchFailed(format!("Could not encode the public key from {source_url}. {e}")))?;
        let public_key = RsaPublicKey::from_public_key_der(&spki)
            .map_err(|e| IpnError::FetchFailed(format!("The certificate at {source_url} has no usable RSA key. {e}")))?;
        Ok(Self { source_url: source_url.to_string(), public_key, fetched_at: Utc::now() })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    fn is_older_than(&self, ttl: Duration) -> bool {
        // A fetched_at in the future (clock adjustments) counts as fresh.
        (Utc::now() - self.fetched_at).to_std().is_ok_and(|age| age > ttl)
    }
}

//-------------------------------------   CertificateCache   ----------------------------------------------------------
/// Signing certificates, keyed by the exact `SigningCertURL` string.
///
/// Every lookup checks the URL against the host policy first, so an untrusted URL never reaches the cache or the
/// network. The lock is never held while fetching; two concurrent misses for the same URL may both fetch, and the last
/// one to finish wins. Failed fetches are not cached.
pub struct CertificateCache<S> {
    source: S,
    policy: CertHostPolicy,
    ttl: Option<Duration>,
    entries: RwLock<HashMap<String, Arc<CachedCertificate>>>,
}

impl<S> CertificateCache<S>
where S: CertificateSource
{
    pub fn new(source: S, policy: CertHostPolicy, ttl: Option<Duration>) -> Self {
        Self { source, policy, ttl, entries: RwLock::new(HashMap::new()) }
    }

    pub fn policy(&self) -> &CertHostPolicy {
        &self.policy
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the certificate published at `url`, fetching it on a miss.
    pub async fn get(&self, url: &str) -> Result<Arc<CachedCertificate>, IpnError> {
        let parsed = self.policy.check(url)?;
        if let Some(cert) = self.lookup(url).await {
            trace!("📜️ Certificate cache hit for {url}");
            return Ok(cert);
        }
        debug!("📜️ Certificate cache miss for {url}");
        let body = self.source.fetch(&parsed).await?;
        let cert = Arc::new(CachedCertificate::parse(url, &body)?);
        self.entries.write().await.insert(url.to_string(), Arc::clone(&cert));
        info!("📜️ Cached signing certificate from {url}");
        Ok(cert)
    }

    async fn lookup(&self, url: &str) -> Option<Arc<CachedCertificate>> {
        let cert = self.entries.read().await.get(url).cloned()?;
        match self.ttl {
            Some(ttl) if cert.is_older_than(ttl) => {
                debug!("📜️ Cached certificate for {url} has expired");
                None
            },
            _ => Some(cert),
        }
    }

    /// Removes a single entry. Returns true if it was present.
    pub async fn evict(&self, url: &str) -> bool {
        let removed = self.entries.write().await.remove(url).is_some();
        if removed {
            info!("📜️ Evicted the cached certificate for {url}");
        }
        removed
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        info!("📜️ Clearing {} cached certificates", entries.len());
        entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
