use std::{collections::HashMap, time::Duration};

use log::*;
use reqwest::{redirect, Client};
use url::Url;

use crate::IpnError;

/// Certificates larger than this are refused. Real signing certificates are around 2 KiB.
pub const MAX_CERTIFICATE_SIZE: usize = 64 * 1024;

/// Retrieves the raw bytes of a signing certificate.
///
/// URLs handed to a source have already passed the host policy. Implementations must map every failure, including
/// timeouts, to [`IpnError::FetchFailed`].
#[allow(async_fn_in_trait)]
pub trait CertificateSource {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, IpnError>;
}

//--------------------------------------   HttpCertificateSource   ----------------------------------------------------
/// Fetches certificates over HTTP(S) with a bounded timeout. Redirects are not followed, so the host that passed the
/// allow-list is the host that answers.
#[derive(Debug, Clone)]
pub struct HttpCertificateSource {
    client: Client,
    timeout: Duration,
}

impl HttpCertificateSource {
    pub fn new(timeout: Duration) -> Result<Self, IpnError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| IpnError::FetchFailed(format!("Could not create HTTP client. {e}")))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl CertificateSource for HttpCertificateSource {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, IpnError> {
        debug!("📜️ Fetching signing certificate from {url}");
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                IpnError::FetchFailed(format!("Timed out after {}s fetching {url}", self.timeout.as_secs_f32()))
            } else {
                IpnError::FetchFailed(format!("Request to {url} failed. {e}"))
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(IpnError::FetchFailed(format!("{url} returned HTTP {}", status.as_u16())));
        }
        if response.content_length().is_some_and(|len| len > MAX_CERTIFICATE_SIZE as u64) {
            return Err(IpnError::FetchFailed(format!("Certificate at {url} is too large")));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| IpnError::FetchFailed(format!("Could not read the certificate body from {url}. {e}")))?;
        if body.len() > MAX_CERTIFICATE_SIZE {
            return Err(IpnError::FetchFailed(format!("Certificate at {url} is too large")));
        }
        trace!("📜️ Received {} bytes from {url}", body.len());
        Ok(body.to_vec())
    }
}

//-------------------------------------   PinnedCertificateSource   ---------------------------------------------------
/// Serves certificates from memory. Useful for offline deployments that ship the relay's certificate, and for tests.
#[derive(Debug, Clone, Default)]
pub struct PinnedCertificateSource {
    certificates: HashMap<String, Vec<u8>>,
}

impl PinnedCertificateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_certificate<U: Into<String>, B: Into<Vec<u8>>>(mut self, url: U, body: B) -> Self {
        self.insert(url, body);
        self
    }

    pub fn insert<U: Into<String>, B: Into<Vec<u8>>>(&mut self, url: U, body: B) {
        self.certificates.insert(url.into(), body.into());
    }
}

impl CertificateSource for PinnedCertificateSource {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, IpnError> {
        self.certificates
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| IpnError::FetchFailed(format!("No pinned certificate for {url}")))
    }
}
