use std::{fmt::Display, str::FromStr};

use log::*;
use rsa::Pkcs1v15Sign;
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::{CachedCertificate, IpnError};

/// The digest algorithm used by the relay, as announced in `SignatureVersion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureVersion {
    /// RSA PKCS#1 v1.5 with SHA-1.
    V1,
    /// RSA PKCS#1 v1.5 with SHA-256.
    V2,
}

impl FromStr for SignatureVersion {
    type Err = IpnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Self::V1),
            "2" => Ok(Self::V2),
            other => Err(IpnError::SignatureInvalid(format!("Unsupported signature version '{other}'"))),
        }
    }
}

impl Display for SignatureVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1 => write!(f, "1"),
            Self::V2 => write!(f, "2"),
        }
    }
}

/// Checks `signature` (base64) over `canonical` against the certificate's public key.
///
/// Returns `Ok(())` only when the RSA verification itself succeeds. Everything else, including undecodable base64
/// and unknown versions, is [`IpnError::SignatureInvalid`].
pub fn verify_signature(
    canonical: &[u8],
    signature: &str,
    version: &str,
    cert: &CachedCertificate,
) -> Result<(), IpnError> {
    let version = version.parse::<SignatureVersion>()?;
    let signature = base64::decode(signature.trim())
        .map_err(|e| IpnError::SignatureInvalid(format!("Signature is not valid base64. {e}")))?;
    let key = cert.public_key();
    let result = match version {
        SignatureVersion::V1 => key.verify(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(canonical), &signature),
        SignatureVersion::V2 => key.verify(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(canonical), &signature),
    };
    match result {
        Ok(()) => {
            trace!("🔏️ Signature (v{version}) verified against {}", cert.source_url());
            Ok(())
        },
        Err(e) => Err(IpnError::SignatureInvalid(format!(
            "Signature (v{version}) does not match the certificate at {}. {e}",
            cert.source_url()
        ))),
    }
}
