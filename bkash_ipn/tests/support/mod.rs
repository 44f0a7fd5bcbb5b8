#![allow(dead_code)]

use std::fs;

use bkash_ipn::{
    canonical_string,
    CertHostPolicy,
    IpnVerifier,
    NotificationEnvelope,
    PinnedCertificateSource,
    SignatureVersion,
};
use rsa::{pkcs8::DecodePrivateKey, Pkcs1v15Sign, RsaPrivateKey};
use serde_json::Value;
use sha1::{Digest, Sha1};
use sha2::Sha256;

pub const CERT_URL: &str = "https://sns.ap-southeast-1.amazonaws.com/SimpleNotificationService-test.pem";
pub const SIGNER_KEY: &str = include_str!("../fixtures/signer_key.pem");
pub const SIGNER_PEM: &str = include_str!("../fixtures/signer_cert.pem");
pub const ROGUE_PEM: &str = include_str!("../fixtures/rogue_cert.pem");
pub const EC_PEM: &str = include_str!("../fixtures/ec_cert.pem");

pub fn fixture(name: &str) -> Vec<u8> {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    fs::read(&path).unwrap_or_else(|e| panic!("Could not read {path}. {e}"))
}

pub fn fixture_json(name: &str) -> Value {
    serde_json::from_slice(&fixture(name)).expect("fixture is JSON")
}

/// Re-signs `value` in place with the test signer key.
pub fn resign(value: &mut Value, version: SignatureVersion) {
    value["SignatureVersion"] = Value::String(version.to_string());
    let envelope = NotificationEnvelope::from_value(value.clone()).expect("valid envelope");
    let data = canonical_string(&envelope);
    let key = RsaPrivateKey::from_pkcs8_pem(SIGNER_KEY).expect("test key");
    let sig = match version {
        SignatureVersion::V1 => key.sign(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(data.as_bytes())),
        SignatureVersion::V2 => key.sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(data.as_bytes())),
    }
    .expect("signing");
    value["Signature"] = Value::String(base64::encode(sig));
}

pub fn body(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).expect("serialisable")
}

pub fn pinned_verifier() -> IpnVerifier<PinnedCertificateSource> {
    let _ = env_logger::try_init();
    let source = PinnedCertificateSource::new().with_certificate(CERT_URL, SIGNER_PEM);
    IpnVerifier::new(source, CertHostPolicy::default(), None)
}
