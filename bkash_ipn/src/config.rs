use std::{env, time::Duration};

use bpg_common::helpers::{env_duration_secs, split_list};
use log::*;

use crate::CertHostPolicy;

pub const DEFAULT_CERT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct IpnConfig {
    pub cert_host_policy: CertHostPolicy,
    pub cert_fetch_timeout: Duration,
    /// How long a cached certificate stays valid. `None` keeps certificates until they are evicted.
    pub cert_cache_ttl: Option<Duration>,
}

impl Default for IpnConfig {
    fn default() -> Self {
        Self {
            cert_host_policy: CertHostPolicy::default(),
            cert_fetch_timeout: DEFAULT_CERT_FETCH_TIMEOUT,
            cert_cache_ttl: None,
        }
    }
}

impl IpnConfig {
    /// Reads the IPN configuration from `BPG_IPN_*` environment variables.
    ///
    /// `BPG_IPN_TRUSTED_CERT_DOMAINS` (comma-separated) replaces the built-in regional SNS rule.
    /// `BPG_IPN_CERT_HOST_PATTERN` adds a host regex on top of whichever domain rules apply.
    pub fn from_env_or_default() -> Self {
        let domains = env::var("BPG_IPN_TRUSTED_CERT_DOMAINS").ok().map(|s| split_list(&s)).unwrap_or_default();
        let mut policy = if domains.is_empty() {
            CertHostPolicy::default()
        } else {
            info!("🪛️ Signing certificates will be accepted from: {}", domains.join(", "));
            CertHostPolicy::empty().allow_domains(domains)
        };
        if let Ok(pattern) = env::var("BPG_IPN_CERT_HOST_PATTERN") {
            policy = match policy.clone().allow_pattern(pattern.trim()) {
                Ok(p) => p,
                Err(e) => {
                    error!("🪛️ BPG_IPN_CERT_HOST_PATTERN ({pattern}) is not a valid regular expression. {e}. Ignoring it.");
                    policy
                },
            };
        }
        if policy.is_empty() {
            warn!("🪛️ The certificate host allow-list is empty. Reverting to the default SNS hosts.");
            policy = CertHostPolicy::default();
        }
        let cert_fetch_timeout = env_duration_secs("BPG_IPN_CERT_FETCH_TIMEOUT", DEFAULT_CERT_FETCH_TIMEOUT);
        let cert_cache_ttl = match env_duration_secs("BPG_IPN_CERT_CACHE_TTL", Duration::ZERO) {
            ttl if ttl.is_zero() => None,
            ttl => Some(ttl),
        };
        debug!("🪛️ IPN certificate policy: {policy}. Fetch timeout: {cert_fetch_timeout:?}. Cache TTL: {cert_cache_ttl:?}");
        Self { cert_host_policy: policy, cert_fetch_timeout, cert_cache_ttl }
    }
}
