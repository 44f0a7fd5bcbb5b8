use std::fmt::Display;

use log::*;
use regex::Regex;
use url::{Host, Url};

use crate::IpnError;

/// A single rule in the certificate host allow-list.
#[derive(Debug, Clone)]
enum HostRule {
    /// `sns.<region>.amazonaws.com` and `sns.<region>.amazonaws.com.cn`.
    SnsRegional,
    /// The domain itself or any subdomain of it.
    Domain(String),
    /// A regular expression that must match the whole host name.
    Pattern(Regex),
}

impl HostRule {
    fn matches(&self, host: &str) -> bool {
        match self {
            Self::SnsRegional => is_sns_regional_host(host),
            Self::Domain(domain) => {
                host == domain || host.strip_suffix(domain.as_str()).is_some_and(|prefix| prefix.ends_with('.'))
            },
            Self::Pattern(re) => re.is_match(host),
        }
    }
}

impl Display for HostRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SnsRegional => write!(f, "sns.<region>.amazonaws.com"),
            Self::Domain(d) => write!(f, "*.{d}"),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

fn is_sns_regional_host(host: &str) -> bool {
    let labels = host.split('.').collect::<Vec<&str>>();
    match labels.as_slice() {
        ["sns", region, "amazonaws", "com"] => is_region_name(region),
        ["sns", region, "amazonaws", "com", "cn"] => is_region_name(region),
        _ => false,
    }
}

/// Matches `us-east-1`, `cn-north-1`, `us-gov-west-1`, `us-isob-east-1` and so on. S3 endpoints such as
/// `s3-us-west-2` share the `amazonaws.com` suffix and must not pass.
fn is_region_name(region: &str) -> bool {
    let letters_or_empty = |s: &str| s.chars().all(|c| c.is_ascii_lowercase());
    let letters = |s: &str| !s.is_empty() && letters_or_empty(s);
    let parts = region.split('-').collect::<Vec<&str>>();
    let (area, partition, direction, number) = match parts.as_slice() {
        [area, direction, number] => (*area, None, *direction, *number),
        [area, partition, direction, number] => (*area, Some(*partition), *direction, *number),
        _ => return false,
    };
    let partition_ok = partition.map_or(true, |p| {
        let iso = p.strip_prefix("iso").is_some_and(|rest| rest.len() <= 1 && letters_or_empty(rest));
        p == "gov" || iso
    });
    area.len() == 2 &&
        letters(area) &&
        partition_ok &&
        letters(direction) &&
        !number.is_empty() &&
        number.chars().all(|c| c.is_ascii_digit())
}

/// Decides which hosts may serve signing certificates.
///
/// A URL is trusted only if it is `https`, has no credentials, names a DNS host (not an IP literal) on the default
/// port, and the host satisfies at least one rule. The default policy accepts the regional SNS endpoints only.
///
/// Note that "any subdomain of amazonaws.com" would be far too broad: anyone can host a file on an S3 bucket
/// subdomain.
#[derive(Debug, Clone)]
pub struct CertHostPolicy {
    rules: Vec<HostRule>,
}

impl Default for CertHostPolicy {
    fn default() -> Self {
        Self { rules: vec![HostRule::SnsRegional] }
    }
}

impl CertHostPolicy {
    /// A policy that trusts nothing until rules are added.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Trusts `domain` and every subdomain of it. Leading and trailing dots are ignored.
    pub fn allow_domain<S: AsRef<str>>(mut self, domain: S) -> Self {
        let domain = domain.as_ref().trim().trim_matches('.').to_ascii_lowercase();
        if domain.is_empty() {
            warn!("📜️ Ignoring an empty trusted certificate domain");
            return self;
        }
        self.rules.push(HostRule::Domain(domain));
        self
    }

    pub fn allow_domains<I, S>(self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        domains.into_iter().fold(self, |policy, d| policy.allow_domain(d))
    }

    /// Trusts any host that `pattern` matches in full. The pattern is anchored automatically.
    pub fn allow_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let re = Regex::new(&format!("^(?:{pattern})$"))?;
        self.rules.push(HostRule::Pattern(re));
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks a host name (already lower-cased) against the rules.
    pub fn is_trusted_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.');
        self.rules.iter().any(|r| r.matches(host))
    }

    /// Validates `url` and returns it parsed, or fails with [`IpnError::UntrustedSource`].
    ///
    /// This is purely syntactic; no network access takes place.
    pub fn check(&self, url: &str) -> Result<Url, IpnError> {
        let parsed =
            Url::parse(url).map_err(|e| IpnError::UntrustedSource(format!("'{url}' is not a valid URL. {e}")))?;
        if parsed.scheme() != "https" {
            return Err(IpnError::UntrustedSource(format!("'{url}' does not use https")));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(IpnError::UntrustedSource(format!("'{url}' carries user credentials")));
        }
        // The url crate normalises an explicit :443 away for https.
        if let Some(port) = parsed.port() {
            return Err(IpnError::UntrustedSource(format!("'{url}' uses non-standard port {port}")));
        }
        let host = match parsed.host() {
            Some(Host::Domain(d)) => d.to_ascii_lowercase(),
            Some(_) => return Err(IpnError::UntrustedSource(format!("'{url}' uses an IP address as host"))),
            None => return Err(IpnError::UntrustedSource(format!("'{url}' has no host"))),
        };
        if self.is_trusted_host(&host) {
            trace!("📜️ {host} is a trusted certificate host");
            Ok(parsed)
        } else {
            Err(IpnError::UntrustedSource(format!("Host '{host}' is not in the allow-list ({self})")))
        }
    }
}

impl Display for CertHostPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.rules.is_empty() {
            return write!(f, "<nothing>");
        }
        let rules = self.rules.iter().map(|r| r.to_string()).collect::<Vec<String>>();
        write!(f, "{}", rules.join(", "))
    }
}
