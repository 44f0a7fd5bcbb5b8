use std::{env, time::Duration};

use bpg_common::{
    helpers::{env_duration_secs, env_flag},
    Secret,
};
use log::*;

pub const BKASH_SANDBOX_GATEWAY: &str = "https://tokenized.sandbox.bka.sh";
pub const BKASH_LIVE_GATEWAY: &str = "https://tokenized.pay.bka.sh";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct BkashConfig {
    /// Scheme and host of the gateway, without a trailing slash, e.g. "https://tokenized.pay.bka.sh"
    pub base_url: String,
    pub username: String,
    pub password: Secret<String>,
    pub app_key: String,
    pub app_secret: Secret<String>,
    pub request_timeout: Duration,
}

impl Default for BkashConfig {
    fn default() -> Self {
        Self {
            base_url: BKASH_SANDBOX_GATEWAY.to_string(),
            username: String::default(),
            password: Secret::default(),
            app_key: String::default(),
            app_secret: Secret::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl BkashConfig {
    pub fn new(username: &str, password: &str, app_key: &str, app_secret: &str, is_live: bool) -> Self {
        let base_url = if is_live { BKASH_LIVE_GATEWAY } else { BKASH_SANDBOX_GATEWAY };
        Self {
            base_url: base_url.to_string(),
            username: username.to_string(),
            password: Secret::new(password.to_string()),
            app_key: app_key.to_string(),
            app_secret: Secret::new(app_secret.to_string()),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn new_from_env_or_default() -> Self {
        let is_live = env_flag("BPG_BKASH_LIVE", false);
        let base_url = env::var("BPG_BKASH_BASE_URL").unwrap_or_else(|_| {
            let url = if is_live { BKASH_LIVE_GATEWAY } else { BKASH_SANDBOX_GATEWAY };
            info!("🪛️ BPG_BKASH_BASE_URL not set, using {url}");
            url.to_string()
        });
        let username = env::var("BPG_BKASH_USERNAME").unwrap_or_else(|_| {
            warn!("🪛️ BPG_BKASH_USERNAME not set. Calls to the bKash API will fail.");
            String::default()
        });
        let password = Secret::new(env::var("BPG_BKASH_PASSWORD").unwrap_or_else(|_| {
            warn!("🪛️ BPG_BKASH_PASSWORD not set. Calls to the bKash API will fail.");
            String::default()
        }));
        let app_key = env::var("BPG_BKASH_APP_KEY").unwrap_or_else(|_| {
            warn!("🪛️ BPG_BKASH_APP_KEY not set. Calls to the bKash API will fail.");
            String::default()
        });
        let app_secret = Secret::new(env::var("BPG_BKASH_APP_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ BPG_BKASH_APP_SECRET not set. Calls to the bKash API will fail.");
            String::default()
        }));
        let request_timeout = env_duration_secs("BPG_BKASH_REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT);
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { base_url, username, password, app_key, app_secret, request_timeout }
    }

    /// True if all four merchant credentials have been provided.
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && self.password.is_set() && !self.app_key.is_empty() && self.app_secret.is_set()
    }
}
