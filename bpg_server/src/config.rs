use std::env;

use bkash_ipn::IpnConfig;
use bkash_tools::BkashConfig;
use bpg_common::helpers::env_flag;
use log::*;

const DEFAULT_BPG_HOST: &str = "127.0.0.1";
const DEFAULT_BPG_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub ipn: IpnConfig,
    pub bkash: BkashConfig,
    pub ipn_options: IpnOptions,
}

/// How the IPN endpoint treats authenticated messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IpnOptions {
    /// Visit the `SubscribeURL` of authenticated subscription confirmations.
    pub auto_confirm_subscriptions: bool,
    /// Look up every notified transaction with the gateway before accepting it.
    pub corroborate_payments: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BPG_HOST.into(),
            port: DEFAULT_BPG_PORT,
            ipn: IpnConfig::default(),
            bkash: BkashConfig::default(),
            ipn_options: IpnOptions::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.into(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BPG_HOST").ok().unwrap_or_else(|| DEFAULT_BPG_HOST.into());
        let port = env::var("BPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for BPG_PORT. {e} Using the default, {DEFAULT_BPG_PORT}, instead."
                    );
                    DEFAULT_BPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BPG_PORT);
        let ipn = IpnConfig::from_env_or_default();
        let bkash = BkashConfig::new_from_env_or_default();
        let auto_confirm_subscriptions = env_flag("BPG_IPN_AUTO_CONFIRM", true);
        let mut corroborate_payments = env_flag("BPG_CORROBORATE_PAYMENTS", false);
        if corroborate_payments && !bkash.has_credentials() {
            error!(
                "🪛️ BPG_CORROBORATE_PAYMENTS is set, but the bKash credentials are incomplete. Payment corroboration \
                 is disabled."
            );
            corroborate_payments = false;
        }
        if !auto_confirm_subscriptions {
            info!("🪛️ Subscription confirmations will be logged, but not confirmed automatically.");
        }
        Self {
            host,
            port,
            ipn,
            bkash,
            ipn_options: IpnOptions { auto_confirm_subscriptions, corroborate_payments },
        }
    }
}
