use std::time::Duration;

use log::*;
use reqwest::{redirect, Client};
use url::Url;

use crate::errors::ServerError;

/// Completes the subscription handshake with the notification relay.
#[allow(async_fn_in_trait)]
pub trait SubscriptionConfirmer {
    /// Visits `subscribe_url`. The URL has already passed the certificate host policy.
    async fn confirm_subscription(&self, subscribe_url: &Url) -> Result<(), ServerError>;
}

pub struct HttpSubscriptionConfirmer {
    client: Client,
}

impl HttpSubscriptionConfirmer {
    pub fn new(timeout: Duration) -> Result<Self, ServerError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| ServerError::InitializeError(format!("Could not create HTTP client. {e}")))?;
        Ok(Self { client })
    }
}

impl SubscriptionConfirmer for HttpSubscriptionConfirmer {
    async fn confirm_subscription(&self, subscribe_url: &Url) -> Result<(), ServerError> {
        debug!("🔔️ Confirming subscription at {}", subscribe_url.host_str().unwrap_or_default());
        let response = self
            .client
            .get(subscribe_url.clone())
            .send()
            .await
            .map_err(|e| ServerError::SubscriptionConfirmationFailed(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            trace!("🔔️ Subscription confirmed. HTTP {status}");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ServerError::SubscriptionConfirmationFailed(format!("HTTP {status}. {body}")))
        }
    }
}
