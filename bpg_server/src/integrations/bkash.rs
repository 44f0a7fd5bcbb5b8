//! Corroboration of authenticated payment notifications against the gateway's own records, and the event hooks that
//! run once a notification has been accepted.
use std::time::{Duration, Instant};

use bkash_ipn::{
    events::{EventHandlers, EventHooks},
    PaymentEvent,
};
use bkash_tools::{
    data_objects::{SearchTransactionRequest, SearchTransactionResponse, Token},
    BkashApi,
    BkashApiError,
};
use bpg_common::Poisha;
use futures::future::BoxFuture;
use log::*;
use tokio::sync::Mutex;

use crate::errors::ServerError;

pub const IPN_EVENT_BUFFER_SIZE: usize = 25;
/// Access tokens are renewed this long before the gateway says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[allow(async_fn_in_trait)]
pub trait TransactionLookup {
    /// Fetches the gateway's record of the transaction `trx_id`.
    async fn search_transaction(&self, trx_id: &str) -> Result<SearchTransactionResponse, BkashApiError>;
}

struct CachedToken {
    token: Token,
    expires_at: Instant,
}

/// Looks up transactions with the bKash API, granting and caching access tokens as needed.
pub struct BkashTransactionLookup {
    api: BkashApi,
    token: Mutex<Option<CachedToken>>,
}

impl BkashTransactionLookup {
    pub fn new(api: BkashApi) -> Self {
        Self { api, token: Mutex::new(None) }
    }

    async fn access_token(&self) -> Result<Token, BkashApiError> {
        let mut cached = self.token.lock().await;
        if let Some(c) = cached.as_ref().filter(|c| c.expires_at > Instant::now()) {
            return Ok(c.token.clone());
        }
        let token = self.api.grant_token().await?;
        if !token.status.is_success() || token.id_token.is_empty() {
            return Err(BkashApiError::AuthenticationFailed(format!(
                "{} {}",
                token.status.status_code, token.status.status_message
            )));
        }
        let lifetime = Duration::from_secs(u64::try_from(token.expires_in).unwrap_or_default());
        let expires_at = Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken { token: token.clone(), expires_at });
        Ok(token)
    }
}

impl TransactionLookup for BkashTransactionLookup {
    async fn search_transaction(&self, trx_id: &str) -> Result<SearchTransactionResponse, BkashApiError> {
        let token = self.access_token().await?;
        let request = SearchTransactionRequest { trx_id: trx_id.to_string() };
        self.api.search_transaction(&request, &token).await
    }
}

/// Checks a notified payment against the gateway's record of the same transaction.
///
/// A record that disagrees on the transaction id, status, amount or currency fails with
/// [`ServerError::CorroborationFailed`]. So does an explicit gateway rejection of the lookup. Any other failure to
/// reach the gateway is [`ServerError::GatewayUnavailable`], so that the relay retries later.
pub async fn corroborate<L: TransactionLookup>(payment: &PaymentEvent, lookup: &L) -> Result<(), ServerError> {
    let trx_id = payment.trx_id.as_str();
    debug!("💸️ Corroborating transaction {trx_id} with the gateway");
    let record = match lookup.search_transaction(trx_id).await {
        Ok(r) => r,
        Err(BkashApiError::GatewayError { code, message }) => {
            return Err(ServerError::CorroborationFailed(format!(
                "The gateway has no record of {trx_id}. Error {code}. {message}"
            )));
        },
        Err(e) => return Err(ServerError::GatewayUnavailable(e.to_string())),
    };
    if !record.status.is_success() {
        return Err(ServerError::CorroborationFailed(format!(
            "Lookup of {trx_id} returned status {} {}",
            record.status.status_code, record.status.status_message
        )));
    }
    if record.trx_id != payment.trx_id {
        return Err(ServerError::CorroborationFailed(format!("Asked for {trx_id}, but got {}", record.trx_id)));
    }
    if !record.transaction_status.eq_ignore_ascii_case(&payment.transaction_status) {
        return Err(ServerError::CorroborationFailed(format!(
            "{trx_id} is {} according to the gateway, but {} according to the notification",
            record.transaction_status, payment.transaction_status
        )));
    }
    let notified = payment.amount.parse::<Poisha>();
    let recorded = record.amount.parse::<Poisha>();
    match (notified, recorded) {
        (Ok(a), Ok(b)) if a == b => {},
        (Ok(a), Ok(b)) => {
            return Err(ServerError::CorroborationFailed(format!(
                "{trx_id} was for {b} according to the gateway, but {a} according to the notification"
            )));
        },
        (a, b) => {
            return Err(ServerError::CorroborationFailed(format!(
                "Amounts for {trx_id} could not be compared ({a:?} vs {b:?})"
            )));
        },
    }
    let currencies_differ = !payment.currency.is_empty() &&
        !record.currency.is_empty() &&
        !payment.currency.eq_ignore_ascii_case(&record.currency);
    if currencies_differ {
        return Err(ServerError::CorroborationFailed(format!(
            "{trx_id} was in {} according to the gateway, but {} according to the notification",
            record.currency, payment.currency
        )));
    }
    info!("💸️ Transaction {trx_id} corroborated by the gateway");
    Ok(())
}

fn no_op() -> BoxFuture<'static, ()> {
    Box::pin(async {})
}

/// The hooks the server runs for accepted notifications.
///
/// Completed payments are logged at `info`; anything else is logged at `warn` since it will not settle an invoice.
pub fn create_ipn_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_payment_notification(|ev| {
        let payment = &ev.payment;
        if payment.is_completed() {
            info!(
                "💸️ Payment {} of {} {} for invoice {} is complete. Corroborated: {}",
                payment.trx_id,
                payment.amount,
                payment.currency,
                payment.merchant_invoice_number.as_deref().unwrap_or("<none>"),
                ev.corroborated
            );
        } else {
            warn!("💸️ Payment {} was reported with status '{}'", payment.trx_id, payment.transaction_status);
        }
        no_op()
    });
    hooks.on_subscription_change(|ev| {
        info!("💸️ {} for topic {}. Confirmed: {}", ev.kind, ev.topic_id, ev.confirmed);
        no_op()
    });
    EventHandlers::new(IPN_EVENT_BUFFER_SIZE, hooks)
}
