use bpg_common::Poisha;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::IpnError;

/// bKash reports `dateTime` as local Bangladesh time (UTC+6) without an offset.
const BKASH_UTC_OFFSET_SECS: i32 = 6 * 3600;
const BKASH_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// The payment details carried in the `Message` of a verified `Notification`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
    #[serde(rename = "trxID")]
    pub trx_id: String,
    pub transaction_status: String,
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(rename = "debitMSISDN", default)]
    pub debit_msisdn: String,
    #[serde(default)]
    pub credit_organization_name: String,
    #[serde(default)]
    pub credit_short_code: String,
    #[serde(default)]
    pub date_time: String,
    #[serde(default)]
    pub transaction_type: String,
    #[serde(default)]
    pub payer_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_invoice_number: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentEvent {
    /// Decodes a notification `Message`. Only call this on a message whose signature has been verified.
    pub fn from_message(message: &str) -> Result<Self, IpnError> {
        let event = serde_json::from_str::<Self>(message)
            .map_err(|e| IpnError::MalformedPayload(format!("Message is not a payment event. {e}")))?;
        if event.trx_id.trim().is_empty() {
            return Err(IpnError::MalformedPayload("Payment event has an empty trxID".to_string()));
        }
        Ok(event)
    }

    pub fn is_completed(&self) -> bool {
        self.transaction_status.eq_ignore_ascii_case("Completed")
    }

    /// The amount in poisha.
    pub fn amount_in_poisha(&self) -> Result<Poisha, IpnError> {
        self.amount
            .parse::<Poisha>()
            .map_err(|e| IpnError::MalformedPayload(format!("Invalid amount in payment event. {e}")))
    }

    /// The transaction time, or `None` if `dateTime` is absent or not in the expected format.
    pub fn transaction_time(&self) -> Option<DateTime<FixedOffset>> {
        let naive = NaiveDateTime::parse_from_str(&self.date_time, BKASH_DATE_FORMAT).ok()?;
        let offset = FixedOffset::east_opt(BKASH_UTC_OFFSET_SECS)?;
        offset.from_local_datetime(&naive).single()
    }
}
