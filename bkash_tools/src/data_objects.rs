//! Request and response bodies for the tokenized checkout API.
//!
//! Field names follow the gateway's wire format, which mixes `snake_case` (token calls) with `camelCase` and
//! upper-case acronyms (`paymentID`, `trxID`, `callbackURL`).
use serde::{Deserialize, Serialize};

/// Gateway status code for a successful call.
pub const STATUS_SUCCESS: &str = "0000";
/// `mode` value for creating a recurring agreement.
pub const MODE_AGREEMENT: &str = "0000";
/// `mode` value for a payment against an existing agreement.
pub const MODE_PAYMENT_WITH_AGREEMENT: &str = "0001";

/// Every response carries a `statusCode`/`statusMessage` pair. A transport-level success can still be a business-level
/// failure, so check [`ApiStatus::is_success`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    #[serde(rename = "statusCode", default)]
    pub status_code: String,
    #[serde(rename = "statusMessage", default)]
    pub status_message: String,
}

impl ApiStatus {
    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_SUCCESS
    }
}

//----------------------------------------------   Tokens  ------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Token {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: String,
}

impl Token {
    /// The value of the `Authorization` header for authenticated calls.
    pub fn authorization(&self) -> String {
        if self.token_type.is_empty() {
            self.id_token.clone()
        } else {
            format!("{} {}", self.token_type, self.id_token)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GrantTokenRequest<'a> {
    pub app_key: &'a str,
    pub app_secret: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RefreshTokenRequest<'a> {
    pub app_key: &'a str,
    pub app_secret: &'a str,
    pub refresh_token: &'a str,
}

//----------------------------------------------   Agreements  --------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgreementRequest {
    pub mode: String,
    pub payer_reference: String,
    #[serde(rename = "callbackURL")]
    pub callback_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgreementResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(rename = "paymentID", default)]
    pub payment_id: String,
    #[serde(rename = "bkashURL", default)]
    pub bkash_url: String,
    #[serde(rename = "callbackURL", default)]
    pub callback_url: String,
    #[serde(rename = "successCallbackURL", default)]
    pub success_callback_url: String,
    #[serde(rename = "failureCallbackURL", default)]
    pub failure_callback_url: String,
    #[serde(rename = "cancelledCallbackURL", default)]
    pub cancelled_callback_url: String,
    #[serde(default)]
    pub payer_reference: String,
    #[serde(default)]
    pub agreement_status: String,
    #[serde(default)]
    pub agreement_create_time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteAgreementRequest {
    #[serde(rename = "paymentID")]
    pub payment_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteAgreementResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(rename = "paymentID", default)]
    pub payment_id: String,
    #[serde(rename = "agreementID", default)]
    pub agreement_id: String,
    #[serde(default)]
    pub customer_msisdn: String,
    #[serde(default)]
    pub payer_reference: String,
    #[serde(default)]
    pub agreement_execute_time: String,
    #[serde(default)]
    pub agreement_status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryAgreementRequest {
    #[serde(rename = "agreementID")]
    pub agreement_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAgreementResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(rename = "agreementID", default)]
    pub agreement_id: String,
    #[serde(default)]
    pub payer_reference: String,
    #[serde(default)]
    pub customer_msisdn: String,
    #[serde(default)]
    pub agreement_create_time: String,
    #[serde(default)]
    pub agreement_execute_time: Option<String>,
    #[serde(default)]
    pub agreement_void_time: Option<String>,
    #[serde(default)]
    pub agreement_status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelAgreementRequest {
    #[serde(rename = "agreementID")]
    pub agreement_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelAgreementResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(rename = "paymentID", default)]
    pub payment_id: String,
    #[serde(rename = "agreementID", default)]
    pub agreement_id: String,
    #[serde(default)]
    pub payer_reference: String,
    #[serde(default)]
    pub agreement_void_time: String,
    #[serde(default)]
    pub agreement_status: String,
}

//----------------------------------------------   Payments  ----------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub mode: String,
    pub payer_reference: String,
    #[serde(rename = "callbackURL")]
    pub callback_url: String,
    #[serde(rename = "agreementID", skip_serializing_if = "String::is_empty", default)]
    pub agreement_id: String,
    pub amount: String,
    pub currency: String,
    pub intent: String,
    pub merchant_invoice_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_association_info: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(rename = "paymentID", default)]
    pub payment_id: String,
    #[serde(rename = "agreementID", default)]
    pub agreement_id: Option<String>,
    #[serde(default)]
    pub payment_create_time: String,
    #[serde(default)]
    pub transaction_status: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub merchant_invoice_number: String,
    #[serde(rename = "bkashURL", default)]
    pub bkash_url: String,
    #[serde(rename = "callbackURL", default)]
    pub callback_url: String,
    #[serde(rename = "successCallbackURL", default)]
    pub success_callback_url: String,
    #[serde(rename = "failureCallbackURL", default)]
    pub failure_callback_url: String,
    #[serde(rename = "cancelledCallbackURL", default)]
    pub cancelled_callback_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutePaymentRequest {
    #[serde(rename = "paymentID")]
    pub payment_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutePaymentResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(rename = "paymentID", default)]
    pub payment_id: String,
    #[serde(rename = "agreementID", default)]
    pub agreement_id: Option<String>,
    #[serde(default)]
    pub customer_msisdn: String,
    #[serde(default)]
    pub payer_reference: String,
    #[serde(default)]
    pub payment_execute_time: String,
    #[serde(rename = "trxID", default)]
    pub trx_id: String,
    #[serde(default)]
    pub transaction_status: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub merchant_invoice_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryPaymentRequest {
    #[serde(rename = "paymentID")]
    pub payment_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPaymentResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(rename = "paymentID", default)]
    pub payment_id: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub payment_create_time: String,
    #[serde(default)]
    pub payment_execute_time: Option<String>,
    #[serde(rename = "trxID", default)]
    pub trx_id: Option<String>,
    #[serde(rename = "agreementID", default)]
    pub agreement_id: Option<String>,
    #[serde(default)]
    pub payer_reference: Option<String>,
    #[serde(default)]
    pub transaction_status: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub merchant_invoice_number: String,
    #[serde(default)]
    pub verification_status: Option<String>,
}

//----------------------------------------------   Transactions  ------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchTransactionRequest {
    #[serde(rename = "trxID")]
    pub trx_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTransactionResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
    #[serde(rename = "trxID", default)]
    pub trx_id: String,
    #[serde(default)]
    pub initiation_time: String,
    #[serde(default)]
    pub completed_time: String,
    #[serde(default)]
    pub transaction_type: String,
    #[serde(default)]
    pub customer_msisdn: String,
    #[serde(default)]
    pub transaction_status: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub organization_short_code: String,
}
