use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    config::BkashConfig,
    data_objects::{
        CancelAgreementRequest,
        CancelAgreementResponse,
        CreateAgreementRequest,
        CreateAgreementResponse,
        CreatePaymentRequest,
        CreatePaymentResponse,
        ExecuteAgreementRequest,
        ExecuteAgreementResponse,
        ExecutePaymentRequest,
        ExecutePaymentResponse,
        GrantTokenRequest,
        QueryAgreementRequest,
        QueryAgreementResponse,
        QueryPaymentRequest,
        QueryPaymentResponse,
        RefreshTokenRequest,
        SearchTransactionRequest,
        SearchTransactionResponse,
        Token,
        MODE_AGREEMENT,
        MODE_PAYMENT_WITH_AGREEMENT,
    },
    BkashApiError,
};

pub const API_VERSION_PATH: &str = "v1.2.0-beta/tokenized/checkout";

const GRANT_TOKEN_PATH: &str = "token/grant";
const REFRESH_TOKEN_PATH: &str = "token/refresh";
const CREATE_PATH: &str = "create";
const EXECUTE_PATH: &str = "execute";
const QUERY_AGREEMENT_PATH: &str = "agreement/status";
const CANCEL_AGREEMENT_PATH: &str = "agreement/cancel";
const QUERY_PAYMENT_PATH: &str = "payment/status";
const SEARCH_TRANSACTION_PATH: &str = "general/searchTransaction";

#[derive(Clone)]
pub struct BkashApi {
    config: BkashConfig,
    client: Arc<Client>,
}

fn require(value: &str, name: &'static str) -> Result<(), BkashApiError> {
    if value.trim().is_empty() {
        Err(BkashApiError::EmptyRequiredField(name))
    } else {
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue, BkashApiError> {
    HeaderValue::from_str(value).map_err(|e| BkashApiError::RestRequestError(e.to_string()))
}

impl BkashApi {
    pub fn new(config: BkashConfig) -> Result<Self, BkashApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BkashApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &BkashConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{API_VERSION_PATH}/{path}", self.config.base_url)
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        headers: HeaderMap,
        body: &B,
    ) -> Result<T, BkashApiError> {
        let url = self.url(path);
        trace!("💸️ Sending bKash request: {url}");
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| BkashApiError::RestResponseError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| BkashApiError::RestResponseError(e.to_string()))?;
            return Err(BkashApiError::QueryError { status, message });
        }
        trace!("💸️ bKash request successful. {}", response.status());
        let value = response.json::<Value>().await.map_err(|e| BkashApiError::JsonError(e.to_string()))?;
        // Some failures come back as HTTP 200 with an errorCode/errorMessage body instead of the expected object.
        if let Some(code) = value.get("errorCode").and_then(Value::as_str) {
            let message = value.get("errorMessage").and_then(Value::as_str).unwrap_or_default().to_string();
            return Err(BkashApiError::GatewayError { code: code.to_string(), message });
        }
        serde_json::from_value(value).map_err(|e| BkashApiError::JsonError(e.to_string()))
    }

    fn credential_headers(&self) -> Result<HeaderMap, BkashApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("username", header_value(&self.config.username)?);
        headers.insert("password", header_value(self.config.password.reveal())?);
        Ok(headers)
    }

    fn auth_headers(&self, token: &Token) -> Result<HeaderMap, BkashApiError> {
        require(&self.config.app_key, "app_key")?;
        require(&token.id_token, "id_token")?;
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(AUTHORIZATION, header_value(&token.authorization())?);
        headers.insert("x-app-key", header_value(&self.config.app_key)?);
        Ok(headers)
    }

    fn check_credentials(&self) -> Result<(), BkashApiError> {
        require(&self.config.app_key, "app_key")?;
        require(self.config.app_secret.reveal(), "app_secret")?;
        require(&self.config.username, "username")?;
        require(self.config.password.reveal(), "password")
    }

    /// Creates an access token using the merchant credentials.
    pub async fn grant_token(&self) -> Result<Token, BkashApiError> {
        self.check_credentials()?;
        let body =
            GrantTokenRequest { app_key: &self.config.app_key, app_secret: self.config.app_secret.reveal().as_str() };
        debug!("💸️ Requesting a new bKash access token");
        let token = self.post::<Token, _>(GRANT_TOKEN_PATH, self.credential_headers()?, &body).await?;
        info!("💸️ bKash access token granted. Status: {}", token.status.status_code);
        Ok(token)
    }

    /// Exchanges the refresh token in `token` for a fresh access token.
    pub async fn refresh_token(&self, token: &Token) -> Result<Token, BkashApiError> {
        self.check_credentials()?;
        require(&token.refresh_token, "refresh_token")?;
        let body = RefreshTokenRequest {
            app_key: &self.config.app_key,
            app_secret: self.config.app_secret.reveal().as_str(),
            refresh_token: &token.refresh_token,
        };
        debug!("💸️ Refreshing bKash access token");
        let token = self.post::<Token, _>(REFRESH_TOKEN_PATH, self.credential_headers()?, &body).await?;
        info!("💸️ bKash access token refreshed. Status: {}", token.status.status_code);
        Ok(token)
    }

    /// Initiates an agreement request for a customer. `mode` must be "0000".
    pub async fn create_agreement(
        &self,
        request: &CreateAgreementRequest,
        token: &Token,
    ) -> Result<CreateAgreementResponse, BkashApiError> {
        require(&request.mode, "mode")?;
        require(&request.callback_url, "callbackURL")?;
        if request.mode != MODE_AGREEMENT {
            return Err(BkashApiError::InvalidMode { expected: MODE_AGREEMENT, actual: request.mode.clone() });
        }
        let headers = self.auth_headers(token)?;
        debug!("💸️ Creating agreement for payer {}", request.payer_reference);
        let result = self.post::<CreateAgreementResponse, _>(CREATE_PATH, headers, request).await?;
        info!("💸️ Agreement created. Payment id: {}. Status: {}", result.payment_id, result.status.status_code);
        Ok(result)
    }

    /// Executes an agreement using the payment id returned by [`Self::create_agreement`].
    pub async fn execute_agreement(
        &self,
        request: &ExecuteAgreementRequest,
        token: &Token,
    ) -> Result<ExecuteAgreementResponse, BkashApiError> {
        require(&request.payment_id, "paymentID")?;
        let headers = self.auth_headers(token)?;
        debug!("💸️ Executing agreement for payment {}", request.payment_id);
        let result = self.post::<ExecuteAgreementResponse, _>(EXECUTE_PATH, headers, request).await?;
        info!("💸️ Agreement {} executed. Status: {}", result.agreement_id, result.agreement_status);
        Ok(result)
    }

    pub async fn query_agreement(
        &self,
        request: &QueryAgreementRequest,
        token: &Token,
    ) -> Result<QueryAgreementResponse, BkashApiError> {
        require(&request.agreement_id, "agreementID")?;
        let headers = self.auth_headers(token)?;
        debug!("💸️ Querying agreement {}", request.agreement_id);
        self.post::<QueryAgreementResponse, _>(QUERY_AGREEMENT_PATH, headers, request).await
    }

    pub async fn cancel_agreement(
        &self,
        request: &CancelAgreementRequest,
        token: &Token,
    ) -> Result<CancelAgreementResponse, BkashApiError> {
        require(&request.agreement_id, "agreementID")?;
        let headers = self.auth_headers(token)?;
        debug!("💸️ Cancelling agreement {}", request.agreement_id);
        let result = self.post::<CancelAgreementResponse, _>(CANCEL_AGREEMENT_PATH, headers, request).await?;
        info!("💸️ Agreement {} cancelled. Status: {}", result.agreement_id, result.agreement_status);
        Ok(result)
    }

    /// Initiates a payment against an existing agreement. `mode` must be "0001".
    pub async fn create_payment(
        &self,
        request: &CreatePaymentRequest,
        token: &Token,
    ) -> Result<CreatePaymentResponse, BkashApiError> {
        require(&request.mode, "mode")?;
        require(&request.callback_url, "callbackURL")?;
        require(&request.amount, "amount")?;
        if request.mode != MODE_PAYMENT_WITH_AGREEMENT {
            return Err(BkashApiError::InvalidMode {
                expected: MODE_PAYMENT_WITH_AGREEMENT,
                actual: request.mode.clone(),
            });
        }
        let headers = self.auth_headers(token)?;
        debug!(
            "💸️ Creating payment of {} {} for invoice {}",
            request.amount, request.currency, request.merchant_invoice_number
        );
        let result = self.post::<CreatePaymentResponse, _>(CREATE_PATH, headers, request).await?;
        info!("💸️ Payment {} created. Status: {}", result.payment_id, result.status.status_code);
        Ok(result)
    }

    pub async fn execute_payment(
        &self,
        request: &ExecutePaymentRequest,
        token: &Token,
    ) -> Result<ExecutePaymentResponse, BkashApiError> {
        require(&request.payment_id, "paymentID")?;
        let headers = self.auth_headers(token)?;
        debug!("💸️ Executing payment {}", request.payment_id);
        let result = self.post::<ExecutePaymentResponse, _>(EXECUTE_PATH, headers, request).await?;
        info!(
            "💸️ Payment {} executed. Transaction {} is {}",
            result.payment_id, result.trx_id, result.transaction_status
        );
        Ok(result)
    }

    pub async fn query_payment(
        &self,
        request: &QueryPaymentRequest,
        token: &Token,
    ) -> Result<QueryPaymentResponse, BkashApiError> {
        require(&request.payment_id, "paymentID")?;
        let headers = self.auth_headers(token)?;
        debug!("💸️ Querying payment {}", request.payment_id);
        self.post::<QueryPaymentResponse, _>(QUERY_PAYMENT_PATH, headers, request).await
    }

    /// Looks up a completed transaction by its `trxID`, as reported in an instant payment notification.
    pub async fn search_transaction(
        &self,
        request: &SearchTransactionRequest,
        token: &Token,
    ) -> Result<SearchTransactionResponse, BkashApiError> {
        require(&request.trx_id, "trxID")?;
        let headers = self.auth_headers(token)?;
        debug!("💸️ Searching for transaction {}", request.trx_id);
        self.post::<SearchTransactionResponse, _>(SEARCH_TRANSACTION_PATH, headers, request).await
    }
}
