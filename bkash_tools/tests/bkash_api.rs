//! Request-shape tests for the bKash client, using wiremock as the gateway.

use bkash_tools::{
    data_objects::{
        CancelAgreementRequest,
        CreateAgreementRequest,
        CreatePaymentRequest,
        ExecuteAgreementRequest,
        ExecutePaymentRequest,
        QueryAgreementRequest,
        QueryPaymentRequest,
        SearchTransactionRequest,
        Token,
        MODE_AGREEMENT,
        MODE_PAYMENT_WITH_AGREEMENT,
    },
    BkashApi,
    BkashApiError,
    BkashConfig,
};
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock,
    MockServer,
    ResponseTemplate,
};

fn api_for(server: &MockServer) -> BkashApi {
    let _ = env_logger::try_init();
    let config = BkashConfig::new("merchant", "pa55", "app-key", "app-secret", false).with_base_url(&server.uri());
    BkashApi::new(config).expect("client")
}

fn token() -> Token {
    Token { id_token: "id-token".into(), token_type: "Bearer".into(), ..Default::default() }
}

/// Expects exactly one authenticated POST to `endpoint` carrying `body`, and answers with `response`.
async fn expect_authenticated_call(server: &MockServer, endpoint: &str, body: Value, response: Value) {
    Mock::given(method("POST"))
        .and(path(format!("/v1.2.0-beta/tokenized/checkout/{endpoint}")))
        .and(header("authorization", "Bearer id-token"))
        .and(header("x-app-key", "app-key"))
        .and(body_json(body))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn grant_token_sends_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.2.0-beta/tokenized/checkout/token/grant"))
        .and(header("username", "merchant"))
        .and(header("password", "pa55"))
        .and(body_json(json!({"app_key": "app-key", "app_secret": "app-secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": "0000",
            "statusMessage": "Successful",
            "id_token": "eyJraWQiOiJvTVJ",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "eyJjdHkiOiJKV1Qi"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = api_for(&server).grant_token().await.expect("token");
    assert!(token.status.is_success());
    assert_eq!(token.id_token, "eyJraWQiOiJvTVJ");
    assert_eq!(token.refresh_token, "eyJjdHkiOiJKV1Qi");
}

#[tokio::test]
async fn grant_token_without_credentials_fails_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let config = BkashConfig::default().with_base_url(&server.uri());
    let api = BkashApi::new(config).unwrap();
    let err = api.grant_token().await.unwrap_err();
    assert!(matches!(err, BkashApiError::EmptyRequiredField("app_key")));
}

#[tokio::test]
async fn refresh_token_requires_a_refresh_token() {
    let server = MockServer::start().await;
    let err = api_for(&server).refresh_token(&token()).await.unwrap_err();
    assert!(matches!(err, BkashApiError::EmptyRequiredField("refresh_token")));
}

#[tokio::test]
async fn create_agreement_rejects_wrong_mode() {
    let server = MockServer::start().await;
    let request = CreateAgreementRequest {
        mode: "0011".into(),
        payer_reference: "01770618575".into(),
        callback_url: "https://merchant.example.com/callback".into(),
        ..Default::default()
    };
    let err = api_for(&server).create_agreement(&request, &token()).await.unwrap_err();
    assert!(matches!(err, BkashApiError::InvalidMode { expected: "0000", .. }));
}

#[tokio::test]
async fn create_payment_sends_authorization_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.2.0-beta/tokenized/checkout/create"))
        .and(header("authorization", "Bearer id-token"))
        .and(header("x-app-key", "app-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": "0000",
            "statusMessage": "Successful",
            "paymentID": "TR0011ON1565154754797",
            "bkashURL": "https://sandbox.payment.bkash.com/?paymentId=TR0011ON1565154754797",
            "amount": "12",
            "currency": "BDT",
            "intent": "sale",
            "transactionStatus": "Initiated",
            "merchantInvoiceNumber": "Inv0124"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = CreatePaymentRequest {
        mode: MODE_PAYMENT_WITH_AGREEMENT.into(),
        payer_reference: "01723888888".into(),
        callback_url: "https://merchant.example.com/payment".into(),
        agreement_id: "TokenizedMerchant01".into(),
        amount: "12".into(),
        currency: "BDT".into(),
        intent: "sale".into(),
        merchant_invoice_number: "Inv0124".into(),
        merchant_association_info: Some("MI05MID54RF09123456One".into()),
    };
    let payment = api_for(&server).create_payment(&request, &token()).await.expect("payment");
    assert!(payment.status.is_success());
    assert_eq!(payment.payment_id, "TR0011ON1565154754797");
    assert_eq!(payment.transaction_status, "Initiated");
}

#[tokio::test]
async fn http_errors_are_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.2.0-beta/tokenized/checkout/payment/status"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let request = QueryPaymentRequest { payment_id: "TR0011ON1565154754797".into() };
    let err = api_for(&server).query_payment(&request, &token()).await.unwrap_err();
    match err {
        BkashApiError::QueryError { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "unauthorized");
        },
        e => panic!("unexpected error {e}"),
    }
}

#[tokio::test]
async fn gateway_error_bodies_are_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.2.0-beta/tokenized/checkout/general/searchTransaction"))
        .and(body_json(json!({"trxID": "BJD3FMWX7T"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"errorCode": "2117", "errorMessage": "Invalid trxID"})),
        )
        .mount(&server)
        .await;

    let request = SearchTransactionRequest { trx_id: "BJD3FMWX7T".into() };
    let err = api_for(&server).search_transaction(&request, &token()).await.unwrap_err();
    assert!(matches!(err, BkashApiError::GatewayError { ref code, .. } if code == "2117"));
}

#[tokio::test]
async fn search_transaction_parses_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.2.0-beta/tokenized/checkout/general/searchTransaction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "trxID": "BJD3FMWX7T",
            "initiationTime": "2024-10-13T22:50:09:000 GMT+0600",
            "completedTime": "2024-10-13T22:50:09:000 GMT+0600",
            "transactionType": "bKash Tokenized Checkout via API",
            "customerMsisdn": "01966734459",
            "transactionStatus": "Completed",
            "amount": "5000",
            "currency": "BDT",
            "organizationShortCode": "01318693581",
            "statusCode": "0000",
            "statusMessage": "Successful"
        })))
        .mount(&server)
        .await;

    let request = SearchTransactionRequest { trx_id: "BJD3FMWX7T".into() };
    let result = api_for(&server).search_transaction(&request, &token()).await.expect("search");
    assert!(result.status.is_success());
    assert_eq!(result.transaction_status, "Completed");
    assert_eq!(result.amount, "5000");
}

#[tokio::test]
async fn refresh_token_sends_the_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.2.0-beta/tokenized/checkout/token/refresh"))
        .and(header("username", "merchant"))
        .and(header("password", "pa55"))
        .and(body_json(json!({"app_key": "app-key", "app_secret": "app-secret", "refresh_token": "refresh-me"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": "0000",
            "statusMessage": "Successful",
            "id_token": "fresh-id-token",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-me"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let old = Token { refresh_token: "refresh-me".into(), ..token() };
    let fresh = api_for(&server).refresh_token(&old).await.expect("refreshed token");
    assert_eq!(fresh.id_token, "fresh-id-token");
}

#[tokio::test]
async fn create_agreement_posts_to_create() {
    let server = MockServer::start().await;
    expect_authenticated_call(
        &server,
        "create",
        json!({
            "mode": "0000",
            "payerReference": "01770618575",
            "callbackURL": "https://merchant.example.com/callback"
        }),
        json!({
            "statusCode": "0000",
            "statusMessage": "Successful",
            "paymentID": "TR0000MC1565153783513",
            "bkashURL": "https://sandbox.payment.bkash.com/?paymentId=TR0000MC1565153783513",
            "payerReference": "01770618575",
            "agreementStatus": "Initiated"
        }),
    )
    .await;

    let request = CreateAgreementRequest {
        mode: MODE_AGREEMENT.into(),
        payer_reference: "01770618575".into(),
        callback_url: "https://merchant.example.com/callback".into(),
        ..Default::default()
    };
    let agreement = api_for(&server).create_agreement(&request, &token()).await.expect("agreement");
    assert_eq!(agreement.payment_id, "TR0000MC1565153783513");
    assert_eq!(agreement.agreement_status, "Initiated");
}

#[tokio::test]
async fn execute_agreement_posts_to_execute() {
    let server = MockServer::start().await;
    expect_authenticated_call(
        &server,
        "execute",
        json!({"paymentID": "TR0000MC1565153783513"}),
        json!({
            "statusCode": "0000",
            "statusMessage": "Successful",
            "paymentID": "TR0000MC1565153783513",
            "agreementID": "TokenizedMerchant01L3IK5PB1565153789361",
            "customerMsisdn": "01770618575",
            "agreementExecuteTime": "2019-08-07T10:56:29:361 GMT+0600",
            "agreementStatus": "Completed"
        }),
    )
    .await;

    let request = ExecuteAgreementRequest { payment_id: "TR0000MC1565153783513".into() };
    let result = api_for(&server).execute_agreement(&request, &token()).await.expect("executed agreement");
    assert_eq!(result.agreement_id, "TokenizedMerchant01L3IK5PB1565153789361");
    assert_eq!(result.agreement_status, "Completed");
}

#[tokio::test]
async fn query_agreement_posts_to_agreement_status() {
    let server = MockServer::start().await;
    expect_authenticated_call(
        &server,
        "agreement/status",
        json!({"agreementID": "TokenizedMerchant01L3IK5PB1565153789361"}),
        json!({
            "statusCode": "0000",
            "statusMessage": "Successful",
            "agreementID": "TokenizedMerchant01L3IK5PB1565153789361",
            "payerReference": "01770618575",
            "customerMsisdn": "01770618575",
            "agreementCreateTime": "2019-08-07T10:56:23:513 GMT+0600",
            "agreementExecuteTime": "2019-08-07T10:56:29:361 GMT+0600",
            "agreementStatus": "Completed"
        }),
    )
    .await;

    let request = QueryAgreementRequest { agreement_id: "TokenizedMerchant01L3IK5PB1565153789361".into() };
    let result = api_for(&server).query_agreement(&request, &token()).await.expect("agreement status");
    assert_eq!(result.agreement_status, "Completed");
    assert!(result.agreement_void_time.is_none());
}

#[tokio::test]
async fn cancel_agreement_posts_to_agreement_cancel() {
    let server = MockServer::start().await;
    expect_authenticated_call(
        &server,
        "agreement/cancel",
        json!({"agreementID": "TokenizedMerchant01L3IK5PB1565153789361"}),
        json!({
            "statusCode": "0000",
            "statusMessage": "Successful",
            "paymentID": "TR0000MC1565153783513",
            "agreementID": "TokenizedMerchant01L3IK5PB1565153789361",
            "payerReference": "01770618575",
            "agreementVoidTime": "2019-08-07T11:06:29:361 GMT+0600",
            "agreementStatus": "Cancelled"
        }),
    )
    .await;

    let request = CancelAgreementRequest { agreement_id: "TokenizedMerchant01L3IK5PB1565153789361".into() };
    let result = api_for(&server).cancel_agreement(&request, &token()).await.expect("cancelled agreement");
    assert_eq!(result.agreement_status, "Cancelled");
}

#[tokio::test]
async fn execute_payment_posts_to_execute() {
    let server = MockServer::start().await;
    expect_authenticated_call(
        &server,
        "execute",
        json!({"paymentID": "TR0011ON1565154754797"}),
        json!({
            "statusCode": "0000",
            "statusMessage": "Successful",
            "paymentID": "TR0011ON1565154754797",
            "customerMsisdn": "01770618575",
            "paymentExecuteTime": "2019-08-07T11:15:56:336 GMT+0600",
            "trxID": "6H7801QFYM",
            "transactionStatus": "Completed",
            "amount": "12",
            "currency": "BDT",
            "intent": "sale",
            "merchantInvoiceNumber": "Inv0124"
        }),
    )
    .await;

    let request = ExecutePaymentRequest { payment_id: "TR0011ON1565154754797".into() };
    let result = api_for(&server).execute_payment(&request, &token()).await.expect("executed payment");
    assert_eq!(result.trx_id, "6H7801QFYM");
    assert_eq!(result.transaction_status, "Completed");
}

#[tokio::test]
async fn query_payment_posts_to_payment_status() {
    let server = MockServer::start().await;
    expect_authenticated_call(
        &server,
        "payment/status",
        json!({"paymentID": "TR0011ON1565154754797"}),
        json!({
            "statusCode": "0000",
            "statusMessage": "Successful",
            "paymentID": "TR0011ON1565154754797",
            "mode": "0001",
            "paymentCreateTime": "2019-08-07T11:12:34:978 GMT+0600",
            "trxID": "6H7801QFYM",
            "transactionStatus": "Completed",
            "amount": "12",
            "currency": "BDT",
            "intent": "sale",
            "merchantInvoiceNumber": "Inv0124"
        }),
    )
    .await;

    let request = QueryPaymentRequest { payment_id: "TR0011ON1565154754797".into() };
    let result = api_for(&server).query_payment(&request, &token()).await.expect("payment status");
    assert_eq!(result.trx_id.as_deref(), Some("6H7801QFYM"));
    assert_eq!(result.mode, "0001");
}
