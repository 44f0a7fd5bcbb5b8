use actix_web::{http::StatusCode, test, App};
use bkash_ipn::NotificationKind;
use bkash_tools::{
    data_objects::{ApiStatus, SearchTransactionResponse},
    BkashApiError,
};
use serde_json::{json, Value};
use url::Url;

use super::helpers::{fixture_json, resign, IpnRequest, NOTIFICATION, SUBSCRIPTION};
use crate::{config::IpnOptions, errors::ServerError, routes::health};

fn gateway_record(amount: &str) -> SearchTransactionResponse {
    SearchTransactionResponse {
        status: ApiStatus { status_code: "0000".into(), status_message: "Successful".into() },
        trx_id: "BJD3FMWX7T".into(),
        transaction_status: "Completed".into(),
        amount: amount.into(),
        currency: "BDT".into(),
        ..Default::default()
    }
}

fn error_message(body: &str) -> String {
    let v: Value = serde_json::from_str(body).expect("JSON error body");
    v["error"].as_str().expect("error field").to_string()
}

#[actix_web::test]
async fn health_check() {
    let service = test::init_service(App::new().service(health)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let body = test::call_and_read_body(&service, req).await;
    assert_eq!(body, "👍️\n".as_bytes());
}

#[actix_web::test]
async fn authentic_notification_is_accepted() {
    let mut request = IpnRequest::new(NOTIFICATION);
    request.lookup.expect_search_transaction().never();
    let (status, body, mut events) = request.send().await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["success"], json!(true));
    let event = events.payments.try_recv().expect("payment event published");
    assert_eq!(event.message_id, "m1");
    assert_eq!(event.topic_id, "t1");
    assert_eq!(event.payment.trx_id, "BJD3FMWX7T");
    assert!(!event.corroborated);
}

#[actix_web::test]
async fn forged_notification_is_forbidden() {
    let mut value = fixture_json(NOTIFICATION);
    value["TopicArn"] = json!("t2");
    let (status, body, mut events) = IpnRequest::from_value(&value).send().await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(error_message(&body).contains("signature is invalid"));
    assert!(events.payments.try_recv().is_err());
}

#[actix_web::test]
async fn malformed_notification_is_a_bad_request() {
    let (status, body, _) = IpnRequest::new("{\"Type\":\"Notification\"}").send().await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("MessageId"));
    let (status, _, _) = IpnRequest::new("hello").send().await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn untrusted_certificate_is_forbidden() {
    let mut value = fixture_json(NOTIFICATION);
    value["SigningCertURL"] = json!("https://attacker.example.com/SimpleNotificationService-test.pem");
    let (status, _, _) = IpnRequest::from_value(&value).send().await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn unavailable_certificate_asks_for_a_retry() {
    let mut value = fixture_json(NOTIFICATION);
    value["SigningCertURL"] = json!("https://sns.ap-southeast-1.amazonaws.com/SimpleNotificationService-other.pem");
    let (status, _, mut events) = IpnRequest::from_value(&value).send().await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(events.payments.try_recv().is_err());
}

#[actix_web::test]
async fn message_type_header_must_match() {
    let mut request = IpnRequest::new(NOTIFICATION);
    request.message_type = Some("SubscriptionConfirmation");
    let (status, body, _) = request.send().await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("does not match"));

    let mut request = IpnRequest::new(NOTIFICATION);
    request.message_type = Some("Notification");
    let (status, _, _) = request.send().await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn oversized_bodies_are_refused() {
    let (status, _, _) = IpnRequest::new(vec![b' '; 65 * 1024]).send().await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[actix_web::test]
async fn signed_non_payment_message_is_a_bad_request() {
    let mut value = fixture_json(NOTIFICATION);
    value["Message"] = json!("Hello from the relay");
    resign(&mut value);
    let (status, body, mut events) = IpnRequest::from_value(&value).send().await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("not a payment event"));
    assert!(events.payments.try_recv().is_err());
}

#[actix_web::test]
async fn corroborated_payment_is_accepted() {
    let mut request = IpnRequest::new(NOTIFICATION);
    request.options = IpnOptions { corroborate_payments: true, ..Default::default() };
    request
        .lookup
        .expect_search_transaction()
        .withf(|trx_id: &str| trx_id == "BJD3FMWX7T")
        .times(1)
        .returning(|_| Ok(gateway_record("5000")));
    let (status, _, mut events) = request.send().await;
    assert_eq!(status, StatusCode::OK);
    assert!(events.payments.try_recv().expect("payment event").corroborated);
}

#[actix_web::test]
async fn payment_that_disagrees_with_the_gateway_is_forbidden() {
    let mut request = IpnRequest::new(NOTIFICATION);
    request.options = IpnOptions { corroborate_payments: true, ..Default::default() };
    request.lookup.expect_search_transaction().times(1).returning(|_| Ok(gateway_record("50")));
    let (status, body, mut events) = request.send().await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(error_message(&body).contains("does not match the gateway"));
    assert!(events.payments.try_recv().is_err());
}

#[actix_web::test]
async fn unreachable_gateway_asks_for_a_retry() {
    let mut request = IpnRequest::new(NOTIFICATION);
    request.options = IpnOptions { corroborate_payments: true, ..Default::default() };
    request
        .lookup
        .expect_search_transaction()
        .times(1)
        .returning(|_| Err(BkashApiError::QueryError { status: 502, message: "Bad gateway".into() }));
    let (status, _, _) = request.send().await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn subscription_is_confirmed_automatically() {
    let mut request = IpnRequest::new(SUBSCRIPTION);
    request.options = IpnOptions { auto_confirm_subscriptions: true, ..Default::default() };
    request
        .confirmer
        .expect_confirm_subscription()
        .withf(|url: &Url| {
            url.host_str() == Some("sns.ap-southeast-1.amazonaws.com") &&
                url.query().is_some_and(|q| q.contains("Action=ConfirmSubscription"))
        })
        .times(1)
        .returning(|_| Ok(()));
    let (status, _, mut events) = request.send().await;
    assert_eq!(status, StatusCode::OK);
    let event = events.subscriptions.try_recv().expect("subscription event");
    assert_eq!(event.kind, NotificationKind::SubscriptionConfirmation);
    assert!(event.confirmed);
}

#[actix_web::test]
async fn subscription_is_only_logged_without_auto_confirm() {
    let mut request = IpnRequest::new(SUBSCRIPTION);
    request.confirmer.expect_confirm_subscription().never();
    let (status, _, mut events) = request.send().await;
    assert_eq!(status, StatusCode::OK);
    assert!(!events.subscriptions.try_recv().expect("subscription event").confirmed);
}

#[actix_web::test]
async fn failed_confirmation_asks_for_a_retry() {
    let mut request = IpnRequest::new(SUBSCRIPTION);
    request.options = IpnOptions { auto_confirm_subscriptions: true, ..Default::default() };
    request
        .confirmer
        .expect_confirm_subscription()
        .times(1)
        .returning(|_| Err(ServerError::SubscriptionConfirmationFailed("HTTP 500".into())));
    let (status, _, _) = request.send().await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn untrusted_subscribe_url_is_never_visited() {
    let mut value = fixture_json(SUBSCRIPTION);
    value["SubscribeURL"] = json!("https://attacker.example.com/?Action=ConfirmSubscription");
    resign(&mut value);
    let mut request = IpnRequest::from_value(&value);
    request.options = IpnOptions { auto_confirm_subscriptions: true, ..Default::default() };
    request.confirmer.expect_confirm_subscription().never();
    let (status, _, _) = request.send().await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn unsubscribe_confirmation_is_acknowledged() {
    let mut value = fixture_json(SUBSCRIPTION);
    value["Type"] = json!("UnsubscribeConfirmation");
    resign(&mut value);
    let mut request = IpnRequest::from_value(&value);
    request.options = IpnOptions { auto_confirm_subscriptions: true, corroborate_payments: true };
    request.confirmer.expect_confirm_subscription().never();
    request.lookup.expect_search_transaction().never();
    let (status, _, mut events) = request.send().await;
    assert_eq!(status, StatusCode::OK);
    let event = events.subscriptions.try_recv().expect("subscription event");
    assert_eq!(event.kind, NotificationKind::UnsubscribeConfirmation);
    assert!(!event.confirmed);
}
