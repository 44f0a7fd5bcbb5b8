use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use bkash_ipn::{
    canonical_string,
    events::{EventProducer, EventProducers, IpnReceivedEvent, SubscriptionEvent},
    CertHostPolicy,
    IpnVerifier,
    NotificationEnvelope,
    PinnedCertificateSource,
};
use log::debug;
use rsa::{pkcs8::DecodePrivateKey, Pkcs1v15Sign, RsaPrivateKey};
use serde_json::Value;
use sha1::{Digest, Sha1};
use tokio::sync::mpsc;

use super::mocks::{MockConfirmer, MockLookup};
use crate::{
    config::IpnOptions,
    ipn_routes::{PaymentNotificationRoute, MAX_IPN_BODY_SIZE, SNS_MESSAGE_TYPE_HEADER},
    routes::health,
};

pub const CERT_URL: &str = "https://sns.ap-southeast-1.amazonaws.com/SimpleNotificationService-test.pem";
pub const NOTIFICATION: &str = include_str!("../../../bkash_ipn/tests/fixtures/notification.json");
pub const SUBSCRIPTION: &str = include_str!("../../../bkash_ipn/tests/fixtures/subscription_confirmation.json");
// Test-only key. DO NOT re-use it anywhere.
const SIGNER_KEY: &str = include_str!("../../../bkash_ipn/tests/fixtures/signer_key.pem");
const SIGNER_PEM: &str = include_str!("../../../bkash_ipn/tests/fixtures/signer_cert.pem");

pub fn fixture_json(s: &str) -> Value {
    serde_json::from_str(s).expect("fixture is JSON")
}

/// Signs `value` with the test key, using SignatureVersion 1.
pub fn resign(value: &mut Value) {
    value["SignatureVersion"] = Value::String("1".into());
    let envelope = NotificationEnvelope::from_value(value.clone()).expect("valid envelope");
    let data = canonical_string(&envelope);
    let key = RsaPrivateKey::from_pkcs8_pem(SIGNER_KEY).expect("test key");
    let sig = key.sign(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(data.as_bytes())).expect("signing");
    value["Signature"] = Value::String(base64::encode(sig));
}

pub struct Events {
    pub payments: mpsc::Receiver<IpnReceivedEvent>,
    pub subscriptions: mpsc::Receiver<SubscriptionEvent>,
}

pub fn producers() -> (EventProducers, Events) {
    let (payment_tx, payments) = mpsc::channel(8);
    let (subscription_tx, subscriptions) = mpsc::channel(8);
    let producers = EventProducers {
        payment_notification_producer: vec![EventProducer::new(payment_tx)],
        subscription_producer: vec![EventProducer::new(subscription_tx)],
    };
    (producers, Events { payments, subscriptions })
}

pub struct IpnRequest {
    pub body: Vec<u8>,
    pub message_type: Option<&'static str>,
    pub lookup: MockLookup,
    pub confirmer: MockConfirmer,
    pub options: IpnOptions,
}

impl IpnRequest {
    pub fn new<B: Into<Vec<u8>>>(body: B) -> Self {
        Self {
            body: body.into(),
            message_type: None,
            lookup: MockLookup::new(),
            confirmer: MockConfirmer::new(),
            options: IpnOptions::default(),
        }
    }

    pub fn from_value(value: &Value) -> Self {
        Self::new(serde_json::to_vec(value).expect("serialisable"))
    }

    /// Sends the request to a fresh app and returns the status, the body and the published events.
    pub async fn send(self) -> (StatusCode, String, Events) {
        let _ = env_logger::try_init();
        let source = PinnedCertificateSource::new().with_certificate(CERT_URL, SIGNER_PEM);
        let verifier = IpnVerifier::new(source, CertHostPolicy::default(), None);
        let (producers, events) = producers();
        let app = App::new()
            .app_data(web::PayloadConfig::new(MAX_IPN_BODY_SIZE))
            .app_data(web::Data::new(verifier))
            .app_data(web::Data::new(self.lookup))
            .app_data(web::Data::new(self.confirmer))
            .app_data(web::Data::new(self.options))
            .app_data(web::Data::new(producers))
            .service(health)
            .service(PaymentNotificationRoute::<PinnedCertificateSource, MockLookup, MockConfirmer>::new());
        let service = test::init_service(app).await;
        let mut req = TestRequest::post().uri("/bkash/ipn").insert_header(("content-type", "text/plain"));
        if let Some(t) = self.message_type {
            req = req.insert_header((SNS_MESSAGE_TYPE_HEADER, t));
        }
        let req = req.set_payload(self.body).to_request();
        debug!("Making request");
        let res = test::call_service(&service, req).await;
        let status = res.status();
        let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
        (status, body, events)
    }
}
