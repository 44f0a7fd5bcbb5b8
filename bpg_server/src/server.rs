use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use bkash_ipn::{events::EventProducers, HttpCertificateSource, IpnVerifier};
use bkash_tools::BkashApi;
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{
        bkash::{create_ipn_event_handlers, BkashTransactionLookup},
        sns::HttpSubscriptionConfirmer,
    },
    ipn_routes::{PaymentNotificationRoute, MAX_IPN_BODY_SIZE},
    routes::health,
};

type IpnRoute = PaymentNotificationRoute<HttpCertificateSource, BkashTransactionLookup, HttpSubscriptionConfirmer>;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let handlers = create_ipn_event_handlers();
    let producers = handlers.producers();
    handlers.start_handlers();
    let srv = create_server_instance(config, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, producers: EventProducers) -> Result<Server, ServerError> {
    // Created once and shared by all workers, so that every worker sees the same certificate cache and access token.
    let verifier = web::Data::new(
        IpnVerifier::from_config(&config.ipn).map_err(|e| ServerError::InitializeError(e.to_string()))?,
    );
    let api = BkashApi::new(config.bkash.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let lookup = web::Data::new(BkashTransactionLookup::new(api));
    let confirmer = web::Data::new(HttpSubscriptionConfirmer::new(config.ipn.cert_fetch_timeout)?);
    let options = web::Data::new(config.ipn_options);
    let producers = web::Data::new(producers);
    info!("🔏️ Signing certificates are accepted from {}", config.ipn.cert_host_policy);
    if options.corroborate_payments {
        info!("💸️ Payment notifications will be corroborated with the gateway at {}", config.bkash.base_url);
    }
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bpg::access_log"))
            .app_data(web::PayloadConfig::new(MAX_IPN_BODY_SIZE))
            .app_data(verifier.clone())
            .app_data(lookup.clone())
            .app_data(confirmer.clone())
            .app_data(options.clone())
            .app_data(producers.clone())
            .service(health)
            .service(IpnRoute::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
