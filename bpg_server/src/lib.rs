//! # BPG server
//! This crate hosts the server that receives bKash instant payment notifications (IPNs). It is responsible for:
//! * Authenticating every notification body against the relay's signing certificate.
//! * Completing the subscription handshake with the relay.
//! * Optionally corroborating each payment with the gateway's own transaction record.
//! * Passing accepted payments on to the registered event hooks.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/bkash/ipn`: The webhook route for notifications from the bKash relay.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod ipn_routes;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
