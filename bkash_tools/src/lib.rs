//! # bKash tokenized checkout client
//!
//! A thin wrapper around the bKash tokenized checkout REST API. Every call is a fixed-path `POST` with a JSON body and
//! a JSON response:
//!
//! * Token management: [`BkashApi::grant_token`], [`BkashApi::refresh_token`].
//! * Recurring agreements: create, execute, query and cancel.
//! * One-off payments: create, execute and query.
//! * [`BkashApi::search_transaction`], used to corroborate the `trxID` carried by an instant payment notification.
//!
//! Configuration comes from the environment, see [`BkashConfig::new_from_env_or_default`].
mod api;
mod config;
mod error;

pub mod data_objects;

pub use api::{BkashApi, API_VERSION_PATH};
pub use config::{BkashConfig, BKASH_LIVE_GATEWAY, BKASH_SANDBOX_GATEWAY};
pub use error::BkashApiError;
