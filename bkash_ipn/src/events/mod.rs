//! Notifications for the rest of the system once an IPN has been authenticated.
//!
//! Components register async callbacks through [`EventHooks`]. The receiving service publishes events through the
//! [`EventProducers`] it gets from [`EventHandlers::producers`], and each hook runs in its own task.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::{IpnReceivedEvent, SubscriptionEvent};
pub use hooks::{EventHandlers, EventHooks, EventProducers};
