use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::events::{EventHandler, EventProducer, Handler, IpnReceivedEvent, SubscriptionEvent};

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Default, Clone)]
pub struct EventProducers {
    pub payment_notification_producer: Vec<EventProducer<IpnReceivedEvent>>,
    pub subscription_producer: Vec<EventProducer<SubscriptionEvent>>,
}

impl EventProducers {
    pub async fn publish_payment_notification(&self, event: IpnReceivedEvent) {
        for producer in &self.payment_notification_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_subscription_change(&self, event: SubscriptionEvent) {
        for producer in &self.subscription_producer {
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_payment_notification: Option<EventHandler<IpnReceivedEvent>>,
    pub on_subscription_change: Option<EventHandler<SubscriptionEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_payment_notification = hooks.on_payment_notification.map(|f| EventHandler::new(buffer_size, f));
        let on_subscription_change = hooks.on_subscription_change.map(|f| EventHandler::new(buffer_size, f));
        Self { on_payment_notification, on_subscription_change }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_payment_notification {
            result.payment_notification_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_subscription_change {
            result.subscription_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns a task for each registered handler.
    pub fn start_handlers(self) {
        if let Some(handler) = self.on_payment_notification {
            debug!("📬️ Starting payment notification handler");
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_subscription_change {
            debug!("📬️ Starting subscription change handler");
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_payment_notification: Option<Handler<IpnReceivedEvent>>,
    pub on_subscription_change: Option<Handler<SubscriptionEvent>>,
}

impl EventHooks {
    pub fn on_payment_notification<F>(&mut self, f: F) -> &mut Self
    where F: Fn(IpnReceivedEvent) -> HookFuture + Send + Sync + 'static {
        self.on_payment_notification = Some(Arc::new(f));
        self
    }

    pub fn on_subscription_change<F>(&mut self, f: F) -> &mut Self
    where F: Fn(SubscriptionEvent) -> HookFuture + Send + Sync + 'static {
        self.on_subscription_change = Some(Arc::new(f));
        self
    }
}
