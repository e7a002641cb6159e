use std::fmt;
use std::sync::Arc;

use log::warn;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedSender;

use crate::event::{ChangeEvent, EventId, EventResult, EventSystemError, SharedEventDispatcher, sync_typed_handler};

/// Out-of-process fan-out for change events (a websocket, a message bus...)
pub trait RealtimeSink: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn send(&self, message: &Value) -> Result<(), EventSystemError>;
}

/// Sink that forwards messages into a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: UnboundedSender<Value>,
}

impl ChannelSink {
    pub fn new(sender: UnboundedSender<Value>) -> Self {
        Self { sender }
    }
}

impl RealtimeSink for ChannelSink {
    fn name(&self) -> &str {
        "channel"
    }

    fn send(&self, message: &Value) -> Result<(), EventSystemError> {
        self.sender
            .send(message.clone())
            .map_err(|_| EventSystemError::SinkFailed {
                sink: self.name().to_string(),
                reason: "receiver dropped".to_string(),
            })
    }
}

/// Publishes [`ChangeEvent`]s to in-process listeners and an optional sink
#[derive(Clone)]
pub struct ChangeBroadcaster {
    events: SharedEventDispatcher,
    sink: Option<Arc<dyn RealtimeSink>>,
}

impl ChangeBroadcaster {
    pub fn new(events: SharedEventDispatcher) -> Self {
        Self { events, sink: None }
    }

    pub fn with_sink(mut self, sink: Arc<dyn RealtimeSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub async fn publish(&self, event: ChangeEvent) {
        self.events.dispatch(&event).await;

        let Some(sink) = &self.sink else {
            return;
        };
        let message = json!({
            "type": "offline_sync",
            "action": event.action,
            "data": event.data,
            "timestamp": event.timestamp,
        });
        if let Err(e) = sink.send(&message) {
            warn!("Dropping {} notification: {}", event.action, e);
        }
    }

    /// Call `listener` for every change event until the subscription is dropped
    /// via [`Subscription::unsubscribe`]
    pub async fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = self
            .events
            .register_type_handler::<ChangeEvent>(sync_typed_handler(move |event: &ChangeEvent| {
                listener(event);
                EventResult::Continue
            }))
            .await;
        Subscription {
            id,
            events: self.events.clone(),
        }
    }
}

impl fmt::Debug for ChangeBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBroadcaster")
            .field("sink", &self.sink.as_ref().map(|sink| sink.name().to_string()))
            .finish_non_exhaustive()
    }
}

/// Handle to a registered change listener
#[derive(Debug)]
#[must_use = "dropping a Subscription keeps the listener registered"]
pub struct Subscription {
    id: EventId,
    events: SharedEventDispatcher,
}

impl Subscription {
    pub fn id(&self) -> EventId {
        self.id
    }

    pub async fn unsubscribe(self) -> Result<(), EventSystemError> {
        self.events.unregister_handler(self.id).await
    }
}
