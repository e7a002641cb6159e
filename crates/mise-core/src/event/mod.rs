//! # Mise Core Event System
//!
//! In-process publish/subscribe used for plugin lifecycle notifications and
//! offline queue change notifications. Handlers are registered either by
//! event name or by concrete event type; every handler registered for an
//! event is invoked on each dispatch until one returns [`EventResult::Stop`].
pub mod dispatcher;
pub mod error;
pub mod types;

use std::any::Any;
use std::fmt;

use async_trait::async_trait;

/// Type for event handler identifiers
pub type EventId = u64;

/// Result of event processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was processed and propagation should continue
    Continue,
    /// Event was processed and propagation should stop
    Stop,
}

/// Core event trait
pub trait Event: Any + fmt::Debug + Send + Sync {
    /// Get the name of this event
    fn name(&self) -> &'static str;

    /// Clone this event
    fn clone_event(&self) -> Box<dyn Event>;

    /// Cast to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Asynchronous event handler trait
#[async_trait]
pub trait AsyncEventHandler: Send + Sync {
    async fn handle(&self, event: &dyn Event) -> EventResult;
}

pub use dispatcher::{EventDispatcher, SharedEventDispatcher, sync_event_handler, sync_typed_handler};
pub use error::EventSystemError;
pub use types::{ChangeAction, ChangeEvent, PluginLifecycleEvent};

#[cfg(test)]
mod tests;
