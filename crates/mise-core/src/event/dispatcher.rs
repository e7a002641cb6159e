use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::event::error::EventSystemError;
use crate::event::{AsyncEventHandler, Event, EventId, EventResult};

// This type represents an owned future that returns EventResult
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = EventResult> + Send + 'a>>;

pub type NamedHandlerFn = Box<dyn Fn(&dyn Event) -> BoxFuture<'_> + Send + Sync>;
pub type TypedHandlerFn<E> = Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>;

//--------------------------------------------------
// EventDispatcher (wrapped by SharedEventDispatcher)
//--------------------------------------------------

/// Handler table keyed by event name and by event type
pub struct EventDispatcher {
    handlers: HashMap<&'static str, Vec<(EventId, Box<dyn AsyncEventHandler>)>>,
    type_handlers: HashMap<TypeId, Vec<(EventId, Box<dyn AsyncEventHandler>)>>,
    next_handler_id: EventId,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("name_handlers_count", &count(&self.handlers))
            .field("type_handlers_count", &count(&self.type_handlers))
            .field("next_handler_id", &self.next_handler_id)
            .finish()
    }
}

fn count<K>(table: &HashMap<K, Vec<(EventId, Box<dyn AsyncEventHandler>)>>) -> usize {
    table.values().map(Vec::len).sum()
}

struct NamedHandler {
    handler: NamedHandlerFn,
}

#[async_trait]
impl AsyncEventHandler for NamedHandler {
    async fn handle(&self, event: &dyn Event) -> EventResult {
        (self.handler)(event).await
    }
}

/// Only fires for events whose concrete type is `E`
struct TypedEventHandler<E: Event + 'static> {
    handler: TypedHandlerFn<E>,
}

#[async_trait]
impl<E: Event + 'static> AsyncEventHandler for TypedEventHandler<E> {
    async fn handle(&self, event: &dyn Event) -> EventResult {
        match event.as_any().downcast_ref::<E>() {
            Some(e) => (self.handler)(e).await,
            None => EventResult::Continue,
        }
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            type_handlers: HashMap::new(),
            next_handler_id: 1,
        }
    }

    fn next_id(&mut self) -> EventId {
        let id = self.next_handler_id;
        self.next_handler_id += 1;
        id
    }

    pub fn register_handler(&mut self, event_name: &'static str, handler: NamedHandlerFn) -> EventId {
        let id = self.next_id();
        self.handlers
            .entry(event_name)
            .or_default()
            .push((id, Box::new(NamedHandler { handler })));
        id
    }

    pub fn register_type_handler<E: Event + 'static>(&mut self, handler: TypedHandlerFn<E>) -> EventId {
        let id = self.next_id();
        self.type_handlers
            .entry(TypeId::of::<E>())
            .or_default()
            .push((id, Box::new(TypedEventHandler { handler })));
        id
    }

    pub fn unregister_handler(&mut self, id: EventId) -> Result<(), EventSystemError> {
        let mut found = false;
        for handlers in self.handlers.values_mut().chain(self.type_handlers.values_mut()) {
            let len_before = handlers.len();
            handlers.retain(|(h_id, _)| *h_id != id);
            found |= handlers.len() < len_before;
        }
        if found {
            Ok(())
        } else {
            Err(EventSystemError::HandlerNotFound { id })
        }
    }

    pub fn handler_count(&self) -> usize {
        count(&self.handlers) + count(&self.type_handlers)
    }

    /// Name handlers run first, then type handlers, each in registration order.
    pub async fn dispatch(&self, event: &dyn Event) -> EventResult {
        if let Some(handlers) = self.handlers.get(event.name()) {
            for (_, handler) in handlers.iter() {
                if handler.handle(event).await == EventResult::Stop {
                    return EventResult::Stop;
                }
            }
        }
        if let Some(handlers) = self.type_handlers.get(&event.as_any().type_id()) {
            for (_, handler) in handlers.iter() {
                if handler.handle(event).await == EventResult::Stop {
                    return EventResult::Stop;
                }
            }
        }
        EventResult::Continue
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

//--------------------------------------------------
// SharedEventDispatcher (Public API)
//--------------------------------------------------

/// Cloneable handle to one dispatcher, guarded by a tokio Mutex.
///
/// Handlers run while the dispatcher lock is held, so a handler must not
/// register, unregister or dispatch on the same dispatcher.
#[derive(Clone, Default)]
pub struct SharedEventDispatcher {
    dispatcher: Arc<Mutex<EventDispatcher>>,
}

impl fmt::Debug for SharedEventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEventDispatcher").finish_non_exhaustive()
    }
}

impl SharedEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn dispatch(&self, event: &dyn Event) -> EventResult {
        let dispatcher = self.dispatcher.lock().await;
        dispatcher.dispatch(event).await
    }

    pub async fn register_handler(&self, event_name: &'static str, handler: NamedHandlerFn) -> EventId {
        let mut dispatcher = self.dispatcher.lock().await;
        dispatcher.register_handler(event_name, handler)
    }

    pub async fn register_type_handler<E: Event + 'static>(&self, handler: TypedHandlerFn<E>) -> EventId {
        let mut dispatcher = self.dispatcher.lock().await;
        dispatcher.register_type_handler::<E>(handler)
    }

    pub async fn unregister_handler(&self, id: EventId) -> Result<(), EventSystemError> {
        let mut dispatcher = self.dispatcher.lock().await;
        dispatcher.unregister_handler(id)
    }

    pub async fn handler_count(&self) -> usize {
        self.dispatcher.lock().await.handler_count()
    }
}

//--------------------------------------------------
// Helper Functions
//--------------------------------------------------

/// Wrap a synchronous closure as a name handler
pub fn sync_event_handler<F>(f: F) -> NamedHandlerFn
where
    F: Fn(&dyn Event) -> EventResult + Send + Sync + 'static,
{
    Box::new(move |event| {
        let result = f(event);
        Box::pin(async move { result })
    })
}

/// Wrap a synchronous closure as a typed handler
pub fn sync_typed_handler<E, F>(f: F) -> TypedHandlerFn<E>
where
    E: Event + 'static,
    F: Fn(&E) -> EventResult + Send + Sync + 'static,
{
    Box::new(move |event| {
        let result = f(event);
        Box::pin(async move { result })
    })
}
