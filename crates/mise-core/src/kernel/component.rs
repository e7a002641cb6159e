use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::kernel::error::Result;

/// Core component lifecycle trait for all kernel components
#[async_trait]
pub trait KernelComponent: Any + Send + Sync + Debug {
    fn name(&self) -> &'static str;
    async fn initialize(&self) -> Result<()>;
    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
}

/// Registry storing components both by concrete type (for lookup) and in
/// registration order (for lifecycle calls).
#[derive(Default, Debug)]
pub struct ComponentRegistry {
    instances: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    lifecycle: Vec<Arc<dyn KernelComponent>>,
}

impl ComponentRegistry {
    /// Create a new empty component registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component instance, keyed by the TypeId of its concrete type.
    /// Registering the same type twice replaces the lookup entry but keeps the
    /// original lifecycle slot.
    pub fn register_instance<V>(&mut self, instance: Arc<V>)
    where
        V: KernelComponent + 'static,
    {
        let type_id = TypeId::of::<V>();
        let previous = self.instances.insert(type_id, instance.clone());
        if previous.is_none() {
            self.lifecycle.push(instance);
        }
    }

    /// Get a component instance by concrete type T.
    pub fn get_concrete<T: KernelComponent + 'static>(&self) -> Option<Arc<T>> {
        self.instances
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|any| Arc::downcast::<T>(any).ok())
    }

    /// Components in registration order.
    pub fn components(&self) -> &[Arc<dyn KernelComponent>] {
        &self.lifecycle
    }

    pub fn len(&self) -> usize {
        self.lifecycle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lifecycle.is_empty()
    }
}
