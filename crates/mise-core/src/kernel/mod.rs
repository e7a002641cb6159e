//! # Mise Core Kernel
//!
//! The `kernel` module wires the rest of `mise-core` together. It owns the
//! component lifecycle, the system-wide constants and the aggregate error
//! type that every subsystem error converts into.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Application Bootstrapping**: [`Application`](bootstrap::Application) builds
//!   the key-value store, event dispatcher, plugin manager and offline sync from
//!   an [`AppConfig`](crate::storage::AppConfig) and drives their lifecycle.
//! - **Component Lifecycle**: the [`KernelComponent`](component::KernelComponent)
//!   trait and the type-keyed [`ComponentRegistry`](component::ComponentRegistry).
//! - **Core Constants**: storage keys, retry bounds and TTLs in `constants`.
//! - **Error Handling**: [`Error`](error::Error) and the `Result` alias.
pub mod bootstrap;
pub mod component;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
pub use component::{ComponentRegistry, KernelComponent};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
