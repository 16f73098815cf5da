//! # Trellis Components
//!
//! Declarative component registrations and the loading contract consumed by
//! the Trellis lifecycle runtime.
//!
//! ## Architecture
//!
//! ```text
//! SelectorRegistry ──build()──▶ ComponentRegistry ──▶ ComponentConfig
//!                                                     ├── Selector
//!                                                     ├── Priority
//!                                                     └── Loader ──▶ Load ──▶ ComponentModule
//!                                                                              └── resolve() ──▶ Constructor
//!
//! InstanceSlot ::= Pending(DeferredComponentProxy) ──resolve()──▶ Ready(SharedComponent)
//! ```
//!
//! - [`Component`]: the instance contract (mount, unmount, element enumeration).
//! - [`SelectorRegistry`]: builder that validates names, selectors and
//!   dependency graphs.
//! - [`DeferredComponentProxy`]: queues requests while a module loads.
//! - [`InstanceSlot`]: the explicit pending/ready state of an instance.

#![warn(missing_docs)]

pub mod component;
pub mod config;
pub mod error;
pub mod module;
pub mod proxy;
pub mod registry;
pub mod slot;

pub use component::{Component, Constructor, ElementTracker, SharedComponent};
pub use config::{ComponentConfig, ComponentOptions, Priority};
pub use error::{ComponentError, LoadError, RegistryError, RegistryResult};
pub use module::{ComponentModule, Export, Load, LoadFuture, Loader};
pub use proxy::{DeferredComponentProxy, EnqueueHook, QueuedAction};
pub use registry::{ComponentRegistry, RegistryWarning, SelectorInput, SelectorRegistry};
pub use slot::InstanceSlot;

/// Common imports for component authors.
pub mod prelude {
	pub use crate::{
		Component, ComponentError, ComponentModule, ComponentOptions, ElementTracker, Export, Load,
		Priority, SelectorRegistry, SharedComponent,
	};
	pub use trellis_dom::{Dom, NodeId};
}
