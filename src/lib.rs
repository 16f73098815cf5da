//! # Trellis
//!
//! A progressive-enhancement runtime for server-rendered documents.
//!
//! Components register against selectors; the runtime finds matching
//! elements, loads each component's module the first time it is needed and
//! mounts it. Soft navigation swaps labeled fragments of the page and keeps
//! the head and scroll position in step.
//!
//! ## Crates
//!
//! - [`dom`]: the document tree, selectors and mutation records
//! - [`components`]: the component contract, registry and loading types
//! - [`runtime`]: the lifecycle manager (feature `runtime`, on by default)
//!
//! ## Quick Start
//!
//! ```
//! use std::rc::Rc;
//! use trellis::prelude::*;
//!
//! #[derive(Default)]
//! struct Counter(ElementTracker);
//!
//! impl Component for Counter {
//!     fn mount(&self, dom: &Dom, element: NodeId) -> Result<(), ComponentError> {
//!         dom.write().set_attribute(element, "data-count", "0")?;
//!         self.0.insert(element);
//!         Ok(())
//!     }
//!     fn unmount(&self, _dom: &Dom, element: NodeId) -> Result<(), ComponentError> {
//!         self.0.remove(element);
//!         Ok(())
//!     }
//!     fn elements(&self) -> Vec<NodeId> {
//!         self.0.snapshot()
//!     }
//! }
//!
//! let dom = Dom::parse(r#"<main><output class="counter"></output></main>"#)?;
//! let registry = SelectorRegistry::new()
//!     .component(
//!         "counter",
//!         ".counter",
//!         ComponentOptions::new().constructor(|| Rc::new(Counter::default()) as SharedComponent),
//!     )
//!     .build()?;
//!
//! let manager = LifecycleManager::new(dom.clone(), registry);
//! let root = dom.read().root();
//! manager.mount_all_within(root, None, None)?;
//! assert_eq!(dom.read().query_selector_all(root, &"[data-count]".parse()?).len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use trellis_components as components;
pub use trellis_dom as dom;
#[cfg(feature = "runtime")]
pub use trellis_runtime as runtime;

#[cfg(feature = "runtime")]
pub use trellis_runtime::{LifecycleError, LifecycleManager, LifecycleSettings, NavigationEvent};

/// Everything needed to register components and drive the runtime.
pub mod prelude {
	pub use trellis_components::prelude::*;
	pub use trellis_components::{ComponentRegistry, LoadError};
	#[cfg(feature = "runtime")]
	pub use trellis_runtime::prelude::*;
}
