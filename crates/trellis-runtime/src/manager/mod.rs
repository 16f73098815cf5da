//! The lifecycle manager.
//!
//! [`LifecycleManager`] is a cheap, clonable handle. All state lives behind
//! one `RefCell` and is only borrowed for short, non-reentrant sections;
//! component hooks always run with no borrow held.

mod loading;
mod mounting;
mod observer;
mod replace;

pub use mounting::MountSummary;
pub use replace::FragmentReport;

use crate::error::{LifecycleError, LifecycleResult};
use crate::events::{Instrumentation, Notification, NotificationSink};
use crate::markers;
use crate::metrics::PerformanceMetrics;
use crate::settings::LifecycleSettings;
use futures::future::AbortHandle;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use trellis_components::{Component, ComponentRegistry, InstanceSlot, LoadError, Priority};
use trellis_dom::{Dom, NodeId};

/// Orchestrates component loading, mounting and fragment replacement for
/// one document.
///
/// # Runtime requirements
///
/// Loads, observation and deferred mounts run as local tasks. On native
/// targets the manager must be driven from inside a
/// `tokio::task::LocalSet`; in the browser tasks go to the microtask queue.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use trellis_components::prelude::*;
/// use trellis_runtime::LifecycleManager;
///
/// #[derive(Default)]
/// struct Toggle(ElementTracker);
///
/// impl Component for Toggle {
///     fn mount(&self, _dom: &Dom, element: NodeId) -> Result<(), ComponentError> {
///         self.0.insert(element);
///         Ok(())
///     }
///     fn unmount(&self, _dom: &Dom, element: NodeId) -> Result<(), ComponentError> {
///         self.0.remove(element);
///         Ok(())
///     }
///     fn elements(&self) -> Vec<NodeId> {
///         self.0.snapshot()
///     }
/// }
///
/// let dom = Dom::parse("<main><button class=\"toggle\"></button></main>").unwrap();
/// let registry = SelectorRegistry::new()
///     .component(
///         "toggle",
///         ".toggle",
///         ComponentOptions::new().constructor(|| Rc::new(Toggle::default()) as SharedComponent),
///     )
///     .build()
///     .unwrap();
///
/// let manager = LifecycleManager::new(dom.clone(), registry);
/// let root = dom.read().root();
/// let summary = manager.mount_all_within(root, None, None).unwrap();
/// assert_eq!(summary.mounted, 1);
/// ```
#[derive(Clone)]
pub struct LifecycleManager {
	inner: Rc<Inner>,
}

struct Inner {
	dom: Dom,
	registry: ComponentRegistry,
	settings: LifecycleSettings,
	instrumentation: Instrumentation,
	state: RefCell<State>,
}

#[derive(Default)]
struct State {
	instances: HashMap<String, InstanceSlot>,
	load_errors: HashMap<String, LoadError>,
	metrics: PerformanceMetrics,
	observer: Option<AbortHandle>,
	navigation: Option<AbortHandle>,
	// Fragment targets whose normal tier waits on `normal_mount_delay`,
	// keyed to the swap that scheduled it.
	deferred_tiers: HashMap<NodeId, u64>,
	swap_generation: u64,
	torn_down: bool,
}

/// Builder for [`LifecycleManager`].
pub struct LifecycleManagerBuilder {
	dom: Dom,
	registry: ComponentRegistry,
	settings: LifecycleSettings,
	sink: Option<Rc<dyn NotificationSink>>,
}

impl LifecycleManagerBuilder {
	/// Replaces the default settings.
	pub fn settings(mut self, settings: LifecycleSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Forwards notifications to `sink`.
	pub fn notifications<S>(mut self, sink: S) -> Self
	where
		S: NotificationSink + 'static,
	{
		self.sink = Some(Rc::new(sink));
		self
	}

	/// Builds the manager. Nothing is mounted until asked.
	pub fn build(self) -> LifecycleManager {
		for warning in self.registry.warnings() {
			tracing::debug!(%warning, "registry warning carried into lifecycle manager");
		}
		LifecycleManager {
			inner: Rc::new(Inner {
				dom: self.dom,
				registry: self.registry,
				settings: self.settings,
				instrumentation: Instrumentation::new(self.sink),
				state: RefCell::new(State::default()),
			}),
		}
	}
}

impl LifecycleManager {
	/// A manager with default settings and no notification sink.
	pub fn new(dom: Dom, registry: ComponentRegistry) -> Self {
		Self::builder(dom, registry).build()
	}

	/// Starts a builder.
	pub fn builder(dom: Dom, registry: ComponentRegistry) -> LifecycleManagerBuilder {
		LifecycleManagerBuilder {
			dom,
			registry,
			settings: LifecycleSettings::default(),
			sink: None,
		}
	}

	fn upgrade(inner: &Weak<Inner>) -> Option<Self> {
		inner.upgrade().map(|inner| Self { inner })
	}

	/// The managed document.
	pub fn dom(&self) -> &Dom {
		&self.inner.dom
	}

	/// The component registry.
	pub fn registry(&self) -> &ComponentRegistry {
		&self.inner.registry
	}

	/// Active settings.
	pub fn settings(&self) -> &LifecycleSettings {
		&self.inner.settings
	}

	/// Snapshot of the performance counters.
	pub fn metrics(&self) -> PerformanceMetrics {
		self.inner.state.borrow().metrics.clone()
	}

	/// Last abandoned load error of `component`, cleared by a later success.
	pub fn load_error(&self, component: &str) -> Option<LoadError> {
		self.inner.state.borrow().load_errors.get(component).cloned()
	}

	/// Current slot of `component`, if an instance or load exists.
	pub fn instance(&self, component: &str) -> Option<InstanceSlot> {
		self.inner.state.borrow().instances.get(component).cloned()
	}

	/// Whether [`LifecycleManager::teardown`] ran.
	pub fn is_torn_down(&self) -> bool {
		self.inner.state.borrow().torn_down
	}

	fn check_alive(&self) -> LifecycleResult<()> {
		if self.is_torn_down() {
			Err(LifecycleError::TornDown)
		} else {
			Ok(())
		}
	}

	fn notify(&self, notification: Notification) {
		self.inner.instrumentation.emit(notification);
	}

	/// Boots the manager on the current document.
	///
	/// Eager components are instantiated in dependency order, the whole
	/// document is mounted (critical tier first) and observation starts.
	pub fn start(&self) -> LifecycleResult<()> {
		self.check_alive()?;
		for config in self.inner.registry.dependency_order() {
			if config.is_eager()
				&& let Err(error) = self.ensure_instance(config.name())
			{
				tracing::warn!(component = config.name(), %error, "eager component failed to load");
			}
		}
		let root = self.inner.dom.read().root();
		let mut summary = MountSummary::default();
		for priority in Priority::ALL {
			summary += self.mount_scoped(root, None, Some(priority), None);
		}
		self.observe()?;
		tracing::info!(
			components = self.inner.registry.len(),
			mounted = summary.mounted,
			deferred = summary.deferred,
			failed = summary.failed,
			"lifecycle manager started"
		);
		Ok(())
	}

	/// Stops observation and navigation handling, unmounts everything and
	/// runs every instance's cleanup. Calling it again does nothing.
	pub fn teardown(&self) {
		let handles = {
			let mut state = self.inner.state.borrow_mut();
			if state.torn_down {
				return;
			}
			state.torn_down = true;
			[state.observer.take(), state.navigation.take()]
		};
		for handle in handles.into_iter().flatten() {
			handle.abort();
		}
		self.inner.dom.write().disconnect();

		let unmounted = self.unmount_where(|_, _| true);
		for (_, slot) in self.tracked() {
			if let InstanceSlot::Ready(instance) = slot {
				instance.cleanup();
			}
		}
		{
			let mut doc = self.inner.dom.write();
			let root = doc.root();
			markers::strip(&mut doc, root);
		}
		{
			let mut state = self.inner.state.borrow_mut();
			state.instances.clear();
			state.deferred_tiers.clear();
		}
		tracing::info!(unmounted, "lifecycle manager torn down");
	}
}

impl fmt::Debug for LifecycleManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.borrow();
		f.debug_struct("LifecycleManager")
			.field("components", &self.inner.registry.len())
			.field("instances", &state.instances.len())
			.field("observing", &state.observer.is_some())
			.field("torn_down", &state.torn_down)
			.finish_non_exhaustive()
	}
}
