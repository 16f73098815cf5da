//! Stand-in component used while a module is loading.

use crate::component::Component;
use crate::error::ComponentError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use trellis_dom::{Dom, NodeId};

/// Action recorded by a [`DeferredComponentProxy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuedAction {
	/// A mount request.
	Mount,
	/// An unmount request.
	Unmount,
}

/// Callback run whenever the proxy queues an action.
pub type EnqueueHook = Box<dyn Fn(&Dom, NodeId)>;

/// Placeholder for a component whose module is still loading.
///
/// Implements [`Component`] so callers never special-case the loading
/// state. Requests are queued in call order and handed back by
/// [`DeferredComponentProxy::drain`] for replay against the real instance.
pub struct DeferredComponentProxy {
	component: String,
	queue: RefCell<VecDeque<(QueuedAction, NodeId)>>,
	enqueue_mount: EnqueueHook,
	enqueue_unmount: EnqueueHook,
}

impl DeferredComponentProxy {
	/// Creates a proxy for `component` with hooks observing each queued request.
	pub fn new<M, U>(component: impl Into<String>, enqueue_mount: M, enqueue_unmount: U) -> Self
	where
		M: Fn(&Dom, NodeId) + 'static,
		U: Fn(&Dom, NodeId) + 'static,
	{
		Self {
			component: component.into(),
			queue: RefCell::new(VecDeque::new()),
			enqueue_mount: Box::new(enqueue_mount),
			enqueue_unmount: Box::new(enqueue_unmount),
		}
	}

	/// A proxy without hooks.
	pub fn detached(component: impl Into<String>) -> Self {
		Self::new(component, |_, _| {}, |_, _| {})
	}

	/// Component this proxy stands in for.
	pub fn component(&self) -> &str {
		&self.component
	}

	/// Number of queued requests.
	pub fn pending(&self) -> usize {
		self.queue.borrow().len()
	}

	/// Takes every queued request, oldest first.
	pub fn drain(&self) -> Vec<(QueuedAction, NodeId)> {
		self.queue.borrow_mut().drain(..).collect()
	}

	fn enqueue(&self, action: QueuedAction, element: NodeId) {
		self.queue.borrow_mut().push_back((action, element));
		tracing::trace!(
			component = %self.component,
			?action,
			%element,
			"queued against pending component"
		);
	}
}

impl Component for DeferredComponentProxy {
	fn mount(&self, dom: &Dom, element: NodeId) -> Result<(), ComponentError> {
		self.enqueue(QueuedAction::Mount, element);
		(self.enqueue_mount)(dom, element);
		Ok(())
	}

	fn unmount(&self, dom: &Dom, element: NodeId) -> Result<(), ComponentError> {
		self.enqueue(QueuedAction::Unmount, element);
		(self.enqueue_unmount)(dom, element);
		Ok(())
	}

	/// Elements whose latest queued request is a mount.
	fn elements(&self) -> Vec<NodeId> {
		let mut elements = Vec::new();
		for &(action, element) in self.queue.borrow().iter() {
			match action {
				QueuedAction::Mount => {
					if !elements.contains(&element) {
						elements.push(element);
					}
				}
				QueuedAction::Unmount => elements.retain(|&id| id != element),
			}
		}
		elements
	}
}

impl fmt::Debug for DeferredComponentProxy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DeferredComponentProxy")
			.field("component", &self.component)
			.field("queue", &self.queue.borrow())
			.finish_non_exhaustive()
	}
}
