//! The component instance contract.

use crate::error::ComponentError;
use std::cell::RefCell;
use std::rc::Rc;
use trellis_dom::{Dom, NodeId};

/// Behavior attached to matched elements.
///
/// One instance serves every element its selector matches. Per-element
/// state is the implementation's business; [`Component::elements`] reports
/// which elements it currently manages so the runtime can scope unmounts.
///
/// Implementations must not hold borrows of the [`Dom`] when returning.
pub trait Component {
	/// Attaches behavior to `element`.
	fn mount(&self, dom: &Dom, element: NodeId) -> Result<(), ComponentError>;

	/// Detaches behavior from `element`.
	fn unmount(&self, dom: &Dom, element: NodeId) -> Result<(), ComponentError>;

	/// Elements currently mounted.
	fn elements(&self) -> Vec<NodeId>;

	/// Releases instance-wide resources at teardown.
	fn cleanup(&self) {}
}

/// Shared component instance.
pub type SharedComponent = Rc<dyn Component>;

/// Factory producing a component instance.
pub type Constructor = Rc<dyn Fn() -> SharedComponent>;

/// Ordered set of mounted elements for [`Component`] implementations.
///
/// ```
/// use trellis_components::ElementTracker;
/// use trellis_dom::NodeId;
///
/// let tracker = ElementTracker::default();
/// assert!(tracker.insert(NodeId::from_index(4)));
/// assert!(!tracker.insert(NodeId::from_index(4)));
/// assert_eq!(tracker.snapshot(), vec![NodeId::from_index(4)]);
/// ```
#[derive(Debug, Default)]
pub struct ElementTracker {
	elements: RefCell<Vec<NodeId>>,
}

impl ElementTracker {
	/// Adds `element`; `false` if already tracked.
	pub fn insert(&self, element: NodeId) -> bool {
		let mut elements = self.elements.borrow_mut();
		if elements.contains(&element) {
			return false;
		}
		elements.push(element);
		true
	}

	/// Removes `element`; `false` if it was not tracked.
	pub fn remove(&self, element: NodeId) -> bool {
		let mut elements = self.elements.borrow_mut();
		let before = elements.len();
		elements.retain(|&id| id != element);
		elements.len() != before
	}

	/// Whether `element` is tracked.
	pub fn contains(&self, element: NodeId) -> bool {
		self.elements.borrow().contains(&element)
	}

	/// Tracked elements in insertion order.
	pub fn snapshot(&self) -> Vec<NodeId> {
		self.elements.borrow().clone()
	}

	/// Forgets every element.
	pub fn clear(&self) {
		self.elements.borrow_mut().clear();
	}
}
