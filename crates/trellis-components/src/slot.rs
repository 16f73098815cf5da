//! Per-component instance slot.

use crate::component::SharedComponent;
use crate::proxy::DeferredComponentProxy;
use std::fmt;
use std::rc::Rc;

/// What the runtime currently holds for a component.
///
/// The only transition is `Pending` to `Ready`, through
/// [`InstanceSlot::resolve`].
#[derive(Clone)]
pub enum InstanceSlot {
	/// The module is loading; requests queue on the proxy.
	Pending(Rc<DeferredComponentProxy>),
	/// The real instance.
	Ready(SharedComponent),
}

impl InstanceSlot {
	/// The component to call, proxy or real.
	pub fn component(&self) -> SharedComponent {
		match self {
			Self::Pending(proxy) => proxy.clone(),
			Self::Ready(instance) => instance.clone(),
		}
	}

	/// Whether the real instance is available.
	pub fn is_ready(&self) -> bool {
		matches!(self, Self::Ready(_))
	}

	/// The proxy, while pending.
	pub fn proxy(&self) -> Option<&Rc<DeferredComponentProxy>> {
		match self {
			Self::Pending(proxy) => Some(proxy),
			Self::Ready(_) => None,
		}
	}

	/// Installs `instance`, returning the replaced proxy.
	///
	/// A slot that is already `Ready` keeps its instance and returns `None`.
	pub fn resolve(&mut self, instance: SharedComponent) -> Option<Rc<DeferredComponentProxy>> {
		match self {
			Self::Pending(proxy) => {
				let proxy = proxy.clone();
				*self = Self::Ready(instance);
				Some(proxy)
			}
			Self::Ready(_) => None,
		}
	}
}

impl fmt::Debug for InstanceSlot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Pending(proxy) => f.debug_tuple("Pending").field(proxy).finish(),
			Self::Ready(_) => f.write_str("Ready(..)"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::component::{Component, ElementTracker};
	use rstest::rstest;

	#[rstest]
	fn test_resolve_is_one_way() {
		// Arrange
		let proxy = Rc::new(DeferredComponentProxy::detached("tabs"));
		let mut slot = InstanceSlot::Pending(proxy.clone());
		let first: SharedComponent = Rc::new(ProxyFree::default());
		let second: SharedComponent = Rc::new(ProxyFree::default());

		// Act
		let replaced = slot.resolve(first.clone());
		let again = slot.resolve(second);

		// Assert
		assert!(replaced.is_some_and(|p| Rc::ptr_eq(&p, &proxy)));
		assert!(again.is_none());
		assert!(slot.is_ready());
		assert!(Rc::ptr_eq(&slot.component(), &first));
	}

	#[derive(Default)]
	struct ProxyFree(ElementTracker);

	impl Component for ProxyFree {
		fn mount(
			&self,
			_dom: &trellis_dom::Dom,
			element: trellis_dom::NodeId,
		) -> Result<(), crate::ComponentError> {
			self.0.insert(element);
			Ok(())
		}

		fn unmount(
			&self,
			_dom: &trellis_dom::Dom,
			element: trellis_dom::NodeId,
		) -> Result<(), crate::ComponentError> {
			self.0.remove(element);
			Ok(())
		}

		fn elements(&self) -> Vec<trellis_dom::NodeId> {
			self.0.snapshot()
		}
	}
}
