//! Shared fixtures for the runtime integration tests.

#![allow(dead_code)]

use futures::channel::oneshot;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;
use trellis_components::prelude::*;
use trellis_components::LoadError;
use trellis_dom::Selector;
use trellis_runtime::Notification;

/// A hook invocation seen by a [`Recorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
	Mount(NodeId),
	Unmount(NodeId),
}

/// Observations shared by every [`Recorder`] built from one spy.
#[derive(Clone, Default)]
pub struct Spy {
	pub calls: Rc<RefCell<Vec<Call>>>,
	pub constructed: Rc<Cell<usize>>,
	pub cleanups: Rc<Cell<usize>>,
}

impl Spy {
	pub fn constructor(&self) -> impl Fn() -> SharedComponent + Clone + 'static {
		let spy = self.clone();
		move || {
			spy.constructed.set(spy.constructed.get() + 1);
			Rc::new(Recorder {
				spy: spy.clone(),
				tracker: ElementTracker::default(),
			}) as SharedComponent
		}
	}

	pub fn module(&self) -> ComponentModule {
		ComponentModule::from_constructor(self.constructor())
	}

	pub fn options(&self) -> ComponentOptions {
		ComponentOptions::new().constructor(self.constructor())
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.borrow().clone()
	}

	pub fn mounts(&self) -> usize {
		self.calls().iter().filter(|call| matches!(call, Call::Mount(_))).count()
	}

	pub fn unmounts(&self) -> usize {
		self.calls().iter().filter(|call| matches!(call, Call::Unmount(_))).count()
	}
}

/// Component logging every hook. Elements carrying `data-fail` refuse to mount.
pub struct Recorder {
	spy: Spy,
	tracker: ElementTracker,
}

impl Component for Recorder {
	fn mount(&self, dom: &Dom, element: NodeId) -> Result<(), ComponentError> {
		if dom.read().has_attribute(element, "data-fail") {
			return Err(ComponentError::Mount(format!("refused {element}")));
		}
		self.spy.calls.borrow_mut().push(Call::Mount(element));
		self.tracker.insert(element);
		Ok(())
	}

	fn unmount(&self, _dom: &Dom, element: NodeId) -> Result<(), ComponentError> {
		self.spy.calls.borrow_mut().push(Call::Unmount(element));
		self.tracker.remove(element);
		Ok(())
	}

	fn elements(&self) -> Vec<NodeId> {
		self.tracker.snapshot()
	}

	fn cleanup(&self) {
		self.spy.cleanups.set(self.spy.cleanups.get() + 1);
	}
}

type Settle = oneshot::Sender<Result<ComponentModule, LoadError>>;

/// Loader whose loads stay pending until the test settles them.
#[derive(Clone, Default)]
pub struct Gate {
	pending: Rc<RefCell<VecDeque<Settle>>>,
	calls: Rc<Cell<usize>>,
}

impl Gate {
	pub fn options(&self) -> ComponentOptions {
		let gate = self.clone();
		ComponentOptions::new().loader(move || {
			gate.calls.set(gate.calls.get() + 1);
			let (sender, receiver) = oneshot::channel();
			gate.pending.borrow_mut().push_back(sender);
			Load::pending(async move {
				receiver
					.await
					.unwrap_or_else(|_| Err(LoadError::failed("load abandoned by test")))
			})
		})
	}

	pub fn calls(&self) -> usize {
		self.calls.get()
	}

	/// Completes the oldest pending load with `module`.
	pub fn resolve(&self, module: ComponentModule) {
		if let Some(sender) = self.pending.borrow_mut().pop_front() {
			let _ = sender.send(Ok(module));
		}
	}

	/// Fails the oldest pending load.
	pub fn reject(&self, message: &str) {
		if let Some(sender) = self.pending.borrow_mut().pop_front() {
			let _ = sender.send(Err(LoadError::failed(message)));
		}
	}
}

/// Loader failing synchronously `failures` times before succeeding with
/// `spy`'s module.
pub fn flaky(spy: &Spy, failures: usize, calls: Rc<Cell<usize>>) -> ComponentOptions {
	let spy = spy.clone();
	ComponentOptions::new().loader(move || {
		calls.set(calls.get() + 1);
		if calls.get() <= failures {
			Load::failed(format!("network error #{}", calls.get()))
		} else {
			Load::ready(spy.module())
		}
	})
}

/// Captures notifications.
pub fn notifications() -> (Rc<RefCell<Vec<Notification>>>, impl Fn(&Notification) + 'static) {
	let log: Rc<RefCell<Vec<Notification>>> = Rc::default();
	let sink_log = log.clone();
	let sink = move |notification: &Notification| sink_log.borrow_mut().push(notification.clone());
	(log, sink)
}

/// Runs `test` on a local task set.
pub async fn local<F>(test: F) -> F::Output
where
	F: Future,
{
	LocalSet::new().run_until(test).await
}

/// Lets every timer and spawned task finish; the clock is paused in tests.
pub async fn settle() {
	tokio::time::sleep(Duration::from_secs(60)).await;
}

pub fn by_id(dom: &Dom, id: &str) -> NodeId {
	dom.read()
		.find_by_id(id)
		.unwrap_or_else(|| panic!("no element with id {id}"))
}

pub fn count(dom: &Dom, selector: &str) -> usize {
	let doc = dom.read();
	doc.query_selector_all(doc.root(), &Selector::parse(selector).unwrap())
		.len()
}
