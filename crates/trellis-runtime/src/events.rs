//! Lifecycle notifications.
//!
//! Every notable transition is logged through `tracing` at the call site and
//! forwarded to an optional [`NotificationSink`] supplied at construction.

use crate::navigation::NavigationCause;
use std::fmt;
use std::rc::Rc;
use trellis_dom::NodeId;

/// A lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Notification {
	/// A real instance mounted an element.
	Mounted {
		/// Component name.
		component: String,
		/// Mounted element.
		element: NodeId,
	},
	/// A real instance unmounted an element.
	Unmounted {
		/// Component name.
		component: String,
		/// Unmounted element.
		element: NodeId,
	},
	/// A mount hook failed.
	MountFailed {
		/// Component name.
		component: String,
		/// Target element.
		element: NodeId,
		/// Failure message.
		error: String,
	},
	/// An unmount hook failed.
	UnmountFailed {
		/// Component name.
		component: String,
		/// Target element.
		element: NodeId,
		/// Failure message.
		error: String,
	},
	/// A module loaded and its instance is ready.
	LoadSucceeded {
		/// Component name.
		component: String,
		/// Attempts used, the successful one included.
		attempts: u32,
	},
	/// A load attempt failed.
	LoadFailed {
		/// Component name.
		component: String,
		/// Attempt number, starting at 1.
		attempt: u32,
		/// Whether another attempt is scheduled.
		will_retry: bool,
		/// Failure message.
		error: String,
	},
	/// A fragment replacement began.
	FragmentStarted {
		/// Fragment label.
		target: String,
		/// What triggered it.
		cause: NavigationCause,
	},
	/// A fragment replacement completed.
	FragmentSucceeded {
		/// Fragment label.
		target: String,
		/// Elements unmounted inside the old content.
		unmounted: usize,
		/// Elements mounted in the new content.
		mounted: usize,
	},
	/// A fragment replacement was aborted.
	FragmentFailed {
		/// Fragment label.
		target: String,
		/// Failure message.
		error: String,
	},
	/// Head metadata was synchronized.
	HeadUpdated {
		/// Fragment label that triggered the sync.
		target: String,
		/// New title, when it changed.
		title: Option<String>,
	},
}

/// Receiver of [`Notification`]s.
pub trait NotificationSink {
	/// Handles one notification.
	fn notify(&self, notification: &Notification);
}

impl<F> NotificationSink for F
where
	F: Fn(&Notification),
{
	fn notify(&self, notification: &Notification) {
		self(notification)
	}
}

/// Optional sink, resolved once at construction.
#[derive(Clone, Default)]
pub(crate) struct Instrumentation {
	sink: Option<Rc<dyn NotificationSink>>,
}

impl Instrumentation {
	pub(crate) fn new(sink: Option<Rc<dyn NotificationSink>>) -> Self {
		Self { sink }
	}

	pub(crate) fn emit(&self, notification: Notification) {
		if let Some(sink) = &self.sink {
			sink.notify(&notification);
		}
	}
}

impl fmt::Debug for Instrumentation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Instrumentation")
			.field("sink", &self.sink.is_some())
			.finish()
	}
}
