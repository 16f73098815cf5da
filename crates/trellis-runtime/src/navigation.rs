//! Navigation events delivered by the transport collaborator.

use crate::settings::ScrollRestoration;
use std::fmt;

/// What triggered a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NavigationCause {
	/// A link activation.
	Link,
	/// A form submission.
	Form,
	/// History traversal (back/forward).
	History,
	/// Application code.
	#[default]
	Programmatic,
}

impl fmt::Display for NavigationCause {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Link => "link",
			Self::Form => "form",
			Self::History => "history",
			Self::Programmatic => "programmatic",
		})
	}
}

/// New markup for one fragment of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
	/// Full response markup.
	pub markup: String,
	/// Label of the fragment to replace.
	pub target: String,
	/// Trigger.
	pub cause: NavigationCause,
	/// Per-navigation scroll override.
	pub scroll: Option<ScrollRestoration>,
}

impl NavigationEvent {
	/// A programmatic replacement of `target` with markup from `markup`.
	pub fn new(markup: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			markup: markup.into(),
			target: target.into(),
			cause: NavigationCause::default(),
			scroll: None,
		}
	}

	/// Sets the trigger.
	pub fn with_cause(mut self, cause: NavigationCause) -> Self {
		self.cause = cause;
		self
	}

	/// Overrides scroll handling for this navigation.
	pub fn with_scroll(mut self, scroll: ScrollRestoration) -> Self {
		self.scroll = Some(scroll);
		self
	}
}
