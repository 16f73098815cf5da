//! Component descriptors.

use crate::component::SharedComponent;
use crate::module::{ComponentModule, Load, Loader};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use trellis_dom::Selector;

/// Mount ordering tier.
///
/// Critical components mount synchronously during fragment replacement;
/// normal components may be deferred.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
	/// Mounted first.
	Critical,
	/// Mounted after the critical tier.
	#[default]
	Normal,
}

impl Priority {
	/// Every tier in mount order.
	pub const ALL: [Priority; 2] = [Priority::Critical, Priority::Normal];

	/// Lowercase name.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Critical => "critical",
			Self::Normal => "normal",
		}
	}
}

impl fmt::Display for Priority {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Registration options collected before [`SelectorRegistry::build`].
///
/// [`SelectorRegistry::build`]: crate::SelectorRegistry::build
#[derive(Clone, Default)]
pub struct ComponentOptions {
	pub(crate) loader: Option<Loader>,
	pub(crate) priority: Priority,
	pub(crate) depends_on: Vec<String>,
	pub(crate) eager: bool,
}

impl ComponentOptions {
	/// Options with normal priority and no loader.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the module loader.
	pub fn loader<F>(mut self, loader: F) -> Self
	where
		F: Fn() -> Load + 'static,
	{
		self.loader = Some(Rc::new(loader));
		self
	}

	/// Loader that synchronously yields a module built from `constructor`.
	pub fn constructor<F>(self, constructor: F) -> Self
	where
		F: Fn() -> SharedComponent + Clone + 'static,
	{
		self.loader(move || Load::ready(ComponentModule::from_constructor(constructor.clone())))
	}

	/// Sets the priority tier.
	pub fn priority(mut self, priority: Priority) -> Self {
		self.priority = priority;
		self
	}

	/// Shorthand for `priority(Priority::Critical)`.
	pub fn critical(self) -> Self {
		self.priority(Priority::Critical)
	}

	/// Adds a component that must be resolved first.
	pub fn depends_on(mut self, component: impl Into<String>) -> Self {
		self.depends_on.push(component.into());
		self
	}

	/// Instantiates the component at startup rather than on first match.
	pub fn eager(mut self, eager: bool) -> Self {
		self.eager = eager;
		self
	}
}

impl fmt::Debug for ComponentOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentOptions")
			.field("has_loader", &self.loader.is_some())
			.field("priority", &self.priority)
			.field("depends_on", &self.depends_on)
			.field("eager", &self.eager)
			.finish()
	}
}

/// An immutable, validated component registration.
#[derive(Clone)]
pub struct ComponentConfig {
	pub(crate) name: String,
	pub(crate) selector: Selector,
	pub(crate) priority: Priority,
	pub(crate) depends_on: Vec<String>,
	pub(crate) eager: bool,
	pub(crate) loader: Loader,
}

impl ComponentConfig {
	/// Component name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Element selector.
	pub fn selector(&self) -> &Selector {
		&self.selector
	}

	/// Priority tier.
	pub fn priority(&self) -> Priority {
		self.priority
	}

	/// Names resolved before this component.
	pub fn depends_on(&self) -> &[String] {
		&self.depends_on
	}

	/// Whether the instance is created at startup.
	pub fn is_eager(&self) -> bool {
		self.eager
	}

	/// Invokes the loader.
	pub fn load(&self) -> Load {
		(self.loader)()
	}
}

impl fmt::Debug for ComponentConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentConfig")
			.field("name", &self.name)
			.field("selector", &self.selector.as_str())
			.field("priority", &self.priority)
			.field("depends_on", &self.depends_on)
			.field("eager", &self.eager)
			.finish()
	}
}
