//! Component modules, their exports and the loader contract.
//!
//! A loader yields a [`ComponentModule`], either immediately or through a
//! future. The module is then searched for a constructor with
//! [`ComponentModule::resolve`], in this order:
//!
//! 1. the default export, when it is a constructor
//! 2. the export named after the component (exact, or after dropping `-`
//!    and `_` and lowercasing)
//! 3. the first constructor export
//!
//! A module with none of these fails with [`LoadError::NoConstructor`].

use crate::component::{Constructor, SharedComponent};
use crate::error::LoadError;
use futures::future::{self, LocalBoxFuture};
use std::fmt;
use std::future::{Future, IntoFuture};
use std::rc::Rc;

/// One export of a component module.
#[derive(Clone)]
pub enum Export {
	/// A component constructor.
	Constructor(Constructor),
	/// Any other value (configuration, constants).
	Value(serde_json::Value),
}

impl Export {
	/// Wraps a constructor closure.
	pub fn constructor<F>(constructor: F) -> Self
	where
		F: Fn() -> SharedComponent + 'static,
	{
		Self::Constructor(Rc::new(constructor))
	}

	/// The constructor, if this export is one.
	pub fn as_constructor(&self) -> Option<&Constructor> {
		match self {
			Self::Constructor(constructor) => Some(constructor),
			Self::Value(_) => None,
		}
	}
}

impl fmt::Debug for Export {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Constructor(_) => f.write_str("Export::Constructor(..)"),
			Self::Value(value) => f.debug_tuple("Export::Value").field(value).finish(),
		}
	}
}

/// A loaded module: an optional default export plus named exports.
#[derive(Debug, Clone, Default)]
pub struct ComponentModule {
	default: Option<Export>,
	named: Vec<(String, Export)>,
}

impl ComponentModule {
	/// An empty module.
	pub fn new() -> Self {
		Self::default()
	}

	/// A module whose default export is `constructor`.
	pub fn from_constructor<F>(constructor: F) -> Self
	where
		F: Fn() -> SharedComponent + 'static,
	{
		Self::new().with_default(Export::constructor(constructor))
	}

	/// Sets the default export.
	pub fn with_default(mut self, export: Export) -> Self {
		self.default = Some(export);
		self
	}

	/// Adds a named export.
	pub fn with_export(mut self, name: impl Into<String>, export: Export) -> Self {
		self.named.push((name.into(), export));
		self
	}

	/// Picks the constructor for `component`.
	pub fn resolve(&self, component: &str) -> Result<Constructor, LoadError> {
		if let Some(constructor) = self.default.as_ref().and_then(Export::as_constructor) {
			return Ok(constructor.clone());
		}

		let wanted = normalize(component);
		let by_name = self
			.named
			.iter()
			.find(|(name, export)| {
				export.as_constructor().is_some() && (name == component || normalize(name) == wanted)
			})
			.and_then(|(_, export)| export.as_constructor());
		if let Some(constructor) = by_name {
			return Ok(constructor.clone());
		}

		self.named
			.iter()
			.find_map(|(_, export)| export.as_constructor())
			.cloned()
			.ok_or_else(|| LoadError::NoConstructor {
				component: component.to_string(),
			})
	}
}

fn normalize(name: &str) -> String {
	name.chars()
		.filter(|c| *c != '-' && *c != '_')
		.flat_map(char::to_lowercase)
		.collect()
}

/// Future resolving to a module.
pub type LoadFuture = LocalBoxFuture<'static, Result<ComponentModule, LoadError>>;

/// Outcome of invoking a loader.
pub enum Load {
	/// The module (or its failure) is available now.
	Ready(Result<ComponentModule, LoadError>),
	/// The module arrives later.
	Pending(LoadFuture),
}

impl Load {
	/// An immediately available module.
	pub fn ready(module: ComponentModule) -> Self {
		Self::Ready(Ok(module))
	}

	/// An immediate, retryable failure.
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Ready(Err(LoadError::failed(message)))
	}

	/// A module delivered by `future`.
	pub fn pending<F>(future: F) -> Self
	where
		F: Future<Output = Result<ComponentModule, LoadError>> + 'static,
	{
		Self::Pending(Box::pin(future))
	}

	/// Whether the outcome must be awaited.
	pub fn is_pending(&self) -> bool {
		matches!(self, Self::Pending(_))
	}
}

impl IntoFuture for Load {
	type Output = Result<ComponentModule, LoadError>;
	type IntoFuture = LoadFuture;

	fn into_future(self) -> LoadFuture {
		match self {
			Self::Ready(result) => Box::pin(future::ready(result)),
			Self::Pending(future) => future,
		}
	}
}

impl fmt::Debug for Load {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Ready(result) => f.debug_tuple("Load::Ready").field(result).finish(),
			Self::Pending(_) => f.write_str("Load::Pending(..)"),
		}
	}
}

/// Zero-argument loader invoked on first use of a component.
pub type Loader = Rc<dyn Fn() -> Load>;
