//! Error types for registration, loading and component hooks.

use thiserror::Error;
use trellis_dom::DomError;

/// Registry validation failures.
///
/// Duplicate selectors are not errors; they surface as
/// [`RegistryWarning`](crate::RegistryWarning)s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
	/// Two registrations share a name.
	#[error("Component '{0}' is registered more than once")]
	DuplicateName(String),

	/// A selector string failed to parse.
	#[error("Component '{component}' has an invalid selector: {source}")]
	InvalidSelector {
		/// Component being registered.
		component: String,
		/// Parser error.
		#[source]
		source: DomError,
	},

	/// No loader was supplied.
	#[error("Component '{component}' has no loader")]
	MissingLoader {
		/// Component being registered.
		component: String,
	},

	/// A `depends_on` entry names an unregistered component.
	#[error("Component '{component}' depends on unregistered component '{dependency}'")]
	MissingDependency {
		/// Dependent component.
		component: String,
		/// Missing dependency.
		dependency: String,
	},

	/// `depends_on` edges form a cycle.
	#[error("Circular dependency detected: {path}")]
	CircularDependency {
		/// The cycle, e.g. `a -> b -> a`.
		path: String,
	},
}

/// Failures while loading or resolving a component module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum LoadError {
	/// The loader reported a failure. Retryable.
	#[error("Failed to load module: {0}")]
	Failed(String),

	/// The module has no usable constructor export.
	#[error("Module for component '{component}' exports no constructor")]
	NoConstructor {
		/// Component whose module was inspected.
		component: String,
	},

	/// Every attempt failed.
	#[error("Loading component '{component}' failed after {attempts} attempts: {last}")]
	Exhausted {
		/// Component being loaded.
		component: String,
		/// Attempts made, the first one included.
		attempts: u32,
		/// Error of the final attempt.
		last: Box<LoadError>,
	},
}

impl LoadError {
	/// Shorthand for [`LoadError::Failed`].
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed(message.into())
	}

	/// Whether another attempt could succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Failed(_))
	}
}

/// Failures reported by component mount/unmount hooks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ComponentError {
	/// Mount hook failed.
	#[error("mount failed: {0}")]
	Mount(String),

	/// Unmount hook failed.
	#[error("unmount failed: {0}")]
	Unmount(String),

	/// A document operation inside a hook failed.
	#[error(transparent)]
	Dom(#[from] DomError),
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
