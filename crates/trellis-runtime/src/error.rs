//! Error types for the lifecycle runtime.

use std::path::PathBuf;
use thiserror::Error;
use trellis_components::{LoadError, RegistryError};
use trellis_dom::DomError;

/// Errors returned by [`LifecycleManager`](crate::LifecycleManager).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LifecycleError {
	/// No component is registered under the name.
	#[error("Unknown component '{0}'")]
	UnknownComponent(String),

	/// A component module could not be loaded or resolved.
	#[error(transparent)]
	Load(#[from] LoadError),

	/// A fragment replacement was aborted.
	#[error(transparent)]
	Fragment(#[from] FragmentError),

	/// The registry is invalid.
	#[error(transparent)]
	Registry(#[from] RegistryError),

	/// Settings could not be loaded.
	#[error(transparent)]
	Settings(#[from] SettingsError),

	/// The manager was torn down.
	#[error("Lifecycle manager has been torn down")]
	TornDown,
}

/// Reasons a fragment replacement failed.
///
/// Every variant except [`FragmentError::Swap`] is raised before the live
/// document is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FragmentError {
	/// The incoming markup could not be parsed.
	#[error("Failed to parse markup for fragment '{target}': {source}")]
	Parse {
		/// Requested fragment.
		target: String,
		/// Parser error.
		#[source]
		source: DomError,
	},

	/// The incoming markup has no subtree for the target.
	#[error("Fragment '{target}' not found in incoming markup")]
	SourceNotFound {
		/// Requested fragment.
		target: String,
	},

	/// The live document has no subtree for the target.
	#[error("Fragment '{target}' not found in the live document")]
	TargetNotFound {
		/// Requested fragment.
		target: String,
	},

	/// Swapping content failed.
	#[error("Failed to swap fragment '{target}': {source}")]
	Swap {
		/// Requested fragment.
		target: String,
		/// Tree error.
		#[source]
		source: DomError,
	},
}

/// Settings loading failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
	/// The settings file could not be read.
	#[error("Failed to read settings file '{}': {source}", path.display())]
	Io {
		/// File that was read.
		path: PathBuf,
		/// I/O error.
		#[source]
		source: std::io::Error,
	},

	/// The settings document is malformed.
	#[error("Invalid lifecycle settings: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Result alias for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
