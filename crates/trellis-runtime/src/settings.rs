//! Lifecycle manager settings.
//!
//! Settings have sensible defaults and can be overridden in code with the
//! `with_*` builders or loaded from TOML:
//!
//! ```toml
//! mutation_throttle_ms = 50
//! max_retries = 3
//! normal_mount_delay_ms = 16
//! scroll = "preserve"
//! primary_targets = ["main", "content"]
//!
//! [retry]
//! strategy = "fixed_delay"
//! delay_ms = 250
//! ```

use crate::error::SettingsError;
use crate::retry::RetryStrategy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Scroll handling after the primary region is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollRestoration {
	/// Scroll to the top-left corner.
	#[default]
	Top,
	/// Restore the offset captured before the swap.
	Preserve,
	/// Scroll the element with this id into view, or to the top if absent.
	Anchor(String),
	/// Leave scroll untouched.
	#[serde(rename = "none")]
	Disabled,
}

/// Tunables of a [`LifecycleManager`](crate::LifecycleManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleSettings {
	/// Window within which mutation records are coalesced into one pass.
	pub mutation_throttle_ms: u64,
	/// Retries after the first failed load attempt.
	pub max_retries: u32,
	/// Backoff between load attempts.
	pub retry: RetryStrategy,
	/// Delay before mounting the normal tier after a fragment swap.
	/// `None` mounts it immediately.
	pub normal_mount_delay_ms: Option<u64>,
	/// Scroll handling for primary-region swaps.
	pub scroll: ScrollRestoration,
	/// Capture the scroll offset before swapping.
	pub capture_scroll: bool,
	/// Fragment targets treated as the primary region.
	pub primary_targets: Vec<String>,
	/// Attributes copied from the incoming fragment root to the live one.
	pub state_attributes: Vec<String>,
	/// Live class tokens with this prefix survive a swap.
	pub preserved_class_prefix: String,
	/// Locate fragments by exact label only.
	pub strict_fragment_lookup: bool,
	/// Start tree observation after the first fragment swap.
	pub observe_after_replace: bool,
}

impl Default for LifecycleSettings {
	fn default() -> Self {
		Self {
			mutation_throttle_ms: 50,
			max_retries: 3,
			retry: RetryStrategy::default(),
			normal_mount_delay_ms: None,
			scroll: ScrollRestoration::Top,
			capture_scroll: true,
			primary_targets: vec!["main".to_string()],
			state_attributes: [
				"aria-busy",
				"aria-live",
				"data-loading",
				"data-error",
				"data-version",
			]
			.into_iter()
			.map(String::from)
			.collect(),
			preserved_class_prefix: "tr-".to_string(),
			strict_fragment_lookup: false,
			observe_after_replace: true,
		}
	}
}

impl LifecycleSettings {
	/// Default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses settings from a TOML document; missing keys keep defaults.
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}

	/// Reads settings from a TOML file.
	pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&source)
	}

	/// Mutation coalescing window.
	pub fn mutation_throttle(&self) -> Duration {
		Duration::from_millis(self.mutation_throttle_ms)
	}

	/// Normal-tier delay after a swap.
	pub fn normal_mount_delay(&self) -> Option<Duration> {
		self.normal_mount_delay_ms.map(Duration::from_millis)
	}

	/// Whether `target` names a primary region.
	pub fn is_primary_target(&self, target: &str) -> bool {
		self.primary_targets.iter().any(|primary| primary == target)
	}

	/// Sets the mutation coalescing window.
	pub fn with_mutation_throttle(mut self, throttle: Duration) -> Self {
		self.mutation_throttle_ms = duration_ms(throttle);
		self
	}

	/// Sets the retry budget.
	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;
		self
	}

	/// Sets the backoff strategy.
	pub fn with_retry_strategy(mut self, retry: RetryStrategy) -> Self {
		self.retry = retry;
		self
	}

	/// Defers the normal tier after swaps.
	pub fn with_normal_mount_delay(mut self, delay: Option<Duration>) -> Self {
		self.normal_mount_delay_ms = delay.map(duration_ms);
		self
	}

	/// Sets scroll handling.
	pub fn with_scroll(mut self, scroll: ScrollRestoration) -> Self {
		self.scroll = scroll;
		self
	}

	/// Sets the primary fragment targets.
	pub fn with_primary_targets<I, S>(mut self, targets: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.primary_targets = targets.into_iter().map(Into::into).collect();
		self
	}

	/// Sets the state attribute allow-list.
	pub fn with_state_attributes<I, S>(mut self, attributes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.state_attributes = attributes.into_iter().map(Into::into).collect();
		self
	}

	/// Restricts fragment lookup to exact labels.
	pub fn with_strict_fragment_lookup(mut self, strict: bool) -> Self {
		self.strict_fragment_lookup = strict;
		self
	}

	/// Controls observation start after swaps.
	pub fn with_observe_after_replace(mut self, observe: bool) -> Self {
		self.observe_after_replace = observe;
		self
	}
}

fn duration_ms(duration: Duration) -> u64 {
	u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
