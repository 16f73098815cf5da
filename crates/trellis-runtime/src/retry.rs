//! Backoff strategies for failed component loads.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long to wait before each retry.
///
/// Delays are expressed in milliseconds so the strategy can be read from a
/// settings file:
///
/// ```toml
/// [retry]
/// strategy = "exponential_backoff"
/// initial_delay_ms = 100
/// max_delay_ms = 5000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RetryStrategy {
	/// Retry without delay.
	Immediate,

	/// Same delay before every retry.
	FixedDelay {
		/// Delay between attempts.
		delay_ms: u64,
	},

	/// Delay doubles per retry, capped.
	ExponentialBackoff {
		/// Delay before the first retry.
		initial_delay_ms: u64,
		/// Upper bound.
		max_delay_ms: u64,
	},

	/// Delay grows by a constant step per retry.
	LinearBackoff {
		/// Step size.
		base_delay_ms: u64,
	},
}

impl Default for RetryStrategy {
	fn default() -> Self {
		Self::ExponentialBackoff {
			initial_delay_ms: 100,
			max_delay_ms: 5_000,
		}
	}
}

impl RetryStrategy {
	/// Delay before retry number `retry` (zero-based).
	pub fn delay_for(&self, retry: u32) -> Duration {
		match *self {
			Self::Immediate => Duration::ZERO,
			Self::FixedDelay { delay_ms } => Duration::from_millis(delay_ms),
			Self::ExponentialBackoff {
				initial_delay_ms,
				max_delay_ms,
			} => {
				let factor = 1_u64 << retry.min(32);
				Duration::from_millis(initial_delay_ms.saturating_mul(factor).min(max_delay_ms))
			}
			Self::LinearBackoff { base_delay_ms } => {
				Duration::from_millis(base_delay_ms).saturating_mul(retry.saturating_add(1))
			}
		}
	}
}
