//! Performance counters.

use serde::Serialize;
use std::time::Duration;

/// Monotonic lifecycle counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PerformanceMetrics {
	/// Successful real mounts.
	pub mounts: u64,
	/// Successful real unmounts.
	pub unmounts: u64,
	/// Mount hooks that failed, plus elements whose component failed to resolve.
	pub mount_failures: u64,
	/// Unmount hooks that failed.
	pub unmount_failures: u64,
	/// Completed fragment replacements.
	pub fragment_replacements: u64,
	/// Aborted fragment replacements.
	pub fragment_failures: u64,
	/// Modules loaded.
	pub load_successes: u64,
	/// Loads abandoned.
	pub load_failures: u64,
	/// Retries scheduled.
	pub retries: u64,
	/// Mutation batches processed.
	pub mutation_batches: u64,
	/// Time spent inside mount hooks.
	pub total_mount_time: Duration,
}

impl PerformanceMetrics {
	pub(crate) fn record_mount(&mut self, elapsed: Duration) {
		self.mounts += 1;
		self.total_mount_time += elapsed;
	}

	/// Mean time per successful mount.
	pub fn average_mount_time(&self) -> Option<Duration> {
		let mounts = u32::try_from(self.mounts).ok().filter(|&n| n > 0)?;
		Some(self.total_mount_time / mounts)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_average_mount_time() {
		// Arrange
		let mut metrics = PerformanceMetrics::default();
		assert_eq!(metrics.average_mount_time(), None);

		// Act
		metrics.record_mount(Duration::from_millis(2));
		metrics.record_mount(Duration::from_millis(4));

		// Assert
		assert_eq!(metrics.mounts, 2);
		assert_eq!(metrics.average_mount_time(), Some(Duration::from_millis(3)));
	}

	#[rstest]
	fn test_metrics_serialize_as_flat_counters() {
		// Arrange
		let metrics = PerformanceMetrics {
			fragment_replacements: 2,
			retries: 1,
			..PerformanceMetrics::default()
		};

		// Act
		let value = serde_json::to_value(&metrics).unwrap();

		// Assert
		assert_eq!(value["fragment_replacements"], 2);
		assert_eq!(value["retries"], 1);
		assert_eq!(value["mounts"], 0);
	}
}
