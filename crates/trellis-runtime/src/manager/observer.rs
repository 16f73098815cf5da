//! Mutation observation with throttled batching.

use super::{Inner, LifecycleManager, MountSummary};
use crate::error::LifecycleResult;
use crate::platform;
use futures::future::abortable;
use std::collections::HashSet;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use trellis_components::Priority;
use trellis_dom::{MutationRecord, NodeId};

impl LifecycleManager {
	/// Starts watching the document for added and removed subtrees.
	///
	/// Records arriving within the throttle window are handled as one
	/// batch. Calling this while already observing does nothing.
	///
	/// # Errors
	///
	/// Fails after teardown.
	pub fn observe(&self) -> LifecycleResult<()> {
		self.check_alive()?;
		if self.is_observing() {
			return Ok(());
		}
		let receiver = self.inner.dom.write().observe();
		let throttle = self.inner.settings.mutation_throttle();
		let (task, handle) = abortable(observe_loop(Rc::downgrade(&self.inner), receiver, throttle));
		self.inner.state.borrow_mut().observer = Some(handle);
		platform::spawn_local(async move {
			let _ = task.await;
		});
		tracing::debug!(throttle_ms = self.inner.settings.mutation_throttle_ms, "observing document mutations");
		Ok(())
	}

	/// Whether a mutation observer is active.
	pub fn is_observing(&self) -> bool {
		self.inner
			.state
			.borrow()
			.observer
			.as_ref()
			.is_some_and(|handle| !handle.is_aborted())
			&& self.inner.dom.read().is_observed()
	}

	/// Handles one batch of mutation records.
	///
	/// Removed subtrees are unmounted first, then added subtrees are
	/// mounted tier by tier. The normal tier skips nodes inside a replaced
	/// fragment whose delayed normal tier has not run yet.
	///
	/// # Errors
	///
	/// Fails after teardown.
	pub fn process_mutations(&self, records: &[MutationRecord]) -> LifecycleResult<MountSummary> {
		self.check_alive()?;
		let unmounted = if records.iter().any(|record| !record.removed.is_empty()) {
			self.unmount_where(|doc, element| !doc.is_connected(element))
		} else {
			0
		};

		let mut seen = HashSet::new();
		let added: Vec<_> = records
			.iter()
			.flat_map(|record| record.added.iter().copied())
			.filter(|node| seen.insert(*node))
			.collect();
		let deferred: Vec<NodeId> = self
			.inner
			.state
			.borrow()
			.deferred_tiers
			.keys()
			.copied()
			.collect();
		let mut summary = MountSummary::default();
		if !added.is_empty() {
			let root = self.inner.dom.read().root();
			for priority in Priority::ALL {
				let scopes: Vec<NodeId> = if priority == Priority::Normal && !deferred.is_empty() {
					let doc = self.inner.dom.read();
					added
						.iter()
						.copied()
						.filter(|&node| !deferred.iter().any(|&target| doc.contains(target, node)))
						.collect()
				} else {
					added.clone()
				};
				if !scopes.is_empty() {
					summary += self.mount_scoped(root, Some(&scopes), Some(priority), None);
				}
			}
		}

		self.inner.state.borrow_mut().metrics.mutation_batches += 1;
		tracing::debug!(
			records = records.len(),
			added = added.len(),
			unmounted,
			mounted = summary.mounted,
			"processed mutation batch"
		);
		Ok(summary)
	}
}

async fn observe_loop(
	inner: Weak<Inner>,
	mut receiver: UnboundedReceiver<MutationRecord>,
	throttle: Duration,
) {
	while let Some(first) = receiver.recv().await {
		if !throttle.is_zero() {
			platform::sleep(throttle).await;
		}
		let mut batch = vec![first];
		while let Ok(record) = receiver.try_recv() {
			batch.push(record);
		}
		let Some(manager) = LifecycleManager::upgrade(&inner) else {
			break;
		};
		if let Err(error) = manager.process_mutations(&batch) {
			tracing::debug!(%error, "mutation observer stopped");
			break;
		}
	}
}
