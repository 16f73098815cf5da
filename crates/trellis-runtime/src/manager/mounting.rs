//! Scoped mounting and unmounting.

use super::LifecycleManager;
use crate::error::LifecycleResult;
use crate::events::Notification;
use crate::markers::{self, ERROR_ATTR, MOUNTED_ATTR, OWNER_ATTR};
use crate::platform::Stopwatch;
use std::collections::HashSet;
use std::ops::AddAssign;
use trellis_components::{Component, ComponentConfig, InstanceSlot, Priority, SharedComponent};
use trellis_dom::{Document, NodeId};

/// Counts produced by one mounting pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountSummary {
	/// Elements mounted by a ready instance.
	pub mounted: usize,
	/// Elements queued on a loading component.
	pub deferred: usize,
	/// Elements whose mount failed or whose component could not load.
	pub failed: usize,
}

impl MountSummary {
	/// Every element the pass touched.
	pub fn total(&self) -> usize {
		self.mounted + self.deferred + self.failed
	}
}

impl AddAssign for MountSummary {
	fn add_assign(&mut self, other: Self) {
		self.mounted += other.mounted;
		self.deferred += other.deferred;
		self.failed += other.failed;
	}
}

enum MountOutcome {
	Skipped,
	Mounted,
	Deferred,
	Failed,
}

impl LifecycleManager {
	/// Mounts every matching, not yet mounted element inside `root`.
	///
	/// With `added`, only those subtrees are scanned (each must be inside
	/// `root`). With `priority`, only that tier runs. Components without a
	/// matching element are never loaded.
	///
	/// # Errors
	///
	/// Fails only after teardown; per-component failures are counted in
	/// the summary and reported through notifications.
	pub fn mount_all_within(
		&self,
		root: NodeId,
		added: Option<&[NodeId]>,
		priority: Option<Priority>,
	) -> LifecycleResult<MountSummary> {
		self.check_alive()?;
		Ok(self.mount_scoped(root, added, priority, None))
	}

	/// Mounts one priority tier inside `root`.
	///
	/// # Errors
	///
	/// Fails only after teardown.
	pub fn mount_tier_within(&self, root: NodeId, priority: Priority) -> LifecycleResult<MountSummary> {
		self.mount_all_within(root, None, Some(priority))
	}

	pub(crate) fn mount_scoped(
		&self,
		root: NodeId,
		added: Option<&[NodeId]>,
		priority: Option<Priority>,
		owner: Option<&str>,
	) -> MountSummary {
		let mut summary = MountSummary::default();
		let configs: Vec<ComponentConfig> = self
			.inner
			.registry
			.iter()
			.filter(|config| priority.is_none_or(|tier| config.priority() == tier))
			.cloned()
			.collect();

		for config in configs {
			let candidates = self.unmounted_matches(&config, root, added);
			if candidates.is_empty() {
				continue;
			}
			let slot = match self.ensure_instance(config.name()) {
				Ok(slot) => slot,
				Err(error) => {
					tracing::warn!(
						component = config.name(),
						elements = candidates.len(),
						%error,
						"component unavailable, marking elements as failed"
					);
					self.mark_failed(config.name(), &candidates);
					summary.failed += candidates.len();
					continue;
				}
			};
			for element in candidates {
				match self.mount_element(config.name(), &slot, element, owner) {
					MountOutcome::Mounted => summary.mounted += 1,
					MountOutcome::Deferred => summary.deferred += 1,
					MountOutcome::Failed => summary.failed += 1,
					MountOutcome::Skipped => {}
				}
			}
		}
		summary
	}

	fn unmounted_matches(
		&self,
		config: &ComponentConfig,
		root: NodeId,
		added: Option<&[NodeId]>,
	) -> Vec<NodeId> {
		let doc = self.inner.dom.read();
		let root_scope = [root];
		let scopes = added.unwrap_or(&root_scope);
		let mut seen = HashSet::new();
		let mut matches = Vec::new();
		for &scope in scopes {
			if !doc.is_connected(scope) || !doc.contains(root, scope) {
				continue;
			}
			let own = doc.matches(scope, config.selector()).then_some(scope);
			for element in own.into_iter().chain(doc.query_selector_all(scope, config.selector())) {
				if seen.insert(element)
					&& !markers::has_token(&doc, element, MOUNTED_ATTR, config.name())
				{
					matches.push(element);
				}
			}
		}
		matches
	}

	fn mark_failed(&self, component: &str, elements: &[NodeId]) {
		{
			let mut doc = self.inner.dom.write();
			for &element in elements {
				markers::add_token(&mut doc, element, ERROR_ATTR, component);
			}
		}
		self.inner.state.borrow_mut().metrics.mount_failures += elements.len() as u64;
	}

	fn mount_element(
		&self,
		component: &str,
		slot: &InstanceSlot,
		element: NodeId,
		owner: Option<&str>,
	) -> MountOutcome {
		{
			let mut doc = self.inner.dom.write();
			if !doc.is_connected(element) || markers::has_token(&doc, element, MOUNTED_ATTR, component)
			{
				return MountOutcome::Skipped;
			}
			markers::add_token(&mut doc, element, MOUNTED_ATTR, component);
			markers::remove_token(&mut doc, element, ERROR_ATTR, component);
			if let Some(owner) = owner
				&& let Err(error) = doc.set_attribute(element, OWNER_ATTR, owner)
			{
				tracing::trace!(component, %element, owner, %error, "owner marker not written");
			}
		}

		match slot {
			InstanceSlot::Pending(proxy) => {
				if let Err(error) = proxy.mount(&self.inner.dom, element) {
					tracing::trace!(component, %element, %error, "deferred mount not queued");
				}
				tracing::debug!(component, %element, "mount deferred until load completes");
				MountOutcome::Deferred
			}
			InstanceSlot::Ready(instance) => {
				if self.invoke_mount(component, instance, element) {
					MountOutcome::Mounted
				} else {
					MountOutcome::Failed
				}
			}
		}
	}

	/// Runs the mount hook, returning whether it succeeded.
	pub(crate) fn invoke_mount(
		&self,
		component: &str,
		instance: &SharedComponent,
		element: NodeId,
	) -> bool {
		let stopwatch = Stopwatch::start();
		match instance.mount(&self.inner.dom, element) {
			Ok(()) => {
				self.inner
					.state
					.borrow_mut()
					.metrics
					.record_mount(stopwatch.elapsed());
				tracing::debug!(component, %element, "mounted");
				self.notify(Notification::Mounted {
					component: component.to_string(),
					element,
				});
				true
			}
			Err(error) => {
				{
					let mut doc = self.inner.dom.write();
					markers::clear_mount(&mut doc, element, component);
					markers::add_token(&mut doc, element, ERROR_ATTR, component);
				}
				self.inner.state.borrow_mut().metrics.mount_failures += 1;
				tracing::warn!(component, %element, %error, "mount failed");
				self.notify(Notification::MountFailed {
					component: component.to_string(),
					element,
					error: error.to_string(),
				});
				false
			}
		}
	}

	pub(crate) fn invoke_unmount(&self, component: &str, instance: &SharedComponent, element: NodeId) {
		match instance.unmount(&self.inner.dom, element) {
			Ok(()) => {
				self.inner.state.borrow_mut().metrics.unmounts += 1;
				tracing::debug!(component, %element, "unmounted");
				self.notify(Notification::Unmounted {
					component: component.to_string(),
					element,
				});
			}
			Err(error) => {
				self.inner.state.borrow_mut().metrics.unmount_failures += 1;
				tracing::warn!(component, %element, %error, "unmount failed");
				self.notify(Notification::UnmountFailed {
					component: component.to_string(),
					element,
					error: error.to_string(),
				});
			}
		}
	}

	/// Unmounts every tracked element strictly inside `root`.
	///
	/// # Errors
	///
	/// Fails only after teardown.
	pub fn unmount_all_within(&self, root: NodeId) -> LifecycleResult<usize> {
		self.check_alive()?;
		Ok(self.unmount_where(|doc, element| element != root && doc.contains(root, element)))
	}

	/// Unmounts tracked elements that are no longer in the document.
	///
	/// # Errors
	///
	/// Fails only after teardown.
	pub fn unmount_removed(&self) -> LifecycleResult<usize> {
		self.check_alive()?;
		Ok(self.unmount_where(|doc, element| !doc.is_connected(element)))
	}

	pub(crate) fn unmount_where<P>(&self, predicate: P) -> usize
	where
		P: Fn(&Document, NodeId) -> bool,
	{
		let mut count = 0;
		for (name, slot) in self.tracked() {
			let tracked = slot.component().elements();
			let selected: Vec<NodeId> = {
				let doc = self.inner.dom.read();
				tracked
					.into_iter()
					.filter(|&element| predicate(&doc, element))
					.collect()
			};
			for element in selected {
				self.unmount_element(&name, &slot, element);
				count += 1;
			}
		}
		count
	}

	fn unmount_element(&self, component: &str, slot: &InstanceSlot, element: NodeId) {
		markers::clear_mount(&mut self.inner.dom.write(), element, component);
		match slot {
			InstanceSlot::Pending(proxy) => {
				let _ = proxy.unmount(&self.inner.dom, element);
			}
			InstanceSlot::Ready(instance) => self.invoke_unmount(component, instance, element),
		}
	}

	/// Instance slots in registry order.
	pub(crate) fn tracked(&self) -> Vec<(String, InstanceSlot)> {
		let state = self.inner.state.borrow();
		self.inner
			.registry
			.iter()
			.filter_map(|config| {
				state
					.instances
					.get(config.name())
					.map(|slot| (config.name().to_string(), slot.clone()))
			})
			.collect()
	}
}
