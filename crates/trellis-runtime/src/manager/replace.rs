//! Fragment replacement and the navigation listener.

use super::{LifecycleManager, MountSummary};
use crate::error::{FragmentError, LifecycleResult};
use crate::events::Notification;
use crate::fragment::{self, LocateStrategy};
use crate::head::{self, HeadSyncReport};
use crate::navigation::NavigationEvent;
use crate::platform;
use crate::settings::ScrollRestoration;
use futures::future::abortable;
use std::rc::Rc;
use tokio::sync::mpsc::UnboundedReceiver;
use trellis_components::Priority;
use trellis_dom::{Document, NodeId, ScrollPosition};

/// Outcome of a successful [`LifecycleManager::replace_fragment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentReport {
	/// Fragment label.
	pub target: String,
	/// Live fragment root.
	pub node: NodeId,
	/// Rule that located the live fragment.
	pub strategy: LocateStrategy,
	/// Whether the fragment is the primary region.
	pub primary: bool,
	/// Elements unmounted inside the old content.
	pub unmounted: usize,
	/// Mounts performed synchronously.
	pub mounted: MountSummary,
	/// Whether the normal tier was scheduled for later.
	pub normal_deferred: bool,
	/// Head changes, for primary fragments.
	pub head: Option<HeadSyncReport>,
}

impl LifecycleManager {
	/// Replaces the live fragment named by `event.target` with the
	/// matching fragment of `event.markup`.
	///
	/// Lookup failures abort before the live document is touched.
	///
	/// # Errors
	///
	/// Returns [`FragmentError`] when the markup cannot be parsed or either
	/// fragment is missing, and fails after teardown.
	pub fn replace_fragment(&self, event: NavigationEvent) -> LifecycleResult<FragmentReport> {
		self.check_alive()?;
		tracing::debug!(target_label = %event.target, cause = %event.cause, "replacing fragment");
		self.notify(Notification::FragmentStarted {
			target: event.target.clone(),
			cause: event.cause,
		});

		match self.swap_fragment(&event) {
			Ok(report) => {
				self.inner.state.borrow_mut().metrics.fragment_replacements += 1;
				tracing::info!(
					target_label = %report.target,
					strategy = ?report.strategy,
					unmounted = report.unmounted,
					mounted = report.mounted.mounted,
					"fragment replaced"
				);
				self.notify(Notification::FragmentSucceeded {
					target: report.target.clone(),
					unmounted: report.unmounted,
					mounted: report.mounted.mounted,
				});
				Ok(report)
			}
			Err(error) => {
				self.inner.state.borrow_mut().metrics.fragment_failures += 1;
				tracing::error!(target_label = %event.target, %error, "fragment replacement failed");
				self.notify(Notification::FragmentFailed {
					target: event.target.clone(),
					error: error.to_string(),
				});
				Err(error.into())
			}
		}
	}

	fn swap_fragment(&self, event: &NavigationEvent) -> Result<FragmentReport, FragmentError> {
		let settings = &self.inner.settings;
		let label = event.target.as_str();
		let captured = settings
			.capture_scroll
			.then(|| self.inner.dom.read().scroll_position());

		let parsed = Document::parse(&event.markup).map_err(|source| FragmentError::Parse {
			target: label.to_string(),
			source,
		})?;
		let source = fragment::locate(&parsed, label, settings.strict_fragment_lookup)
			.ok_or_else(|| FragmentError::SourceNotFound {
				target: label.to_string(),
			})?;
		let live = {
			let doc = self.inner.dom.read();
			fragment::locate(&doc, label, settings.strict_fragment_lookup)
		}
		.ok_or_else(|| FragmentError::TargetNotFound {
			target: label.to_string(),
		})?;
		let target = live.node;

		let unmounted =
			self.unmount_where(|doc, element| element != target && doc.contains(target, element));

		// Records from the swap itself stay undelivered; the tiers below
		// mount the new content with its owner marker.
		let (primary, head) = self.inner.dom.write().unobserved(|doc| {
			fragment::swap_content(doc, target, &parsed, source.node, settings).map_err(
				|source| FragmentError::Swap {
					target: label.to_string(),
					source,
				},
			)?;

			let primary = fragment::is_primary(doc, target, label, settings);
			let head = if primary {
				let scroll = event.scroll.as_ref().unwrap_or(&settings.scroll);
				restore_scroll(doc, scroll, captured);
				Some(head::sync_head(doc, &parsed).map_err(|source| FragmentError::Swap {
					target: label.to_string(),
					source,
				})?)
			} else {
				None
			};
			Ok::<_, FragmentError>((primary, head))
		})?;
		if let Some(report) = &head
			&& report.changed()
		{
			tracing::debug!(
				target_label = label,
				title = ?report.title,
				removed = report.removed,
				inserted = report.inserted,
				"head metadata synchronized"
			);
			self.notify(Notification::HeadUpdated {
				target: label.to_string(),
				title: report.title.clone(),
			});
		}

		let mut mounted = self.mount_scoped(target, None, Some(Priority::Critical), Some(label));
		let normal_deferred = match settings.normal_mount_delay() {
			Some(delay) => {
				self.schedule_normal_tier(target, label.to_string(), delay);
				true
			}
			None => {
				self.inner.state.borrow_mut().deferred_tiers.remove(&target);
				mounted += self.mount_scoped(target, None, Some(Priority::Normal), Some(label));
				false
			}
		};

		if settings.observe_after_replace
			&& let Err(error) = self.observe()
		{
			tracing::warn!(%error, "could not start observing after fragment replacement");
		}

		Ok(FragmentReport {
			target: label.to_string(),
			node: target,
			strategy: live.strategy,
			primary,
			unmounted,
			mounted,
			normal_deferred,
			head,
		})
	}

	fn schedule_normal_tier(&self, target: NodeId, label: String, delay: std::time::Duration) {
		let generation = {
			let mut state = self.inner.state.borrow_mut();
			state.swap_generation += 1;
			let generation = state.swap_generation;
			state.deferred_tiers.insert(target, generation);
			generation
		};
		let inner = Rc::downgrade(&self.inner);
		platform::spawn_local(async move {
			platform::sleep(delay).await;
			let Some(manager) = LifecycleManager::upgrade(&inner) else {
				return;
			};
			let current = {
				let mut state = manager.inner.state.borrow_mut();
				let current = state.deferred_tiers.get(&target) == Some(&generation);
				if current {
					state.deferred_tiers.remove(&target);
				}
				current
			};
			// A later swap of the same target owns the tier now.
			if !current
				|| manager.is_torn_down()
				|| !manager.inner.dom.read().is_connected(target)
			{
				return;
			}
			let summary =
				manager.mount_scoped(target, None, Some(Priority::Normal), Some(label.as_str()));
			tracing::debug!(
				target_label = %label,
				mounted = summary.mounted,
				deferred = summary.deferred,
				"deferred normal tier mounted"
			);
		});
	}

	/// Applies every [`NavigationEvent`] received on `events`, in order.
	///
	/// A previously attached listener is detached. The listener stops at
	/// teardown or when the sender side closes.
	///
	/// # Errors
	///
	/// Fails after teardown.
	pub fn attach_navigation(
		&self,
		mut events: UnboundedReceiver<NavigationEvent>,
	) -> LifecycleResult<()> {
		self.check_alive()?;
		let inner = Rc::downgrade(&self.inner);
		let (task, handle) = abortable(async move {
			while let Some(event) = events.recv().await {
				let Some(manager) = LifecycleManager::upgrade(&inner) else {
					break;
				};
				if manager.is_torn_down() {
					break;
				}
				// Failures are logged and notified by replace_fragment.
				let _ = manager.replace_fragment(event);
			}
		});
		let previous = self.inner.state.borrow_mut().navigation.replace(handle);
		if let Some(previous) = previous {
			previous.abort();
		}
		platform::spawn_local(async move {
			let _ = task.await;
		});
		tracing::debug!("navigation listener attached");
		Ok(())
	}
}

fn restore_scroll(
	document: &mut Document,
	policy: &ScrollRestoration,
	captured: Option<ScrollPosition>,
) {
	match policy {
		ScrollRestoration::Top => document.scroll_to(ScrollPosition::TOP),
		ScrollRestoration::Preserve => {
			document.scroll_to(captured.unwrap_or(ScrollPosition::TOP));
		}
		ScrollRestoration::Anchor(id) => {
			let anchored = document
				.find_by_id(id)
				.is_some_and(|node| document.scroll_into_view(node));
			if !anchored {
				document.scroll_to(ScrollPosition::TOP);
			}
		}
		ScrollRestoration::Disabled => {}
	}
}
