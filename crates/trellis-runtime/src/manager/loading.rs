//! Instance resolution: loading, deferred proxies, retries and replay.

use super::LifecycleManager;
use crate::error::{LifecycleError, LifecycleResult};
use crate::events::Notification;
use crate::markers::{self, ERROR_ATTR, LOADING_ATTR};
use crate::platform;
use std::rc::Rc;
use trellis_components::{
	Component, ComponentConfig, Constructor, DeferredComponentProxy, InstanceSlot, Load, LoadError,
	LoadFuture, QueuedAction, SharedComponent,
};
use trellis_dom::{Dom, NodeId};

impl LifecycleManager {
	/// Returns the instance slot of `component`, loading it if needed.
	///
	/// Dependencies are resolved first; a dependency that is missing or
	/// fails is logged and does not block the dependent. While a module is
	/// loading, every caller receives the same pending proxy and the loader
	/// is not invoked again.
	///
	/// # Errors
	///
	/// Fails for unknown components, after teardown, and when a synchronous
	/// load fails without retries left.
	pub fn ensure_instance(&self, component: &str) -> LifecycleResult<InstanceSlot> {
		self.check_alive()?;
		let mut resolving = Vec::new();
		self.resolve_instance(component, &mut resolving)
	}

	fn resolve_instance(
		&self,
		component: &str,
		resolving: &mut Vec<String>,
	) -> LifecycleResult<InstanceSlot> {
		let cached = self.instance(component);
		if let Some(slot) = cached {
			return Ok(slot);
		}
		let config = self
			.inner
			.registry
			.get(component)
			.cloned()
			.ok_or_else(|| LifecycleError::UnknownComponent(component.to_string()))?;

		resolving.push(component.to_string());
		for dependency in config.depends_on() {
			if resolving.iter().any(|name| name == dependency) {
				continue;
			}
			if !self.inner.registry.contains(dependency) {
				tracing::warn!(component, %dependency, "dependency is not registered");
				continue;
			}
			if let Err(error) = self.resolve_instance(dependency, resolving) {
				tracing::warn!(component, %dependency, %error, "dependency failed to resolve");
			}
		}
		resolving.pop();

		self.begin_load(&config)
	}

	fn begin_load(&self, config: &ComponentConfig) -> LifecycleResult<InstanceSlot> {
		let name = config.name();
		tracing::debug!(component = name, "loading component module");
		let load = match config.load() {
			Load::Ready(result) => match result.and_then(|module| module.resolve(name)) {
				Ok(constructor) => {
					let slot = InstanceSlot::Ready(constructor());
					self.install(name, slot.clone());
					self.record_load_success(name, 1);
					return Ok(slot);
				}
				Err(error) if error.is_retryable() && self.inner.settings.max_retries > 0 => {
					Load::Ready(Err(error))
				}
				Err(error) => {
					self.record_abandoned(name, &error, 1);
					return Err(error.into());
				}
			},
			pending => pending,
		};

		let slot = InstanceSlot::Pending(Rc::new(self.proxy_for(name)));
		self.install(name, slot.clone());
		platform::spawn_local(self.clone().drive_load(config.clone(), load.into_future()));
		Ok(slot)
	}

	fn install(&self, name: &str, slot: InstanceSlot) {
		self.inner
			.state
			.borrow_mut()
			.instances
			.insert(name.to_string(), slot);
	}

	fn proxy_for(&self, name: &str) -> DeferredComponentProxy {
		let queued = name.to_string();
		let dequeued = name.to_string();
		DeferredComponentProxy::new(
			name,
			move |dom: &Dom, element| {
				markers::add_token(&mut dom.write(), element, LOADING_ATTR, &queued);
			},
			move |dom: &Dom, element| {
				markers::remove_token(&mut dom.write(), element, LOADING_ATTR, &dequeued);
			},
		)
	}

	async fn drive_load(self, config: ComponentConfig, mut attempt: LoadFuture) {
		let name = config.name().to_string();
		let max_retries = self.inner.settings.max_retries;
		let mut retries = 0_u32;
		loop {
			let result = attempt.await.and_then(|module| module.resolve(&name));
			if self.is_torn_down() {
				tracing::debug!(component = %name, "discarding load result after teardown");
				return;
			}
			let error = match result {
				Ok(constructor) => {
					self.complete_load(&name, constructor, retries + 1);
					return;
				}
				Err(error) => error,
			};
			if !error.is_retryable() || retries >= max_retries {
				self.abandon_load(&name, error, retries + 1);
				return;
			}

			let delay = self.inner.settings.retry.delay_for(retries);
			retries += 1;
			self.inner.state.borrow_mut().metrics.retries += 1;
			tracing::warn!(
				component = %name,
				attempt = retries,
				delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
				%error,
				"component load failed, retrying"
			);
			self.notify(Notification::LoadFailed {
				component: name.clone(),
				attempt: retries,
				will_retry: true,
				error: error.to_string(),
			});
			self.flag_queued_targets(&name);

			platform::sleep(delay).await;
			if self.is_torn_down() {
				return;
			}
			attempt = config.load().into_future();
		}
	}

	fn complete_load(&self, name: &str, constructor: Constructor, attempts: u32) {
		let instance = constructor();
		let proxy = {
			let mut state = self.inner.state.borrow_mut();
			state
				.instances
				.entry(name.to_string())
				.or_insert_with(|| InstanceSlot::Ready(instance.clone()))
				.resolve(instance.clone())
		};
		self.record_load_success(name, attempts);
		if let Some(proxy) = proxy {
			self.replay(name, &instance, proxy.drain());
		}
	}

	fn replay(&self, name: &str, instance: &SharedComponent, queue: Vec<(QueuedAction, NodeId)>) {
		tracing::debug!(component = name, queued = queue.len(), "replaying queued requests");
		for (action, element) in queue {
			{
				let mut doc = self.inner.dom.write();
				markers::remove_token(&mut doc, element, LOADING_ATTR, name);
				markers::remove_token(&mut doc, element, ERROR_ATTR, name);
			}
			match action {
				QueuedAction::Mount => {
					self.invoke_mount(name, instance, element);
				}
				QueuedAction::Unmount => self.invoke_unmount(name, instance, element),
			}
		}
	}

	// Targets queued on a failed attempt carry the error marker until a
	// later attempt replays them.
	fn flag_queued_targets(&self, name: &str) {
		let queued = match self.inner.state.borrow().instances.get(name) {
			Some(InstanceSlot::Pending(proxy)) => proxy.elements(),
			_ => return,
		};
		let mut doc = self.inner.dom.write();
		for element in queued {
			markers::add_token(&mut doc, element, ERROR_ATTR, name);
		}
	}

	fn abandon_load(&self, name: &str, error: LoadError, attempts: u32) {
		let error = if attempts > 1 {
			LoadError::Exhausted {
				component: name.to_string(),
				attempts,
				last: Box::new(error),
			}
		} else {
			error
		};
		let slot = self.inner.state.borrow_mut().instances.remove(name);
		if let Some(InstanceSlot::Pending(proxy)) = slot {
			let stranded = proxy.elements();
			proxy.drain();
			let mut doc = self.inner.dom.write();
			for element in stranded {
				markers::clear_mount(&mut doc, element, name);
				markers::add_token(&mut doc, element, ERROR_ATTR, name);
			}
		}
		self.record_abandoned(name, &error, attempts);
	}

	fn record_load_success(&self, name: &str, attempts: u32) {
		{
			let mut state = self.inner.state.borrow_mut();
			state.load_errors.remove(name);
			state.metrics.load_successes += 1;
		}
		tracing::info!(component = name, attempts, "component loaded");
		self.notify(Notification::LoadSucceeded {
			component: name.to_string(),
			attempts,
		});
	}

	fn record_abandoned(&self, name: &str, error: &LoadError, attempts: u32) {
		{
			let mut state = self.inner.state.borrow_mut();
			state.load_errors.insert(name.to_string(), error.clone());
			state.metrics.load_failures += 1;
		}
		tracing::error!(component = name, attempts, %error, "component load abandoned");
		self.notify(Notification::LoadFailed {
			component: name.to_string(),
			attempt: attempts,
			will_retry: false,
			error: error.to_string(),
		});
	}
}
