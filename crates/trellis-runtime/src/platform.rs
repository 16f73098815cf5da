//! Task spawning and timers for native and browser targets.
//!
//! Native builds use tokio and must run inside a `tokio::task::LocalSet`.

use std::future::Future;
use std::time::Duration;

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub(crate) fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	drop(tokio::task::spawn_local(future));
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub(crate) fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	wasm_bindgen_futures::spawn_local(future);
}

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub(crate) async fn sleep(duration: Duration) {
	tokio::time::sleep(duration).await;
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub(crate) async fn sleep(duration: Duration) {
	gloo_timers::future::sleep(duration).await;
}

/// Measures elapsed wall time.
#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub(crate) struct Stopwatch(std::time::Instant);

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
impl Stopwatch {
	pub(crate) fn start() -> Self {
		Self(std::time::Instant::now())
	}

	pub(crate) fn elapsed(&self) -> Duration {
		self.0.elapsed()
	}
}

/// Measures elapsed wall time.
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub(crate) struct Stopwatch(f64);

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
impl Stopwatch {
	pub(crate) fn start() -> Self {
		Self(js_sys::Date::now())
	}

	pub(crate) fn elapsed(&self) -> Duration {
		Duration::from_secs_f64(((js_sys::Date::now() - self.0) / 1000.0).max(0.0))
	}
}
