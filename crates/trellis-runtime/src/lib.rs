//! # Trellis Runtime
//!
//! The lifecycle manager that brings server-rendered documents to life:
//! it matches registered components against the document, loads their
//! modules on first use, mounts and unmounts them as the tree changes and
//! swaps labeled fragments during soft navigation.
//!
//! ## Architecture
//!
//! ```text
//! NavigationEvent ──▶ replace_fragment ──▶ locate ─▶ unmount inside ─▶ swap_content
//!                                                                      ├── sync_head (primary)
//!                                                                      ├── restore scroll (primary)
//!                                                                      └── mount critical ─▶ mount normal
//!
//! MutationRecord ──▶ observe loop (throttled) ──▶ process_mutations
//!                                                 ├── unmount_removed
//!                                                 └── mount added subtrees
//!
//! ensure_instance ──▶ Load::Ready ──▶ InstanceSlot::Ready
//!                 └─▶ Load::Pending ──▶ InstanceSlot::Pending ──(retry)──▶ replay queue
//! ```
//!
//! ## Runtime
//!
//! Everything runs on one thread. Natively the manager spawns local tasks
//! and must be driven inside a `tokio::task::LocalSet`; on
//! `wasm32-unknown-unknown` tasks go through `wasm-bindgen-futures`.

#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod fragment;
pub mod head;
pub mod manager;
pub mod markers;
pub mod metrics;
pub mod navigation;
mod platform;
pub mod retry;
pub mod settings;

pub use error::{FragmentError, LifecycleError, LifecycleResult, SettingsError};
pub use events::{Notification, NotificationSink};
pub use fragment::{FragmentMatch, LocateStrategy};
pub use head::HeadSyncReport;
pub use manager::{FragmentReport, LifecycleManager, LifecycleManagerBuilder, MountSummary};
pub use metrics::PerformanceMetrics;
pub use navigation::{NavigationCause, NavigationEvent};
pub use retry::RetryStrategy;
pub use settings::{LifecycleSettings, ScrollRestoration};

/// Common imports for applications driving the runtime.
pub mod prelude {
	pub use crate::{
		LifecycleError, LifecycleManager, LifecycleSettings, NavigationCause, NavigationEvent,
		Notification, ScrollRestoration,
	};
	pub use trellis_components::prelude::*;
}
