//! Integration tests for mutation-driven mounting.
//!
//! Covers:
//! - coalescing records within the throttle window
//! - unmounting removed subtrees
//! - direct batch processing and observer shutdown

mod common;

use common::*;
use rstest::*;
use trellis_components::prelude::*;
use trellis_dom::MutationRecord;
use trellis_runtime::{LifecycleManager, LifecycleSettings};

fn manager(markup: &str, spy: &Spy) -> (Dom, LifecycleManager) {
	let dom = Dom::parse(markup).unwrap();
	let registry = SelectorRegistry::new()
		.component("widget", ".widget", spy.options())
		.build()
		.unwrap();
	let manager = LifecycleManager::new(dom.clone(), registry);
	(dom, manager)
}

fn append_widget(dom: &Dom, parent: NodeId) -> NodeId {
	let mut doc = dom.write();
	let widget = doc.create_element("div");
	doc.set_attribute(widget, "class", "widget").unwrap();
	doc.append_child(parent, widget).unwrap();
	widget
}

// ============================================================================
// Observer
// ============================================================================

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_burst_within_window_is_one_batch() {
	local(async {
		// Arrange
		let spy = Spy::default();
		let (dom, manager) = manager(r#"<body><ul id="list"></ul></body>"#, &spy);
		manager.start().unwrap();
		let list = by_id(&dom, "list");

		// Act
		let added: Vec<NodeId> = (0..5).map(|_| append_widget(&dom, list)).collect();
		settle().await;

		// Assert
		assert_eq!(manager.metrics().mutation_batches, 1);
		assert_eq!(spy.calls(), added.iter().map(|&id| Call::Mount(id)).collect::<Vec<_>>());
	})
	.await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_bursts_in_separate_windows_are_separate_batches() {
	local(async {
		// Arrange
		let spy = Spy::default();
		let (dom, manager) = manager(r#"<body><ul id="list"></ul></body>"#, &spy);
		manager.start().unwrap();
		let list = by_id(&dom, "list");

		// Act
		append_widget(&dom, list);
		settle().await;
		append_widget(&dom, list);
		settle().await;

		// Assert
		assert_eq!(manager.metrics().mutation_batches, 2);
		assert_eq!(spy.mounts(), 2);
	})
	.await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_removed_subtree_is_unmounted() {
	local(async {
		// Arrange
		let spy = Spy::default();
		let (dom, manager) = manager(
			r#"<body><section id="panel"><div class="widget" id="w"></div></section></body>"#,
			&spy,
		);
		manager.start().unwrap();
		let widget = by_id(&dom, "w");

		// Act
		let panel = by_id(&dom, "panel");
		dom.write().remove(panel).unwrap();
		settle().await;

		// Assert
		assert_eq!(spy.calls(), [Call::Mount(widget), Call::Unmount(widget)]);
		assert_eq!(manager.metrics().unmounts, 1);
	})
	.await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_teardown_stops_observation() {
	local(async {
		// Arrange
		let spy = Spy::default();
		let (dom, manager) = manager(r#"<body><ul id="list"></ul></body>"#, &spy);
		manager.start().unwrap();
		let list = by_id(&dom, "list");

		// Act
		manager.teardown();
		append_widget(&dom, list);
		settle().await;

		// Assert
		assert!(!manager.is_observing());
		assert_eq!(spy.mounts(), 0);
		assert_eq!(manager.metrics().mutation_batches, 0);
	})
	.await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_observe_is_idempotent() {
	local(async {
		// Arrange
		let spy = Spy::default();
		let (dom, manager) = manager(r#"<body><ul id="list"></ul></body>"#, &spy);
		manager.observe().unwrap();

		// Act
		manager.observe().unwrap();
		append_widget(&dom, by_id(&dom, "list"));
		settle().await;

		// Assert
		assert!(manager.is_observing());
		assert_eq!(manager.metrics().mutation_batches, 1);
		assert_eq!(spy.mounts(), 1);
	})
	.await;
}

// ============================================================================
// Direct processing
// ============================================================================

#[rstest]
fn test_process_mutations_mounts_added_subtrees_only() {
	// Arrange
	let spy = Spy::default();
	let (dom, manager) = manager(
		r#"<body><div class="widget" id="old"></div><section id="host"></section></body>"#,
		&spy,
	);
	let host = by_id(&dom, "host");
	let fragment = {
		let mut doc = dom.write();
		let wrapper = doc.create_element("div");
		let inner = doc.create_element("span");
		doc.set_attribute(inner, "class", "widget").unwrap();
		doc.append_child(wrapper, inner).unwrap();
		doc.append_child(host, wrapper).unwrap();
		wrapper
	};
	let records = [MutationRecord::child_list(host, vec![fragment, fragment], Vec::new())];

	// Act
	let summary = manager.process_mutations(&records).unwrap();

	// Assert
	assert_eq!(summary.mounted, 1);
	assert!(!spy.calls().contains(&Call::Mount(by_id(&dom, "old"))));
	assert_eq!(manager.metrics().mutation_batches, 1);
}

#[rstest]
#[case(0)]
#[case(200)]
fn test_throttle_window_from_settings(#[case] millis: u64) {
	// Arrange
	let source = format!("mutation_throttle_ms = {millis}");

	// Act
	let settings = LifecycleSettings::from_toml_str(&source).unwrap();

	// Assert
	assert_eq!(settings.mutation_throttle().as_millis(), u128::from(millis));
}
