//! Integration tests for registry construction against real documents.
//!
//! Covers:
//! - predicate and CSS selectors side by side
//! - negation and relational pseudo-classes in registered selectors
//! - tier iteration used by the runtime
//! - eager flags and dependency ordering

use rstest::*;
use std::rc::Rc;
use trellis_components::prelude::*;
use trellis_components::{ComponentConfig, RegistryError};
use trellis_dom::{Document, Selector};

#[derive(Default)]
struct Inert(ElementTracker);

impl Component for Inert {
	fn mount(&self, _dom: &Dom, element: NodeId) -> Result<(), ComponentError> {
		self.0.insert(element);
		Ok(())
	}

	fn unmount(&self, _dom: &Dom, element: NodeId) -> Result<(), ComponentError> {
		self.0.remove(element);
		Ok(())
	}

	fn elements(&self) -> Vec<NodeId> {
		self.0.snapshot()
	}
}

fn inert() -> ComponentOptions {
	ComponentOptions::new().constructor(|| Rc::new(Inert::default()) as SharedComponent)
}

// ============================================================================
// Selectors
// ============================================================================

#[rstest]
fn test_registered_selectors_match_document() {
	// Arrange
	let doc = Document::parse(
		r#"<body><nav class="menu"></nav><a href="https://x.test">ext</a><a href="/in">in</a></body>"#,
	)
	.unwrap();
	let external = Selector::from_fn("external links", |doc, node| {
		doc.attribute(node, "href")
			.is_some_and(|href| href.starts_with("https://"))
	});
	let registry = SelectorRegistry::new()
		.component("menu", "nav.menu", inert())
		.component("external-link", external, inert())
		.build()
		.unwrap();

	// Act
	let counts: Vec<(String, usize)> = registry
		.iter()
		.map(|config| {
			(
				config.name().to_string(),
				doc.query_selector_all(doc.root(), config.selector()).len(),
			)
		})
		.collect();

	// Assert
	assert_eq!(
		counts,
		vec![("menu".to_string(), 1), ("external-link".to_string(), 1)]
	);
	assert!(registry.warnings().is_empty());
}

#[rstest]
#[case(".tabs:not(.static)", 1)]
#[case("section:has(> .tabs)", 1)]
#[case(":is(.tabs, .accordion):not([hidden])", 3)]
fn test_pseudo_class_selectors_register_and_match(
	#[case] selector: &str,
	#[case] expected: usize,
) {
	// Arrange
	let doc = Document::parse(
		r#"<body><section><div class="tabs"></div></section><div class="tabs static"></div><div class="accordion"></div><div class="accordion" hidden></div></body>"#,
	)
	.unwrap();

	// Act
	let registry = SelectorRegistry::new()
		.component("widget", selector, inert())
		.build()
		.unwrap();

	// Assert
	let config = registry.iter().next().unwrap();
	assert_eq!(
		doc.query_selector_all(doc.root(), config.selector()).len(),
		expected,
		"selector {selector}"
	);
}

// ============================================================================
// Tiers and ordering
// ============================================================================

#[rstest]
fn test_priority_tiers_and_eager_flags() {
	// Arrange & Act
	let registry = SelectorRegistry::new()
		.component("consent", "#consent", inert().critical().eager(true))
		.component("gallery", ".gallery", inert().depends_on("lightbox"))
		.component("lightbox", "[data-lightbox]", inert().priority(Priority::Normal))
		.build()
		.unwrap();

	// Assert
	let critical: Vec<_> = registry
		.by_priority(Priority::Critical)
		.map(ComponentConfig::name)
		.collect();
	assert_eq!(critical, vec!["consent"]);
	assert!(registry.get("consent").unwrap().is_eager());
	let order: Vec<_> = registry
		.dependency_order()
		.into_iter()
		.map(ComponentConfig::name)
		.collect();
	assert_eq!(order, vec!["consent", "lightbox", "gallery"]);
}

#[rstest]
fn test_constructor_loader_is_ready() {
	// Arrange
	let registry = SelectorRegistry::new()
		.component("menu", ".menu", inert())
		.build()
		.unwrap();
	let config = registry.get("menu").unwrap();

	// Act
	let load = config.load();

	// Assert
	assert!(!load.is_pending());
	match load {
		Load::Ready(Ok(module)) => assert!(module.resolve("menu").is_ok()),
		other => panic!("unexpected load outcome: {other:?}"),
	}
}

#[rstest]
fn test_errors_surface_before_any_component_is_used() {
	// Act
	let result = SelectorRegistry::new()
		.component("a", ".a", inert().depends_on("b"))
		.component("b", ".b", inert().depends_on("a"))
		.build();

	// Assert
	assert!(matches!(
		result,
		Err(RegistryError::CircularDependency { path }) if path == "a -> b -> a"
	));
}
