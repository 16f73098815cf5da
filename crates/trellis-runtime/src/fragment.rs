//! Locating and swapping labeled fragments.
//!
//! A fragment target is looked up with a fallback chain. The first hit
//! wins:
//!
//! 1. an element whose [`VIEW_ATTR`] equals the label
//! 2. an element whose `id` equals the label
//! 3. a landmark element or role conventionally named by the label
//!    (`main`, `nav`, `header`, `footer`, `aside`, `search`, `body`)
//! 4. an element carrying the label as a class
//!
//! Strict lookup uses step 1 only.

use crate::markers::{self, VIEW_ATTR};
use crate::settings::LifecycleSettings;
use trellis_dom::{Document, DomResult, NodeId};

/// Which rule located a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
	/// Exact [`VIEW_ATTR`] label.
	Label,
	/// `id` attribute.
	Id,
	/// Landmark element or ARIA role.
	Landmark,
	/// Class token.
	Class,
}

/// A located fragment root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentMatch {
	/// The fragment root.
	pub node: NodeId,
	/// Rule that found it.
	pub strategy: LocateStrategy,
}

/// Landmark tag and role for a label.
fn landmark(label: &str) -> Option<(&'static str, Option<&'static str>)> {
	Some(match label {
		"main" => ("main", Some("main")),
		"nav" | "navigation" => ("nav", Some("navigation")),
		"header" | "banner" => ("header", Some("banner")),
		"footer" | "contentinfo" => ("footer", Some("contentinfo")),
		"aside" | "complementary" => ("aside", Some("complementary")),
		"search" => ("search", Some("search")),
		"body" => ("body", None),
		_ => return None,
	})
}

/// Finds the fragment labeled `label`.
pub fn locate(document: &Document, label: &str, strict: bool) -> Option<FragmentMatch> {
	let elements: Vec<NodeId> = document
		.descendants(document.root())
		.into_iter()
		.filter(|&node| document.element(node).is_some())
		.collect();
	let found = |node: Option<NodeId>, strategy| node.map(|node| FragmentMatch { node, strategy });

	let by_label = elements
		.iter()
		.copied()
		.find(|&node| document.attribute(node, VIEW_ATTR) == Some(label));
	if by_label.is_some() || strict {
		return found(by_label, LocateStrategy::Label);
	}

	if let Some(match_) = found(document.find_by_id(label), LocateStrategy::Id) {
		return Some(match_);
	}

	if let Some((tag, role)) = landmark(label) {
		let by_landmark = elements.iter().copied().find(|&node| {
			document.tag_name(node) == Some(tag)
				|| role.is_some_and(|role| document.attribute(node, "role") == Some(role))
		});
		if let Some(match_) = found(by_landmark, LocateStrategy::Landmark) {
			return Some(match_);
		}
	}

	let by_class = elements.into_iter().find(|&node| {
		document
			.element(node)
			.is_some_and(|element| element.has_class(label))
	});
	found(by_class, LocateStrategy::Class)
}

/// Whether the fragment at `node`, labeled `label`, is the primary region.
pub fn is_primary(
	document: &Document,
	node: NodeId,
	label: &str,
	settings: &LifecycleSettings,
) -> bool {
	settings.is_primary_target(label)
		|| matches!(document.tag_name(node), Some("body" | "html"))
}

/// Replaces the content of `target` with the content of `source`.
///
/// Manager markers carried by the incoming markup are dropped. The
/// allow-listed state attributes are copied from `source` (or removed when
/// absent there). Class tokens come from `source`, except live tokens that
/// start with the preserved prefix.
pub fn swap_content(
	live: &mut Document,
	target: NodeId,
	parsed: &Document,
	source: NodeId,
	settings: &LifecycleSettings,
) -> DomResult<()> {
	let imported: Vec<NodeId> = parsed
		.children(source)
		.iter()
		.filter_map(|&child| live.import_subtree(parsed, child))
		.collect();
	for &node in &imported {
		markers::strip(live, node);
	}
	live.replace_children(target, imported)?;

	for attribute in &settings.state_attributes {
		match parsed.attribute(source, attribute) {
			Some(value) => {
				live.set_attribute(target, attribute, value)?;
			}
			None => {
				live.remove_attribute(target, attribute);
			}
		}
	}

	let mut classes: Vec<String> = parsed.classes(source).into_iter().map(String::from).collect();
	let prefix = settings.preserved_class_prefix.as_str();
	if !prefix.is_empty() {
		for class in live.classes(target) {
			if class.starts_with(prefix) && !classes.iter().any(|c| c == class) {
				classes.push(class.to_string());
			}
		}
	}
	if classes.is_empty() {
		live.remove_attribute(target, "class");
	} else {
		live.set_attribute(target, "class", &classes.join(" "))?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	const PAGE: &str = r#"<html><body>
		<header class="main">banner</header>
		<div role="main" id="shell">
			<section data-tr-view="main" id="labelled">content</section>
		</div>
		<nav id="sidebar" class="menu"></nav>
		<aside class="related"></aside>
	</body></html>"#;

	#[rstest]
	#[case("main", "labelled", LocateStrategy::Label)]
	#[case("shell", "shell", LocateStrategy::Id)]
	#[case("navigation", "sidebar", LocateStrategy::Landmark)]
	#[case("menu", "sidebar", LocateStrategy::Class)]
	fn test_locate_precedence(
		#[case] label: &str,
		#[case] expected_id: &str,
		#[case] strategy: LocateStrategy,
	) {
		// Arrange
		let doc = Document::parse(PAGE).unwrap();

		// Act
		let found = locate(&doc, label, false).unwrap();

		// Assert
		assert_eq!(doc.attribute(found.node, "id"), Some(expected_id));
		assert_eq!(found.strategy, strategy);
	}

	#[rstest]
	fn test_landmark_before_class() {
		// Arrange
		let doc = Document::parse(
			"<body><div class=\"main\" id=\"by-class\"></div><main id=\"by-tag\"></main></body>",
		)
		.unwrap();

		// Act
		let found = locate(&doc, "main", false).unwrap();

		// Assert
		assert_eq!(doc.attribute(found.node, "id"), Some("by-tag"));
	}

	#[rstest]
	fn test_strict_lookup_uses_label_only() {
		// Arrange
		let doc = Document::parse(PAGE).unwrap();

		// Act
		let labelled = locate(&doc, "main", true);
		let by_id = locate(&doc, "shell", true);

		// Assert
		assert_eq!(labelled.map(|m| m.strategy), Some(LocateStrategy::Label));
		assert_eq!(by_id, None);
	}

	#[rstest]
	fn test_missing_label() {
		// Arrange
		let doc = Document::parse(PAGE).unwrap();

		// Act & Assert
		assert_eq!(locate(&doc, "checkout", false), None);
	}

	#[rstest]
	fn test_swap_content_syncs_attributes_and_classes() {
		// Arrange
		let mut live = Document::parse(
			r#"<main id="m" class="old tr-busy" aria-busy="true" data-version="1"><p data-tr-mounted="x">old</p></main>"#,
		)
		.unwrap();
		let parsed = Document::parse(
			r#"<main id="m" class="fresh" data-version="2"><p data-tr-mounted="stale" data-tr-owner="main">new</p></main>"#,
		)
		.unwrap();
		let target = live.find_by_id("m").unwrap();
		let source = parsed.find_by_id("m").unwrap();

		// Act
		swap_content(&mut live, target, &parsed, source, &LifecycleSettings::default()).unwrap();

		// Assert
		assert_eq!(live.inner_html(target), "<p>new</p>");
		assert_eq!(live.attribute(target, "data-version"), Some("2"));
		assert_eq!(live.attribute(target, "aria-busy"), None);
		assert_eq!(live.attribute(target, "class"), Some("fresh tr-busy"));
	}
}
