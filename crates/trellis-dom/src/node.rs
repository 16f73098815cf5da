//! Node identifiers and node payloads.

use std::fmt;

/// Index of a node inside a [`Document`](crate::Document) arena.
///
/// Ids are never reused, so an id held after its node was detached still
/// refers to that (now disconnected) node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
	/// Builds an id from a raw arena index.
	pub const fn from_index(index: usize) -> Self {
		Self(index)
	}

	/// Raw arena index.
	pub const fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Tag name and attributes of an element.
///
/// Names are stored lowercased. Attribute order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
	name: String,
	attributes: Vec<(String, String)>,
}

impl ElementData {
	/// Creates an element with no attributes.
	pub fn new(name: impl AsRef<str>) -> Self {
		Self {
			name: name.as_ref().to_ascii_lowercase(),
			attributes: Vec::new(),
		}
	}

	/// Lowercased tag name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Value of an attribute, if present.
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Iterates over `(name, value)` pairs.
	pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
		self.attributes
			.iter()
			.map(|(key, value)| (key.as_str(), value.as_str()))
	}

	/// Sets an attribute, returning `true` when the stored value changed.
	pub fn set_attribute(&mut self, name: &str, value: &str) -> bool {
		let name = name.to_ascii_lowercase();
		match self.attributes.iter_mut().find(|(key, _)| *key == name) {
			Some((_, existing)) if existing == value => false,
			Some((_, existing)) => {
				*existing = value.to_string();
				true
			}
			None => {
				self.attributes.push((name, value.to_string()));
				true
			}
		}
	}

	/// Removes an attribute and returns its previous value.
	pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
		let index = self
			.attributes
			.iter()
			.position(|(key, _)| key.eq_ignore_ascii_case(name))?;
		Some(self.attributes.remove(index).1)
	}

	/// The `id` attribute.
	pub fn id(&self) -> Option<&str> {
		self.attribute("id")
	}

	/// Whitespace-separated tokens of the `class` attribute.
	pub fn classes(&self) -> impl Iterator<Item = &str> {
		self.attribute("class")
			.unwrap_or_default()
			.split_ascii_whitespace()
	}

	/// Whether the `class` attribute contains `class`.
	pub fn has_class(&self, class: &str) -> bool {
		self.classes().any(|token| token == class)
	}
}

/// Payload of a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
	/// The document root.
	Document,
	/// An element.
	Element(ElementData),
	/// A text run.
	Text(String),
	/// A comment.
	Comment(String),
}

impl NodeData {
	/// Element payload, if this is an element.
	pub fn as_element(&self) -> Option<&ElementData> {
		match self {
			Self::Element(element) => Some(element),
			_ => None,
		}
	}

	pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
		match self {
			Self::Element(element) => Some(element),
			_ => None,
		}
	}
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
	pub(crate) data: NodeData,
	pub(crate) parent: Option<NodeId>,
	pub(crate) children: Vec<NodeId>,
}

impl Node {
	pub(crate) fn new(data: NodeData) -> Self {
		Self {
			data,
			parent: None,
			children: Vec::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_element_name_is_lowercased() {
		// Arrange & Act
		let element = ElementData::new("MAIN");

		// Assert
		assert_eq!(element.name(), "main");
	}

	#[rstest]
	fn test_set_attribute_reports_changes() {
		// Arrange
		let mut element = ElementData::new("div");

		// Act
		let first = element.set_attribute("Data-State", "open");
		let repeated = element.set_attribute("data-state", "open");
		let changed = element.set_attribute("data-state", "closed");

		// Assert
		assert!(first);
		assert!(!repeated);
		assert!(changed);
		assert_eq!(element.attribute("DATA-STATE"), Some("closed"));
		assert_eq!(element.attributes().count(), 1);
	}

	#[rstest]
	#[case("card", true)]
	#[case("card--wide", true)]
	#[case("car", false)]
	fn test_has_class(#[case] class: &str, #[case] expected: bool) {
		// Arrange
		let mut element = ElementData::new("section");
		element.set_attribute("class", "  card card--wide\tshadow ");

		// Act & Assert
		assert_eq!(element.has_class(class), expected);
	}

	#[rstest]
	fn test_remove_attribute_returns_previous_value() {
		// Arrange
		let mut element = ElementData::new("a");
		element.set_attribute("href", "/docs");

		// Act
		let removed = element.remove_attribute("href");

		// Assert
		assert_eq!(removed.as_deref(), Some("/docs"));
		assert_eq!(element.attribute("href"), None);
	}
}
