//! Markup parsing through `scraper` (html5ever).

use crate::document::Document;
use crate::error::{DomError, DomResult};
use crate::node::{ElementData, NodeData};
use scraper::{Html, Node as HtmlNode};

impl Document {
	/// Parses a full HTML document.
	///
	/// Fragments are accepted too; the parser wraps them in the implied
	/// `<html>`, `<head>` and `<body>` elements. Doctypes and processing
	/// instructions are dropped.
	///
	/// # Errors
	///
	/// Returns [`DomError::EmptyMarkup`] when `markup` is blank.
	///
	/// # Examples
	///
	/// ```
	/// use trellis_dom::Document;
	///
	/// let doc = Document::parse("<title>Inbox</title><main id=\"app\"></main>").unwrap();
	/// assert_eq!(doc.title().as_deref(), Some("Inbox"));
	/// assert!(doc.find_by_id("app").is_some());
	/// ```
	pub fn parse(markup: &str) -> DomResult<Self> {
		if markup.trim().is_empty() {
			return Err(DomError::EmptyMarkup);
		}
		let html = Html::parse_document(markup);
		let mut document = Document::new();
		let root = document.root();
		let mut stack = vec![(html.tree.root(), root)];
		while let Some((source, parent)) = stack.pop() {
			for child in source.children() {
				let data = match child.value() {
					HtmlNode::Element(element) => {
						let mut data = ElementData::new(element.name());
						for (name, value) in element.attrs() {
							data.set_attribute(name, value);
						}
						NodeData::Element(data)
					}
					HtmlNode::Text(text) => NodeData::Text(String::from(&**text)),
					HtmlNode::Comment(comment) => NodeData::Comment(String::from(&**comment)),
					_ => continue,
				};
				let id = document.push(data);
				document.attach(parent, id);
				stack.push((child, id));
			}
		}
		tracing::trace!(nodes = document.node_count(), "parsed markup");
		Ok(document)
	}
}
