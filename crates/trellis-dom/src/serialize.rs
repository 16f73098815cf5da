//! HTML serialization through html5ever's serializer.

use crate::document::Document;
use crate::node::{NodeData, NodeId};
use html5ever::serialize::{self, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::{LocalName, Namespace, QualName};
use std::io;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

impl Document {
	/// Serialized children of `id`.
	pub fn inner_html(&self, id: NodeId) -> String {
		self.serialize(id, TraversalScope::ChildrenOnly(None))
	}

	/// Serialized `id` including itself.
	pub fn outer_html(&self, id: NodeId) -> String {
		self.serialize(id, TraversalScope::IncludeNode)
	}

	fn serialize(&self, node: NodeId, traversal_scope: TraversalScope) -> String {
		let mut out = Vec::new();
		let opts = SerializeOpts {
			traversal_scope,
			..SerializeOpts::default()
		};
		if let Err(error) = serialize::serialize(&mut out, &Subtree { document: self, node }, opts) {
			tracing::warn!(%node, %error, "HTML serialization stopped early");
		}
		String::from_utf8_lossy(&out).into_owned()
	}
}

struct Subtree<'a> {
	document: &'a Document,
	node: NodeId,
}

impl Serialize for Subtree<'_> {
	fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
	where
		S: Serializer,
	{
		match traversal_scope {
			TraversalScope::IncludeNode => write_node(self.document, self.node, serializer),
			TraversalScope::ChildrenOnly(_) => write_children(self.document, self.node, serializer),
		}
	}
}

fn write_children<S: Serializer>(
	document: &Document,
	parent: NodeId,
	serializer: &mut S,
) -> io::Result<()> {
	document
		.children(parent)
		.iter()
		.try_for_each(|&child| write_node(document, child, serializer))
}

fn write_node<S: Serializer>(document: &Document, id: NodeId, serializer: &mut S) -> io::Result<()> {
	match document.data(id) {
		Some(NodeData::Document) => write_children(document, id, serializer),
		Some(NodeData::Element(element)) => {
			let name = element_name(element.name());
			let attributes: Vec<(QualName, &str)> = element
				.attributes()
				.map(|(key, value)| (attribute_name(key), value))
				.collect();
			serializer.start_elem(
				name.clone(),
				attributes.iter().map(|(key, value)| (key, *value)),
			)?;
			write_children(document, id, serializer)?;
			serializer.end_elem(name)
		}
		Some(NodeData::Text(text)) => serializer.write_text(text),
		Some(NodeData::Comment(text)) => serializer.write_comment(text),
		None => Ok(()),
	}
}

fn element_name(name: &str) -> QualName {
	QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(name))
}

fn attribute_name(name: &str) -> QualName {
	QualName::new(None, Namespace::from(""), LocalName::from(name))
}
