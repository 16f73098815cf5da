//! Arena-backed document tree with child-list mutation reporting.

use crate::error::{DomError, DomResult};
use crate::mutation::MutationRecord;
use crate::node::{ElementData, Node, NodeData, NodeId};
use crate::selector::Selector;
use tokio::sync::mpsc;

/// Viewport scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollPosition {
	/// Horizontal offset.
	pub x: f64,
	/// Vertical offset.
	pub y: f64,
}

impl ScrollPosition {
	/// The top-left corner.
	pub const TOP: Self = Self { x: 0.0, y: 0.0 };

	/// Creates a scroll position.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// A document tree.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. Detached nodes
/// stay in the arena, so ids never dangle. The node at [`Document::root`]
/// is the document node itself.
///
/// Structural changes to connected nodes are reported to the receiver
/// returned by [`Document::observe`].
#[derive(Debug)]
pub struct Document {
	nodes: Vec<Node>,
	scroll: ScrollPosition,
	scroll_target: Option<NodeId>,
	observer: Option<mpsc::UnboundedSender<MutationRecord>>,
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl Document {
	/// Creates a document containing only the document node.
	pub fn new() -> Self {
		Self {
			nodes: vec![Node::new(NodeData::Document)],
			scroll: ScrollPosition::TOP,
			scroll_target: None,
			observer: None,
		}
	}

	/// The document node.
	pub const fn root(&self) -> NodeId {
		NodeId::from_index(0)
	}

	/// Number of nodes in the arena, detached ones included.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.get(id.index())
	}

	pub(crate) fn push(&mut self, data: NodeData) -> NodeId {
		let id = NodeId::from_index(self.nodes.len());
		self.nodes.push(Node::new(data));
		id
	}

	// ------------------------------------------------------------------
	// Construction
	// ------------------------------------------------------------------

	/// Creates a detached element.
	pub fn create_element(&mut self, name: &str) -> NodeId {
		self.push(NodeData::Element(ElementData::new(name)))
	}

	/// Creates a detached text node.
	pub fn create_text(&mut self, text: &str) -> NodeId {
		self.push(NodeData::Text(text.to_string()))
	}

	/// Creates a detached comment node.
	pub fn create_comment(&mut self, text: &str) -> NodeId {
		self.push(NodeData::Comment(text.to_string()))
	}

	/// Deep-copies `node` (and its subtree) from `source` into this document.
	///
	/// The copy is detached. Returns `None` when `node` is unknown to
	/// `source` or is a document node.
	pub fn import_subtree(&mut self, source: &Document, node: NodeId) -> Option<NodeId> {
		let data = source.data(node)?;
		if matches!(data, NodeData::Document) {
			return None;
		}
		let copy = self.push(data.clone());
		let mut stack = vec![(node, copy)];
		while let Some((from, to)) = stack.pop() {
			for &child in source.children(from) {
				let Some(child_data) = source.data(child) else {
					continue;
				};
				let imported = self.push(child_data.clone());
				self.nodes[imported.index()].parent = Some(to);
				self.nodes[to.index()].children.push(imported);
				stack.push((child, imported));
			}
		}
		Some(copy)
	}

	// Attach without validation or mutation records; used while building
	// freshly parsed trees.
	pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
		self.nodes[child.index()].parent = Some(parent);
		self.nodes[parent.index()].children.push(child);
	}

	// ------------------------------------------------------------------
	// Structure
	// ------------------------------------------------------------------

	fn check_insertion(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
		let parent_node = self.node(parent).ok_or(DomError::UnknownNode(parent))?;
		if !matches!(parent_node.data, NodeData::Document | NodeData::Element(_)) {
			return Err(DomError::HierarchyRequest {
				parent,
				child,
				reason: "parent cannot have children",
			});
		}
		let child_node = self.node(child).ok_or(DomError::UnknownNode(child))?;
		if matches!(child_node.data, NodeData::Document) {
			return Err(DomError::HierarchyRequest {
				parent,
				child,
				reason: "a document node cannot be inserted",
			});
		}
		if self.contains(child, parent) {
			return Err(DomError::HierarchyRequest {
				parent,
				child,
				reason: "child is an ancestor of parent",
			});
		}
		Ok(())
	}

	/// Appends `child` as the last child of `parent`, moving it if attached.
	pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
		self.insert_before(parent, child, None)
	}

	/// Inserts `child` under `parent` before `reference` (or last when `None`).
	pub fn insert_before(
		&mut self,
		parent: NodeId,
		child: NodeId,
		reference: Option<NodeId>,
	) -> DomResult<()> {
		self.check_insertion(parent, child)?;
		if let Some(reference) = reference
			&& reference != child
			&& self.parent(reference) != Some(parent)
		{
			return Err(DomError::HierarchyRequest {
				parent,
				child,
				reason: "reference is not a child of parent",
			});
		}
		self.detach(child);
		let siblings = &mut self.nodes[parent.index()].children;
		let index = reference
			.and_then(|reference| siblings.iter().position(|&id| id == reference))
			.unwrap_or(siblings.len());
		siblings.insert(index, child);
		self.nodes[child.index()].parent = Some(parent);
		self.record(parent, vec![child], Vec::new());
		Ok(())
	}

	/// Detaches `node` from its parent. Detaching a detached node is a no-op.
	pub fn remove(&mut self, node: NodeId) -> DomResult<()> {
		self.node(node).ok_or(DomError::UnknownNode(node))?;
		self.detach(node);
		Ok(())
	}

	fn detach(&mut self, node: NodeId) {
		let Some(parent) = self.nodes[node.index()].parent.take() else {
			return;
		};
		self.nodes[parent.index()].children.retain(|&id| id != node);
		self.record(parent, Vec::new(), vec![node]);
	}

	/// Replaces every child of `parent` with `children`, reported as a
	/// single mutation record.
	pub fn replace_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> DomResult<()> {
		for &child in &children {
			self.check_insertion(parent, child)?;
		}
		let removed = std::mem::take(&mut self.nodes[parent.index()].children);
		for &old in &removed {
			self.nodes[old.index()].parent = None;
		}
		let mut added = Vec::with_capacity(children.len());
		for child in children {
			if self.nodes[child.index()].parent == Some(parent) {
				continue;
			}
			self.detach(child);
			self.attach(parent, child);
			added.push(child);
		}
		self.record(parent, added, removed);
		Ok(())
	}

	/// Removes every child of `parent`.
	pub fn clear_children(&mut self, parent: NodeId) -> DomResult<()> {
		self.replace_children(parent, Vec::new())
	}

	// ------------------------------------------------------------------
	// Navigation
	// ------------------------------------------------------------------

	/// Node payload.
	pub fn data(&self, id: NodeId) -> Option<&NodeData> {
		self.node(id).map(|node| &node.data)
	}

	/// Element payload, when `id` is an element.
	pub fn element(&self, id: NodeId) -> Option<&ElementData> {
		self.data(id).and_then(NodeData::as_element)
	}

	/// Parent of `id`.
	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.node(id).and_then(|node| node.parent)
	}

	/// Children of `id`; empty for unknown ids.
	pub fn children(&self, id: NodeId) -> &[NodeId] {
		match self.node(id) {
			Some(node) => &node.children,
			None => &[],
		}
	}

	/// Ancestors of `id`, nearest first.
	pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		std::iter::successors(self.parent(id), move |&node| self.parent(node))
	}

	/// Descendants of `id` in document order, excluding `id`.
	pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
		while let Some(node) = stack.pop() {
			out.push(node);
			stack.extend(self.children(node).iter().rev().copied());
		}
		out
	}

	/// Whether `node` is `ancestor` or lies inside it.
	pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
		node == ancestor || self.ancestors(node).any(|id| id == ancestor)
	}

	/// Whether `node` is reachable from the document node.
	pub fn is_connected(&self, node: NodeId) -> bool {
		self.node(node).is_some() && self.contains(self.root(), node)
	}

	/// The root element (usually `<html>`).
	pub fn document_element(&self) -> Option<NodeId> {
		self.children(self.root())
			.iter()
			.copied()
			.find(|&id| self.element(id).is_some())
	}

	fn root_child(&self, name: &str) -> Option<NodeId> {
		let html = self.document_element()?;
		self.children(html)
			.iter()
			.copied()
			.find(|&id| self.tag_name(id) == Some(name))
	}

	/// The `<head>` element.
	pub fn head(&self) -> Option<NodeId> {
		self.root_child("head")
	}

	/// The `<body>` element.
	pub fn body(&self) -> Option<NodeId> {
		self.root_child("body")
	}

	/// Lowercased tag name of an element.
	pub fn tag_name(&self, id: NodeId) -> Option<&str> {
		self.element(id).map(ElementData::name)
	}

	// ------------------------------------------------------------------
	// Attributes
	// ------------------------------------------------------------------

	/// Attribute value of an element.
	pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
		self.element(id).and_then(|element| element.attribute(name))
	}

	/// Whether an element carries `name`.
	pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
		self.attribute(id, name).is_some()
	}

	/// Sets an attribute; returns whether the value changed.
	pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<bool> {
		let node = self
			.nodes
			.get_mut(id.index())
			.ok_or(DomError::UnknownNode(id))?;
		let element = node
			.data
			.as_element_mut()
			.ok_or(DomError::NotAnElement(id))?;
		Ok(element.set_attribute(name, value))
	}

	/// Removes an attribute and returns its previous value.
	pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
		self.nodes
			.get_mut(id.index())?
			.data
			.as_element_mut()?
			.remove_attribute(name)
	}

	/// Class tokens of an element.
	pub fn classes(&self, id: NodeId) -> Vec<&str> {
		self.element(id)
			.map(|element| element.classes().collect())
			.unwrap_or_default()
	}

	/// First connected element whose `id` attribute equals `value`.
	pub fn find_by_id(&self, value: &str) -> Option<NodeId> {
		self.descendants(self.root())
			.into_iter()
			.find(|&node| self.element(node).and_then(ElementData::id) == Some(value))
	}

	/// Concatenated text of `id` and its descendants.
	pub fn text_content(&self, id: NodeId) -> String {
		if let Some(NodeData::Text(text)) = self.data(id) {
			return text.clone();
		}
		self.descendants(id)
			.into_iter()
			.filter_map(|node| match self.data(node) {
				Some(NodeData::Text(text)) => Some(text.as_str()),
				_ => None,
			})
			.collect()
	}

	// ------------------------------------------------------------------
	// Title
	// ------------------------------------------------------------------

	fn title_element(&self) -> Option<NodeId> {
		let html = self.document_element()?;
		self.descendants(html)
			.into_iter()
			.find(|&node| self.tag_name(node) == Some("title"))
	}

	/// Document title with whitespace collapsed; `None` without a `<title>`.
	pub fn title(&self) -> Option<String> {
		let title = self.title_element()?;
		Some(
			self.text_content(title)
				.split_whitespace()
				.collect::<Vec<_>>()
				.join(" "),
		)
	}

	/// Sets the document title, creating `<title>` in `<head>` if needed.
	pub fn set_title(&mut self, title: &str) -> DomResult<()> {
		let element = match self.title_element() {
			Some(element) => element,
			None => {
				let head = match self.head() {
					Some(head) => head,
					None => {
						let html = self
							.document_element()
							.ok_or(DomError::NotAnElement(self.root()))?;
						let head = self.create_element("head");
						let first = self.children(html).first().copied();
						self.insert_before(html, head, first)?;
						head
					}
				};
				let element = self.create_element("title");
				self.append_child(head, element)?;
				element
			}
		};
		let text = self.create_text(title);
		self.replace_children(element, vec![text])
	}

	// ------------------------------------------------------------------
	// Selectors
	// ------------------------------------------------------------------

	/// Whether `id` matches `selector`.
	pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
		selector.matches(self, id)
	}

	/// Descendants of `scope` matching `selector`, in document order.
	pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
		self.descendants(scope)
			.into_iter()
			.filter(|&node| selector.matches(self, node))
			.collect()
	}

	/// First descendant of `scope` matching `selector`.
	pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
		self.descendants(scope)
			.into_iter()
			.find(|&node| selector.matches(self, node))
	}

	// ------------------------------------------------------------------
	// Scroll
	// ------------------------------------------------------------------

	/// Current scroll offset.
	pub fn scroll_position(&self) -> ScrollPosition {
		self.scroll
	}

	/// Element most recently scrolled into view, if no scroll happened since.
	pub fn scroll_target(&self) -> Option<NodeId> {
		self.scroll_target
	}

	/// Scrolls to an absolute offset.
	pub fn scroll_to(&mut self, position: ScrollPosition) {
		self.scroll = position;
		self.scroll_target = None;
	}

	/// Scrolls `node` into view. Returns `false` for disconnected nodes.
	pub fn scroll_into_view(&mut self, node: NodeId) -> bool {
		if !self.is_connected(node) || self.element(node).is_none() {
			return false;
		}
		self.scroll_target = Some(node);
		true
	}

	// ------------------------------------------------------------------
	// Observation
	// ------------------------------------------------------------------

	/// Starts reporting child-list mutations; replaces any earlier observer.
	pub fn observe(&mut self) -> mpsc::UnboundedReceiver<MutationRecord> {
		let (sender, receiver) = mpsc::unbounded_channel();
		self.observer = Some(sender);
		receiver
	}

	/// Stops reporting mutations.
	pub fn disconnect(&mut self) {
		self.observer = None;
	}

	/// Whether an observer is attached.
	pub fn is_observed(&self) -> bool {
		self.observer.is_some()
	}

	/// Runs `edit` with mutation reporting paused.
	///
	/// Changes made inside `edit` are never delivered to the current
	/// observer, which keeps receiving records afterwards. An observer
	/// attached by `edit` itself replaces the paused one.
	pub fn unobserved<R>(&mut self, edit: impl FnOnce(&mut Self) -> R) -> R {
		let paused = self.observer.take();
		let result = edit(self);
		if self.observer.is_none() {
			self.observer = paused;
		}
		result
	}

	fn record(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
		if self.observer.is_none() || !self.is_connected(target) {
			return;
		}
		let record = MutationRecord::child_list(target, added, removed);
		if record.is_empty() {
			return;
		}
		let delivered = self
			.observer
			.as_ref()
			.is_some_and(|observer| observer.send(record).is_ok());
		if !delivered {
			tracing::debug!("mutation observer dropped, disconnecting");
			self.observer = None;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn page() -> Document {
		Document::parse(
			"<html><head><title> Home  page </title></head>\
			 <body><main id=\"main\"><p id=\"a\">one</p><p id=\"b\">two</p></main></body></html>",
		)
		.unwrap()
	}

	#[rstest]
	fn test_append_child_moves_node() {
		// Arrange
		let mut doc = page();
		let a = doc.find_by_id("a").unwrap();
		let body = doc.body().unwrap();

		// Act
		doc.append_child(body, a).unwrap();

		// Assert
		assert_eq!(doc.parent(a), Some(body));
		let main = doc.find_by_id("main").unwrap();
		assert_eq!(doc.children(main).len(), 1);
	}

	#[rstest]
	fn test_append_child_rejects_cycles() {
		// Arrange
		let mut doc = page();
		let main = doc.find_by_id("main").unwrap();
		let a = doc.find_by_id("a").unwrap();

		// Act
		let result = doc.append_child(a, main);

		// Assert
		assert!(matches!(result, Err(DomError::HierarchyRequest { .. })));
		assert!(doc.is_connected(main));
	}

	#[rstest]
	fn test_insert_before_reference() {
		// Arrange
		let mut doc = page();
		let main = doc.find_by_id("main").unwrap();
		let b = doc.find_by_id("b").unwrap();
		let node = doc.create_element("hr");

		// Act
		doc.insert_before(main, node, Some(b)).unwrap();

		// Assert
		let tags: Vec<_> = doc
			.children(main)
			.iter()
			.map(|&id| doc.tag_name(id).unwrap())
			.collect();
		assert_eq!(tags, vec!["p", "hr", "p"]);
	}

	#[rstest]
	fn test_remove_disconnects_subtree() {
		// Arrange
		let mut doc = page();
		let main = doc.find_by_id("main").unwrap();
		let a = doc.find_by_id("a").unwrap();

		// Act
		doc.remove(main).unwrap();

		// Assert
		assert!(!doc.is_connected(main));
		assert!(!doc.is_connected(a));
		assert!(doc.contains(main, a));
		assert_eq!(doc.find_by_id("a"), None);
	}

	#[rstest]
	fn test_title_collapses_whitespace() {
		// Arrange
		let doc = page();

		// Act & Assert
		assert_eq!(doc.title().as_deref(), Some("Home page"));
	}

	#[rstest]
	fn test_set_title_creates_element() {
		// Arrange
		let mut doc = Document::parse("<p>body only</p>").unwrap();
		assert_eq!(doc.title(), None);

		// Act
		doc.set_title("Created").unwrap();

		// Assert
		assert_eq!(doc.title().as_deref(), Some("Created"));
	}

	#[rstest]
	fn test_import_subtree_is_deep_and_detached() {
		// Arrange
		let source = page();
		let main = source.find_by_id("main").unwrap();
		let mut target = Document::parse("<div></div>").unwrap();

		// Act
		let copy = target.import_subtree(&source, main).unwrap();

		// Assert
		assert!(!target.is_connected(copy));
		assert_eq!(target.text_content(copy), "onetwo");
		assert_eq!(target.import_subtree(&source, source.root()), None);
	}

	#[rstest]
	fn test_scroll_into_view_requires_connection() {
		// Arrange
		let mut doc = page();
		let orphan = doc.create_element("div");
		let b = doc.find_by_id("b").unwrap();

		// Act
		let detached = doc.scroll_into_view(orphan);
		let connected = doc.scroll_into_view(b);

		// Assert
		assert!(!detached);
		assert!(connected);
		assert_eq!(doc.scroll_target(), Some(b));
		doc.scroll_to(ScrollPosition::new(0.0, 120.0));
		assert_eq!(doc.scroll_target(), None);
	}

	#[rstest]
	fn test_replace_children_emits_single_record() {
		// Arrange
		let mut doc = page();
		let mut receiver = doc.observe();
		let main = doc.find_by_id("main").unwrap();
		let first = doc.create_element("section");
		let second = doc.create_element("aside");

		// Act
		doc.replace_children(main, vec![first, second]).unwrap();

		// Assert
		let record = receiver.try_recv().unwrap();
		assert_eq!(record.target, main);
		assert_eq!(record.added, vec![first, second]);
		assert_eq!(record.removed.len(), 2);
		assert!(receiver.try_recv().is_err());
	}

	#[rstest]
	fn test_detached_changes_are_not_recorded() {
		// Arrange
		let mut doc = page();
		let mut receiver = doc.observe();
		let wrapper = doc.create_element("div");
		let child = doc.create_element("span");

		// Act
		doc.append_child(wrapper, child).unwrap();

		// Assert
		assert!(receiver.try_recv().is_err());
	}

	#[rstest]
	fn test_disconnect_stops_records() {
		// Arrange
		let mut doc = page();
		let mut receiver = doc.observe();
		let body = doc.body().unwrap();
		let node = doc.create_element("div");

		// Act
		doc.disconnect();
		doc.append_child(body, node).unwrap();

		// Assert
		assert!(!doc.is_observed());
		assert!(receiver.try_recv().is_err());
	}
}
