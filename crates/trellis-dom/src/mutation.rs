//! Child-list mutation records delivered to observers.

use crate::node::NodeId;

/// One child-list change on a connected node.
///
/// Only changes to nodes connected to the document are recorded, matching
/// a subtree observer attached at the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
	/// Parent whose child list changed.
	pub target: NodeId,
	/// Nodes inserted under `target`.
	pub added: Vec<NodeId>,
	/// Nodes removed from `target`.
	pub removed: Vec<NodeId>,
}

impl MutationRecord {
	/// Record of a child-list change.
	pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
		Self {
			target,
			added,
			removed,
		}
	}

	/// Whether the record carries no changes.
	pub fn is_empty(&self) -> bool {
		self.added.is_empty() && self.removed.is_empty()
	}
}
