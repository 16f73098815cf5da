//! Error types for document operations.

use crate::node::NodeId;
use thiserror::Error;

/// Errors raised by [`Document`](crate::Document) and [`Selector`](crate::Selector).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DomError {
	/// Markup was empty or whitespace only.
	#[error("Markup is empty")]
	EmptyMarkup,

	/// A selector string could not be parsed.
	#[error("Invalid selector '{selector}': {reason}")]
	InvalidSelector {
		/// The offending selector source.
		selector: String,
		/// What the parser rejected.
		reason: String,
	},

	/// The node id does not belong to this document.
	#[error("Node {0} does not exist")]
	UnknownNode(NodeId),

	/// The node cannot carry attributes or children.
	#[error("Node {0} is not an element")]
	NotAnElement(NodeId),

	/// An insertion would break the tree shape.
	#[error("Cannot insert {child} into {parent}: {reason}")]
	HierarchyRequest {
		/// The would-be parent.
		parent: NodeId,
		/// The node being inserted.
		child: NodeId,
		/// Why the insertion was refused.
		reason: &'static str,
	},
}

/// Result alias for document operations.
pub type DomResult<T> = Result<T, DomError>;
