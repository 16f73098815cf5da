//! Element markers written by the lifecycle manager.
//!
//! Markers are space-separated token lists in data attributes, so several
//! components can mount on the same element.

use trellis_dom::{Document, NodeId};

/// Components mounted on the element.
pub const MOUNTED_ATTR: &str = "data-tr-mounted";

/// Fragment that owns the element's mounts.
pub const OWNER_ATTR: &str = "data-tr-owner";

/// Components whose mount is queued behind a pending load.
pub const LOADING_ATTR: &str = "data-tr-loading";

/// Components whose load or mount failed on the element.
pub const ERROR_ATTR: &str = "data-tr-error";

/// Label naming a replaceable fragment.
pub const VIEW_ATTR: &str = "data-tr-view";

/// Every attribute the manager owns.
pub const MANAGER_ATTRS: [&str; 4] = [MOUNTED_ATTR, OWNER_ATTR, LOADING_ATTR, ERROR_ATTR];

/// Whether `attr` on `node` contains `token`.
pub fn has_token(document: &Document, node: NodeId, attr: &str, token: &str) -> bool {
	document
		.attribute(node, attr)
		.is_some_and(|value| value.split_ascii_whitespace().any(|t| t == token))
}

/// Tokens of `attr` on `node`.
pub fn tokens(document: &Document, node: NodeId, attr: &str) -> Vec<String> {
	document
		.attribute(node, attr)
		.map(|value| value.split_ascii_whitespace().map(String::from).collect())
		.unwrap_or_default()
}

/// Adds `token` to `attr`; `false` if already present or `node` is not an element.
pub fn add_token(document: &mut Document, node: NodeId, attr: &str, token: &str) -> bool {
	if document.element(node).is_none() || has_token(document, node, attr, token) {
		return false;
	}
	let mut values = tokens(document, node, attr);
	values.push(token.to_string());
	document.set_attribute(node, attr, &values.join(" ")).is_ok()
}

/// Removes `token` from `attr`, dropping the attribute once empty.
pub fn remove_token(document: &mut Document, node: NodeId, attr: &str, token: &str) -> bool {
	if !has_token(document, node, attr, token) {
		return false;
	}
	let values: Vec<String> = tokens(document, node, attr)
		.into_iter()
		.filter(|t| t != token)
		.collect();
	if values.is_empty() {
		document.remove_attribute(node, attr);
		true
	} else {
		document.set_attribute(node, attr, &values.join(" ")).is_ok()
	}
}

/// Clears mount bookkeeping for `component` on `node`.
///
/// The owner marker goes once no component remains mounted.
pub fn clear_mount(document: &mut Document, node: NodeId, component: &str) {
	remove_token(document, node, MOUNTED_ATTR, component);
	remove_token(document, node, LOADING_ATTR, component);
	if !document.has_attribute(node, MOUNTED_ATTR) {
		document.remove_attribute(node, OWNER_ATTR);
	}
}

/// Removes every manager marker from `node` and its descendants.
pub fn strip(document: &mut Document, node: NodeId) {
	let mut nodes = document.descendants(node);
	nodes.push(node);
	for id in nodes {
		for attr in MANAGER_ATTRS {
			document.remove_attribute(id, attr);
		}
	}
}
