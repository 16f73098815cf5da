//! Selector parsing and matching against [`Document`] nodes.
//!
//! CSS selectors are compiled with the `selectors` engine using `scraper`'s
//! selector implementation, so the full Selectors Level 4 grammar it accepts
//! (`:not()`, `:is()`, `:where()`, `:has()`, structural pseudo-classes,
//! every attribute operator) is available to component registrations.
//! Matching runs directly against the document arena.
//!
//! State pseudo-classes such as `:hover` have no meaning in a static tree and
//! are rejected at parse time. Anything the grammar cannot express can be
//! written with [`Selector::from_fn`].

use crate::document::Document;
use crate::error::{DomError, DomResult};
use crate::node::{ElementData, NodeData, NodeId};
use html5ever::Namespace;
use scraper::error::SelectorErrorKind;
use scraper::selector::{CssLocalName, CssString, NonTSPseudoClass, Parser, PseudoElement, Simple};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{
	self, ElementSelectorFlags, MatchingContext, MatchingForInvalidation, MatchingMode,
	NeedsSelectorFlags, QuirksMode, SelectorCaches,
};
use selectors::parser::ParseRelative;
use selectors::{Element, OpaqueElement, SelectorList};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

type Predicate = Rc<dyn Fn(&Document, NodeId) -> bool>;

/// A compiled predicate over document elements.
#[derive(Clone)]
pub struct Selector {
	source: String,
	kind: SelectorKind,
}

#[derive(Clone)]
enum SelectorKind {
	Css(SelectorList<Simple>),
	Predicate(Predicate),
}

impl Selector {
	/// Parses a CSS selector list.
	///
	/// # Examples
	///
	/// ```
	/// use trellis_dom::Selector;
	///
	/// assert!(Selector::parse("main > [data-widget~=\"tabs\"], .carousel").is_ok());
	/// assert!(Selector::parse("[data-toggle]:not(.disabled)").is_ok());
	/// assert!(Selector::parse("div[").is_err());
	/// ```
	pub fn parse(source: &str) -> DomResult<Self> {
		let source = source.trim();
		let mut input = cssparser::ParserInput::new(source);
		let mut parser = cssparser::Parser::new(&mut input);
		let list = SelectorList::parse(&Parser, &mut parser, ParseRelative::No).map_err(|error| {
			DomError::InvalidSelector {
				selector: source.to_string(),
				reason: SelectorErrorKind::from(error).to_string(),
			}
		})?;
		Ok(Self {
			source: source.to_string(),
			kind: SelectorKind::Css(list),
		})
	}

	/// Wraps an arbitrary predicate. `description` is used for display only.
	pub fn from_fn<F>(description: impl Into<String>, predicate: F) -> Self
	where
		F: Fn(&Document, NodeId) -> bool + 'static,
	{
		Self {
			source: description.into(),
			kind: SelectorKind::Predicate(Rc::new(predicate)),
		}
	}

	/// Source text, or the description of a predicate selector.
	pub fn as_str(&self) -> &str {
		&self.source
	}

	/// Normalized CSS source; `None` for predicate selectors.
	pub fn css_source(&self) -> Option<&str> {
		match self.kind {
			SelectorKind::Css(_) => Some(&self.source),
			SelectorKind::Predicate(_) => None,
		}
	}

	/// Whether `node` is an element matched by this selector.
	pub fn matches(&self, document: &Document, node: NodeId) -> bool {
		let Some(element) = ElementHandle::new(document, node) else {
			return false;
		};
		match &self.kind {
			SelectorKind::Css(list) => {
				let mut caches = SelectorCaches::default();
				let mut context = MatchingContext::new(
					MatchingMode::Normal,
					None,
					&mut caches,
					QuirksMode::NoQuirks,
					NeedsSelectorFlags::No,
					MatchingForInvalidation::No,
				);
				matching::matches_selector_list(list, &element, &mut context)
			}
			SelectorKind::Predicate(predicate) => predicate(document, node),
		}
	}
}

impl fmt::Debug for Selector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let kind = match self.kind {
			SelectorKind::Css(_) => "css",
			SelectorKind::Predicate(_) => "predicate",
		};
		f.debug_struct("Selector")
			.field("source", &self.source)
			.field("kind", &kind)
			.finish()
	}
}

impl fmt::Display for Selector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.source)
	}
}

impl FromStr for Selector {
	type Err = DomError;

	fn from_str(source: &str) -> DomResult<Self> {
		Self::parse(source)
	}
}

impl TryFrom<&str> for Selector {
	type Error = DomError;

	fn try_from(source: &str) -> DomResult<Self> {
		Self::parse(source)
	}
}

/// An element viewed through the `selectors` matching engine.
#[derive(Clone, Copy)]
struct ElementHandle<'a> {
	document: &'a Document,
	id: NodeId,
	data: &'a ElementData,
}

impl<'a> ElementHandle<'a> {
	fn new(document: &'a Document, id: NodeId) -> Option<Self> {
		let data = document.element(id)?;
		Some(Self { document, id, data })
	}

	fn siblings(&self) -> (&'a [NodeId], usize) {
		let Some(parent) = self.document.parent(self.id) else {
			return (&[], 0);
		};
		let siblings = self.document.children(parent);
		let position = siblings
			.iter()
			.position(|&sibling| sibling == self.id)
			.unwrap_or_default();
		(siblings, position)
	}

	fn first_element<I>(&self, mut candidates: I) -> Option<Self>
	where
		I: Iterator<Item = &'a NodeId>,
	{
		candidates.find_map(|&id| Self::new(self.document, id))
	}
}

impl fmt::Debug for ElementHandle<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "<{}> {}", self.data.name(), self.id)
	}
}

impl Element for ElementHandle<'_> {
	type Impl = Simple;

	fn opaque(&self) -> OpaqueElement {
		OpaqueElement::new(self.data)
	}

	fn parent_element(&self) -> Option<Self> {
		self.document
			.parent(self.id)
			.and_then(|parent| Self::new(self.document, parent))
	}

	fn parent_node_is_shadow_root(&self) -> bool {
		false
	}

	fn containing_shadow_host(&self) -> Option<Self> {
		None
	}

	fn is_pseudo_element(&self) -> bool {
		false
	}

	fn prev_sibling_element(&self) -> Option<Self> {
		let (siblings, position) = self.siblings();
		self.first_element(siblings[..position].iter().rev())
	}

	fn next_sibling_element(&self) -> Option<Self> {
		let (siblings, position) = self.siblings();
		self.first_element(siblings.iter().skip(position + 1))
	}

	fn first_element_child(&self) -> Option<Self> {
		self.first_element(self.document.children(self.id).iter())
	}

	fn is_html_element_in_html_document(&self) -> bool {
		true
	}

	fn has_local_name(&self, name: &CssLocalName) -> bool {
		self.data.name() == &*name.0
	}

	fn has_namespace(&self, namespace: &Namespace) -> bool {
		namespace.is_empty() || &**namespace == HTML_NAMESPACE
	}

	fn is_same_type(&self, other: &Self) -> bool {
		self.data.name() == other.data.name()
	}

	fn attr_matches(
		&self,
		namespace: &NamespaceConstraint<&Namespace>,
		local_name: &CssLocalName,
		operation: &AttrSelectorOperation<&CssString>,
	) -> bool {
		if matches!(namespace, NamespaceConstraint::Specific(url) if !url.is_empty()) {
			return false;
		}
		self.data
			.attributes()
			.any(|(key, value)| key.eq_ignore_ascii_case(&local_name.0) && operation.eval_str(value))
	}

	fn match_non_ts_pseudo_class(
		&self,
		pseudo_class: &NonTSPseudoClass,
		_context: &mut MatchingContext<'_, Simple>,
	) -> bool {
		match *pseudo_class {}
	}

	fn match_pseudo_element(
		&self,
		pseudo_element: &PseudoElement,
		_context: &mut MatchingContext<'_, Simple>,
	) -> bool {
		match *pseudo_element {}
	}

	fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

	fn is_link(&self) -> bool {
		matches!(self.data.name(), "a" | "area") && self.data.attribute("href").is_some()
	}

	fn is_html_slot_element(&self) -> bool {
		self.data.name() == "slot"
	}

	fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
		self.data
			.id()
			.is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
	}

	fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
		self.data
			.classes()
			.any(|class| case_sensitivity.eq(name.0.as_bytes(), class.as_bytes()))
	}

	fn has_custom_state(&self, _name: &CssLocalName) -> bool {
		false
	}

	fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
		None
	}

	fn is_part(&self, _name: &CssLocalName) -> bool {
		false
	}

	fn is_empty(&self) -> bool {
		!self
			.document
			.children(self.id)
			.iter()
			.any(|&child| match self.document.data(child) {
				Some(NodeData::Element(_)) => true,
				Some(NodeData::Text(text)) => !text.is_empty(),
				_ => false,
			})
	}

	fn is_root(&self) -> bool {
		self.document
			.parent(self.id)
			.is_some_and(|parent| matches!(self.document.data(parent), Some(NodeData::Document)))
	}

	fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
		false
	}
}
