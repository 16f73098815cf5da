//! # Trellis DOM
//!
//! A small in-memory document tree used by the Trellis component runtime.
//!
//! ## Overview
//!
//! - [`Document`]: arena of nodes addressed by [`NodeId`], parsed from markup
//!   with `scraper` and serialized back through html5ever with
//!   [`Document::outer_html`].
//! - [`Selector`]: CSS selector lists compiled by the `selectors` engine
//!   (plus predicate selectors) used to match component targets.
//! - [`MutationRecord`]: child-list changes streamed to an observer.
//! - [`Dom`]: the shared, single-threaded handle the runtime passes around.
//!
//! ```text
//! ┌──────────┐  observe()   ┌────────────────────────────┐
//! │ Document │ ───────────▶ │ UnboundedReceiver<Mutation> │
//! └──────────┘              └────────────────────────────┘
//!      ▲ read()/write()
//! ┌──────────┐
//! │   Dom    │  Rc<RefCell<Document>>
//! └──────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use trellis_dom::{Dom, Selector};
//!
//! let dom = Dom::parse("<main><button class=\"toggle\">Menu</button></main>").unwrap();
//! let selector = Selector::parse("main .toggle").unwrap();
//!
//! let doc = dom.read();
//! let matches = doc.query_selector_all(doc.root(), &selector);
//! assert_eq!(matches.len(), 1);
//! ```

#![warn(missing_docs)]

mod document;
mod error;
mod mutation;
mod node;
mod parse;
mod selector;
mod serialize;

pub use document::{Document, ScrollPosition};
pub use error::{DomError, DomResult};
pub use mutation::MutationRecord;
pub use node::{ElementData, NodeData, NodeId};
pub use selector::Selector;

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Shared handle to a [`Document`].
///
/// Cloning is cheap and every clone sees the same tree. Borrows must not be
/// held across calls that may borrow again (component hooks, for instance).
#[derive(Clone, Default)]
pub struct Dom {
	inner: Rc<RefCell<Document>>,
}

impl Dom {
	/// Wraps a document.
	pub fn new(document: Document) -> Self {
		Self {
			inner: Rc::new(RefCell::new(document)),
		}
	}

	/// Parses markup into a new shared document.
	pub fn parse(markup: &str) -> DomResult<Self> {
		Document::parse(markup).map(Self::new)
	}

	/// Borrows the document immutably.
	///
	/// # Panics
	///
	/// Panics if the document is currently borrowed mutably.
	pub fn read(&self) -> Ref<'_, Document> {
		self.inner.borrow()
	}

	/// Borrows the document mutably.
	///
	/// # Panics
	///
	/// Panics if the document is currently borrowed.
	pub fn write(&self) -> RefMut<'_, Document> {
		self.inner.borrow_mut()
	}

	/// Whether both handles point at the same document.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for Dom {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.inner.try_borrow() {
			Ok(document) => f
				.debug_struct("Dom")
				.field("nodes", &document.node_count())
				.finish(),
			Err(_) => f.debug_struct("Dom").field("nodes", &"<borrowed>").finish(),
		}
	}
}
