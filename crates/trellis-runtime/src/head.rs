//! Head metadata synchronization after a primary-region swap.
//!
//! Only an allow-list of metadata is touched. Stylesheets, icons, manifests
//! and preload hints stay as they are.

use trellis_dom::{Document, DomResult, ElementData, NodeId};

#[derive(Debug, Clone, Copy)]
enum HeadRule {
	// `link[rel~=canonical]`, at most one kept.
	Canonical,
	// `meta[name=...]`, at most one kept.
	MetaName(&'static str),
	// `meta[property^="og:"]`
	OpenGraph,
	// `meta[name^="twitter:"]`
	TwitterCard,
	// `link[rel~=alternate]`
	Alternate,
}

// `rel` tokens that mark a link as a resource rather than page metadata.
const RESOURCE_RELS: [&str; 5] = ["stylesheet", "icon", "manifest", "preload", "prefetch"];

const HEAD_RULES: [HeadRule; 6] = [
	HeadRule::Canonical,
	HeadRule::MetaName("description"),
	HeadRule::MetaName("robots"),
	HeadRule::OpenGraph,
	HeadRule::TwitterCard,
	HeadRule::Alternate,
];

impl HeadRule {
	fn matches(self, element: &ElementData) -> bool {
		let has_rel = |token: &str| {
			element.attribute("rel").is_some_and(|rel| {
				rel.split_ascii_whitespace()
					.any(|t| t.eq_ignore_ascii_case(token))
			})
		};
		let is_resource = RESOURCE_RELS.iter().any(|token| has_rel(token));
		let meta_name = || {
			element
				.attribute("name")
				.map(str::to_ascii_lowercase)
				.unwrap_or_default()
		};
		match (self, element.name()) {
			(Self::Canonical, "link") => has_rel("canonical") && !is_resource,
			(Self::Alternate, "link") => has_rel("alternate") && !is_resource,
			(Self::MetaName(name), "meta") => meta_name() == name,
			(Self::TwitterCard, "meta") => meta_name().starts_with("twitter:"),
			(Self::OpenGraph, "meta") => element
				.attribute("property")
				.is_some_and(|property| property.starts_with("og:")),
			_ => false,
		}
	}

	fn singleton(self) -> bool {
		matches!(self, Self::Canonical | Self::MetaName(_))
	}
}

/// What [`sync_head`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadSyncReport {
	/// New title, when it changed.
	pub title: Option<String>,
	/// Live elements removed.
	pub removed: usize,
	/// Incoming elements inserted.
	pub inserted: usize,
}

impl HeadSyncReport {
	/// Whether anything changed.
	pub fn changed(&self) -> bool {
		self.title.is_some() || self.removed > 0 || self.inserted > 0
	}
}

fn matching(document: &Document, head: NodeId, rule: HeadRule) -> Vec<NodeId> {
	document
		.descendants(head)
		.into_iter()
		.filter(|&node| {
			document
				.element(node)
				.is_some_and(|element| rule.matches(element))
		})
		.collect()
}

/// Copies allow-listed head metadata from `parsed` into `live`.
///
/// The title is replaced only when `parsed` has one. For every other rule
/// the live set is replaced by the incoming set, so a canonical link is
/// never duplicated and disappears when the new page has none.
pub fn sync_head(live: &mut Document, parsed: &Document) -> DomResult<HeadSyncReport> {
	let mut report = HeadSyncReport::default();

	if let Some(title) = parsed.title()
		&& live.title().as_deref() != Some(title.as_str())
	{
		live.set_title(&title)?;
		report.title = Some(title);
	}

	let Some(live_head) = live.head() else {
		return Ok(report);
	};
	let parsed_head = parsed.head();

	for rule in HEAD_RULES {
		for node in matching(live, live_head, rule) {
			live.remove(node)?;
			report.removed += 1;
		}
		let Some(parsed_head) = parsed_head else {
			continue;
		};
		let mut incoming = matching(parsed, parsed_head, rule);
		if rule.singleton() {
			incoming.truncate(1);
		}
		for node in incoming {
			if let Some(copy) = live.import_subtree(parsed, node) {
				live.append_child(live_head, copy)?;
				report.inserted += 1;
			}
		}
	}

	Ok(report)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use trellis_dom::Selector;

	fn count(doc: &Document, selector: &str) -> usize {
		doc.query_selector_all(doc.root(), &Selector::parse(selector).unwrap())
			.len()
	}

	#[rstest]
	fn test_canonical_is_never_duplicated() {
		// Arrange
		let mut live = Document::parse(
			r#"<html><head>
				<link rel="canonical" href="/old-1">
				<link rel="canonical" href="/old-2">
				<link rel="stylesheet" href="/app.css">
			</head><body></body></html>"#,
		)
		.unwrap();
		let parsed = Document::parse(
			r#"<html><head><link rel="canonical" href="/new"></head><body></body></html>"#,
		)
		.unwrap();

		// Act
		let report = sync_head(&mut live, &parsed).unwrap();

		// Assert
		let canonical = Selector::parse("link[rel~=canonical]").unwrap();
		let links = live.query_selector_all(live.root(), &canonical);
		assert_eq!(links.len(), 1);
		assert_eq!(live.attribute(links[0], "href"), Some("/new"));
		assert_eq!(count(&live, "link[rel=stylesheet]"), 1);
		assert_eq!(report.removed, 2);
		assert_eq!(report.inserted, 1);
	}

	#[rstest]
	fn test_canonical_removed_when_absent() {
		// Arrange
		let mut live =
			Document::parse(r#"<head><link rel="canonical" href="/old"></head>"#).unwrap();
		let parsed = Document::parse("<head></head><p>x</p>").unwrap();

		// Act
		sync_head(&mut live, &parsed).unwrap();

		// Assert
		assert_eq!(count(&live, "link[rel~=canonical]"), 0);
	}

	#[rstest]
	#[case(Some("Next page"), "Next page")]
	#[case(None, "Current")]
	fn test_title_only_replaced_when_present(
		#[case] incoming: Option<&str>,
		#[case] expected: &str,
	) {
		// Arrange
		let mut live = Document::parse("<head><title>Current</title></head>").unwrap();
		let markup = match incoming {
			Some(title) => format!("<head><title>{title}</title></head><p></p>"),
			None => "<head></head><p></p>".to_string(),
		};
		let parsed = Document::parse(&markup).unwrap();

		// Act
		let report = sync_head(&mut live, &parsed).unwrap();

		// Assert
		assert_eq!(live.title().as_deref(), Some(expected));
		assert_eq!(report.title.as_deref(), incoming);
	}

	#[rstest]
	fn test_social_and_alternate_metadata_replaced() {
		// Arrange
		let mut live = Document::parse(
			r#"<head>
				<meta name="description" content="old">
				<meta property="og:title" content="old">
				<meta property="og:image" content="old.png">
				<meta name="twitter:card" content="summary">
				<link rel="alternate" hreflang="de" href="/de/old">
				<link rel="icon" href="/favicon.ico">
				<meta charset="utf-8">
			</head>"#,
		)
		.unwrap();
		let parsed = Document::parse(
			r#"<head>
				<meta name="description" content="new">
				<meta name="description" content="ignored duplicate">
				<meta property="og:title" content="new">
				<link rel="alternate" hreflang="fr" href="/fr/new">
			</head>"#,
		)
		.unwrap();

		// Act
		sync_head(&mut live, &parsed).unwrap();

		// Assert
		assert_eq!(count(&live, "meta[name=description]"), 1);
		assert_eq!(count(&live, "meta[name=description][content=new]"), 1);
		assert_eq!(count(&live, "meta[property^=\"og:\"]"), 1);
		assert_eq!(count(&live, "meta[name^=\"twitter:\"]"), 0);
		assert_eq!(count(&live, "link[rel=alternate][hreflang=fr]"), 1);
		assert_eq!(count(&live, "link[rel=icon]"), 1);
		assert_eq!(count(&live, "meta[charset]"), 1);
	}

	#[rstest]
	#[case("alternate stylesheet")]
	#[case("alternate icon")]
	#[case("canonical preload")]
	#[case("alternate prefetch")]
	fn test_resource_links_survive_alternate_and_canonical_sync(#[case] rel: &str) {
		// Arrange
		let mut live = Document::parse(&format!(
			r#"<head>
				<link rel="{rel}" href="/live-resource">
				<link rel="alternate" hreflang="de" href="/de/old">
			</head>"#
		))
		.unwrap();
		let parsed = Document::parse(&format!(
			r#"<head>
				<link rel="{rel}" href="/incoming-resource">
				<link rel="alternate" hreflang="fr" href="/fr/new">
			</head>"#
		))
		.unwrap();

		// Act
		let report = sync_head(&mut live, &parsed).unwrap();

		// Assert
		assert_eq!(count(&live, "link[href=\"/live-resource\"]"), 1);
		assert_eq!(count(&live, "link[href=\"/incoming-resource\"]"), 0);
		assert_eq!(count(&live, "link[hreflang=de]"), 0);
		assert_eq!(count(&live, "link[hreflang=fr]"), 1);
		assert_eq!((report.removed, report.inserted), (1, 1));
	}
}
