//! Selector registry: declarative component registrations.
//!
//! [`SelectorRegistry`] collects registrations; [`SelectorRegistry::build`]
//! validates them into an immutable [`ComponentRegistry`].

use crate::config::{ComponentConfig, ComponentOptions, Priority};
use crate::error::{RegistryError, RegistryResult};
use std::collections::HashMap;
use std::fmt;
use trellis_dom::Selector;

/// Selector given at registration time.
#[derive(Debug, Clone)]
pub enum SelectorInput {
	/// CSS source, parsed during [`SelectorRegistry::build`].
	Css(String),
	/// An already compiled selector.
	Compiled(Selector),
}

impl From<&str> for SelectorInput {
	fn from(source: &str) -> Self {
		Self::Css(source.to_string())
	}
}

impl From<String> for SelectorInput {
	fn from(source: String) -> Self {
		Self::Css(source)
	}
}

impl From<Selector> for SelectorInput {
	fn from(selector: Selector) -> Self {
		Self::Compiled(selector)
	}
}

/// Non-fatal registry findings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryWarning {
	/// Two components share a selector.
	DuplicateSelector {
		/// The shared selector.
		selector: String,
		/// Component registered first.
		first: String,
		/// Component registered later.
		second: String,
	},
}

impl fmt::Display for RegistryWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::DuplicateSelector {
				selector,
				first,
				second,
			} => write!(
				f,
				"Components '{first}' and '{second}' share selector '{selector}'"
			),
		}
	}
}

/// Builder collecting component registrations.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use trellis_components::{
///     Component, ComponentError, ComponentOptions, ElementTracker, SelectorRegistry,
///     SharedComponent,
/// };
/// use trellis_dom::{Dom, NodeId};
///
/// #[derive(Default)]
/// struct Tabs(ElementTracker);
///
/// impl Component for Tabs {
///     fn mount(&self, _dom: &Dom, element: NodeId) -> Result<(), ComponentError> {
///         self.0.insert(element);
///         Ok(())
///     }
///     fn unmount(&self, _dom: &Dom, element: NodeId) -> Result<(), ComponentError> {
///         self.0.remove(element);
///         Ok(())
///     }
///     fn elements(&self) -> Vec<NodeId> {
///         self.0.snapshot()
///     }
/// }
///
/// let registry = SelectorRegistry::new()
///     .component(
///         "tabs",
///         "[data-tabs]",
///         ComponentOptions::new().constructor(|| Rc::new(Tabs::default()) as SharedComponent),
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(registry.len(), 1);
/// assert!(registry.get("tabs").is_some());
/// ```
#[derive(Debug, Default)]
pub struct SelectorRegistry {
	entries: Vec<(String, SelectorInput, ComponentOptions)>,
}

impl SelectorRegistry {
	/// An empty registry builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a component.
	pub fn component(
		mut self,
		name: impl Into<String>,
		selector: impl Into<SelectorInput>,
		options: ComponentOptions,
	) -> Self {
		self.entries.push((name.into(), selector.into(), options));
		self
	}

	/// Validates registrations and freezes them in registration order.
	///
	/// # Errors
	///
	/// Duplicate names, unparsable selectors, missing loaders, missing
	/// dependencies and dependency cycles are errors. Duplicate selectors
	/// are logged and kept as [`RegistryWarning`]s.
	pub fn build(self) -> RegistryResult<ComponentRegistry> {
		let mut configs = Vec::with_capacity(self.entries.len());
		let mut by_name = HashMap::new();
		let mut warnings = Vec::new();
		let mut seen_selectors: HashMap<String, String> = HashMap::new();

		for (name, selector, options) in self.entries {
			if by_name.contains_key(&name) {
				return Err(RegistryError::DuplicateName(name));
			}
			let selector = match selector {
				SelectorInput::Css(source) => {
					Selector::parse(&source).map_err(|source| RegistryError::InvalidSelector {
						component: name.clone(),
						source,
					})?
				}
				SelectorInput::Compiled(selector) => selector,
			};
			let Some(loader) = options.loader else {
				return Err(RegistryError::MissingLoader { component: name });
			};

			if let Some(css) = selector.css_source() {
				match seen_selectors.get(css) {
					Some(first) => {
						tracing::warn!(
							selector = css,
							first = %first,
							second = %name,
							"duplicate component selector"
						);
						warnings.push(RegistryWarning::DuplicateSelector {
							selector: css.to_string(),
							first: first.clone(),
							second: name.clone(),
						});
					}
					None => {
						seen_selectors.insert(css.to_string(), name.clone());
					}
				}
			}

			by_name.insert(name.clone(), configs.len());
			configs.push(ComponentConfig {
				name,
				selector,
				priority: options.priority,
				depends_on: options.depends_on,
				eager: options.eager,
				loader,
			});
		}

		let registry = ComponentRegistry {
			configs,
			by_name,
			warnings,
		};
		registry.validate_dependencies()?;
		tracing::debug!(components = registry.len(), "component registry built");
		Ok(registry)
	}
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
	InProgress,
	Done,
}

/// Validated, immutable component registrations.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
	configs: Vec<ComponentConfig>,
	by_name: HashMap<String, usize>,
	warnings: Vec<RegistryWarning>,
}

impl ComponentRegistry {
	/// Looks up a component by name.
	pub fn get(&self, name: &str) -> Option<&ComponentConfig> {
		self.by_name.get(name).map(|&index| &self.configs[index])
	}

	/// Whether `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.by_name.contains_key(name)
	}

	/// Components in registration order.
	pub fn iter(&self) -> impl Iterator<Item = &ComponentConfig> {
		self.configs.iter()
	}

	/// Components of one tier, in registration order.
	pub fn by_priority(&self, priority: Priority) -> impl Iterator<Item = &ComponentConfig> {
		self.configs
			.iter()
			.filter(move |config| config.priority() == priority)
	}

	/// Number of components.
	pub fn len(&self) -> usize {
		self.configs.len()
	}

	/// Whether nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.configs.is_empty()
	}

	/// Warnings collected during [`SelectorRegistry::build`].
	pub fn warnings(&self) -> &[RegistryWarning] {
		&self.warnings
	}

	/// Components ordered so that every dependency precedes its dependents.
	pub fn dependency_order(&self) -> Vec<&ComponentConfig> {
		let mut order = Vec::with_capacity(self.configs.len());
		let mut visited = vec![false; self.configs.len()];
		for index in 0..self.configs.len() {
			self.push_post_order(index, &mut visited, &mut order);
		}
		order.into_iter().map(|index| &self.configs[index]).collect()
	}

	fn push_post_order(&self, index: usize, visited: &mut [bool], order: &mut Vec<usize>) {
		if visited[index] {
			return;
		}
		visited[index] = true;
		for dependency in self.configs[index].depends_on() {
			if let Some(&next) = self.by_name.get(dependency) {
				self.push_post_order(next, visited, order);
			}
		}
		order.push(index);
	}

	fn validate_dependencies(&self) -> RegistryResult<()> {
		for config in &self.configs {
			for dependency in config.depends_on() {
				if !self.by_name.contains_key(dependency) {
					return Err(RegistryError::MissingDependency {
						component: config.name().to_string(),
						dependency: dependency.clone(),
					});
				}
			}
		}

		let mut state = vec![None; self.configs.len()];
		let mut path = Vec::new();
		for index in 0..self.configs.len() {
			self.detect_cycle(index, &mut state, &mut path)?;
		}
		Ok(())
	}

	fn detect_cycle(
		&self,
		index: usize,
		state: &mut [Option<Visit>],
		path: &mut Vec<usize>,
	) -> RegistryResult<()> {
		match state[index] {
			Some(Visit::Done) => return Ok(()),
			Some(Visit::InProgress) => {
				let start = path.iter().position(|&i| i == index).unwrap_or(0);
				let mut names: Vec<&str> = path[start..]
					.iter()
					.map(|&i| self.configs[i].name())
					.collect();
				names.push(self.configs[index].name());
				return Err(RegistryError::CircularDependency {
					path: names.join(" -> "),
				});
			}
			None => {}
		}

		state[index] = Some(Visit::InProgress);
		path.push(index);
		for dependency in self.configs[index].depends_on() {
			if let Some(&next) = self.by_name.get(dependency) {
				self.detect_cycle(next, state, path)?;
			}
		}
		path.pop();
		state[index] = Some(Visit::Done);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::module::Load;
	use rstest::rstest;

	fn options() -> ComponentOptions {
		ComponentOptions::new().loader(|| Load::failed("unused"))
	}

	#[rstest]
	fn test_build_preserves_registration_order() {
		// Arrange
		let builder = SelectorRegistry::new()
			.component("menu", ".menu", options())
			.component("modal", "[data-modal]", options().critical())
			.component("tabs", ".tabs", options());

		// Act
		let registry = builder.build().unwrap();

		// Assert
		let names: Vec<_> = registry.iter().map(ComponentConfig::name).collect();
		assert_eq!(names, vec!["menu", "modal", "tabs"]);
		let critical: Vec<_> = registry
			.by_priority(Priority::Critical)
			.map(ComponentConfig::name)
			.collect();
		assert_eq!(critical, vec!["modal"]);
	}

	#[rstest]
	fn test_duplicate_name_is_an_error() {
		// Act
		let result = SelectorRegistry::new()
			.component("menu", ".menu", options())
			.component("menu", ".nav", options())
			.build();

		// Assert
		assert_eq!(
			result.unwrap_err(),
			RegistryError::DuplicateName("menu".to_string())
		);
	}

	#[rstest]
	fn test_duplicate_selector_is_a_warning() {
		// Act
		let registry = SelectorRegistry::new()
			.component("menu", ".menu", options())
			.component("menu-analytics", " .menu ", options())
			.build()
			.unwrap();

		// Assert
		assert_eq!(
			registry.warnings(),
			&[RegistryWarning::DuplicateSelector {
				selector: ".menu".to_string(),
				first: "menu".to_string(),
				second: "menu-analytics".to_string(),
			}]
		);
		assert_eq!(registry.len(), 2);
	}

	#[rstest]
	fn test_invalid_selector_names_component() {
		// Act
		let result = SelectorRegistry::new()
			.component("broken", "div[", options())
			.build();

		// Assert
		assert!(matches!(
			result,
			Err(RegistryError::InvalidSelector { component, .. }) if component == "broken"
		));
	}

	#[rstest]
	fn test_missing_loader() {
		// Act
		let result = SelectorRegistry::new()
			.component("bare", ".bare", ComponentOptions::new())
			.build();

		// Assert
		assert_eq!(
			result.unwrap_err(),
			RegistryError::MissingLoader {
				component: "bare".to_string()
			}
		);
	}

	#[rstest]
	fn test_missing_dependency() {
		// Act
		let result = SelectorRegistry::new()
			.component("chart", ".chart", options().depends_on("d3"))
			.build();

		// Assert
		assert_eq!(
			result.unwrap_err(),
			RegistryError::MissingDependency {
				component: "chart".to_string(),
				dependency: "d3".to_string(),
			}
		);
	}

	#[rstest]
	#[case(vec![("a", vec!["a"])], "a -> a")]
	#[case(vec![("a", vec!["b"]), ("b", vec!["a"])], "a -> b -> a")]
	#[case(
		vec![("root", vec!["a"]), ("a", vec!["b"]), ("b", vec!["c"]), ("c", vec!["a"])],
		"a -> b -> c -> a"
	)]
	fn test_circular_dependency_reports_path(
		#[case] graph: Vec<(&str, Vec<&str>)>,
		#[case] expected: &str,
	) {
		// Arrange
		let mut builder = SelectorRegistry::new();
		for (name, dependencies) in graph {
			let mut component_options = options();
			for dependency in dependencies {
				component_options = component_options.depends_on(dependency);
			}
			builder = builder.component(name, format!(".{name}"), component_options);
		}

		// Act
		let result = builder.build();

		// Assert
		assert_eq!(
			result.unwrap_err(),
			RegistryError::CircularDependency {
				path: expected.to_string()
			}
		);
	}

	#[rstest]
	fn test_dependency_order_puts_dependencies_first() {
		// Arrange
		let registry = SelectorRegistry::new()
			.component("dashboard", ".dash", options().depends_on("chart"))
			.component("chart", ".chart", options().depends_on("tooltip"))
			.component("tooltip", "[data-tip]", options())
			.component("menu", ".menu", options())
			.build()
			.unwrap();

		// Act
		let order: Vec<_> = registry
			.dependency_order()
			.into_iter()
			.map(ComponentConfig::name)
			.collect();

		// Assert
		assert_eq!(order, vec!["tooltip", "chart", "dashboard", "menu"]);
	}
}
