//! Views described in YAML instead of code.
//!
//! ```yaml
//! views:
//!   - name: Catalog
//!     elements:
//!       - { name: Title, kind: element, locator: h1, mode: mandatory }
//!       - { name: Products, kind: blocks, locator: li.product, block: Product }
//!   - name: Product
//!     elements:
//!       - { name: Name, kind: element, locator: .name }
//!       - { name: Buy, kind: element, locator: { by: test_id, value: buy } }
//! ```
//!
//! A bare string locator is a CSS selector. Block references are resolved by
//! view name when a block is built, so views may refer to each other in any
//! order, including cyclically; nesting depth bounds the recursion.

use crate::element::{BlockFactory, ElementMode, ElementSpec};
use crate::locator::Selector;
use crate::result::{ViewError, ViewResult};
use crate::scenario::PageRegistry;
use crate::view::Describable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Element locator: a CSS string or an explicit selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestLocator {
    /// CSS shorthand
    Css(String),
    /// Any selector, e.g. `{ by: test_id, value: buy }`
    Selector(Selector),
}

impl ManifestLocator {
    /// Selector this locator stands for
    #[must_use]
    pub fn selector(&self) -> Selector {
        match self {
            Self::Css(css) => Selector::css(css.clone()),
            Self::Selector(selector) => selector.clone(),
        }
    }
}

/// One declared element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementManifest {
    /// Element name, unique within the view
    pub name: String,
    /// `element`, `elements`, `block` or `blocks`
    pub kind: String,
    /// Locator relative to the owning view; optional only for inline blocks
    #[serde(default)]
    pub locator: Option<ManifestLocator>,
    /// Mode; primary when omitted
    #[serde(default)]
    pub mode: Option<ElementMode>,
    /// Referenced view name for `block` and `blocks`
    #[serde(default)]
    pub block: Option<String>,
}

/// One view: a name and its ordered elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewManifest {
    /// View name
    pub name: String,
    /// Declared elements, in order
    #[serde(default)]
    pub elements: Vec<ElementManifest>,
}

/// A set of views that may reference each other
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSet {
    /// Every view of the set
    #[serde(default)]
    pub views: Vec<ViewManifest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclaredKind {
    Element,
    Elements,
    Block,
    Blocks,
}

impl DeclaredKind {
    fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_lowercase().as_str() {
            "element" => Some(Self::Element),
            "elements" | "elements-list" | "elements_list" => Some(Self::Elements),
            "block" => Some(Self::Block),
            "blocks" | "blocks-list" | "blocks_list" => Some(Self::Blocks),
            _ => None,
        }
    }
}

impl ManifestSet {
    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> ViewResult<Arc<Self>> {
        let set: Self = serde_yaml_ng::from_str(yaml)?;
        set.validate()?;
        Ok(Arc::new(set))
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ViewResult<Arc<Self>> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let set = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), views = set.views.len(), "loaded view manifest");
        Ok(set)
    }

    /// View named `name`
    #[must_use]
    pub fn view(&self, name: &str) -> Option<&ViewManifest> {
        self.views.iter().find(|v| v.name == name)
    }

    /// View names, in declaration order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.views.iter().map(|v| v.name.as_str()).collect()
    }

    /// Check view names are unique, locators present where required and
    /// block references resolvable. Unknown kinds pass here and fail when
    /// the view is built.
    pub fn validate(&self) -> ViewResult<()> {
        let mut seen = BTreeSet::new();
        for view in &self.views {
            if !seen.insert(view.name.as_str()) {
                return Err(ViewError::config(format!(
                    "manifest declares view '{}' more than once",
                    view.name
                )));
            }
        }
        for view in &self.views {
            for element in &view.elements {
                let Some(kind) = DeclaredKind::parse(&element.kind) else {
                    continue;
                };
                if element.locator.is_none() && kind != DeclaredKind::Block {
                    return Err(ViewError::config(format!(
                        "element '{}' in manifest view '{}' needs a locator",
                        element.name, view.name
                    )));
                }
                if matches!(kind, DeclaredKind::Block | DeclaredKind::Blocks) {
                    let target = element.block.as_deref().ok_or_else(|| {
                        ViewError::config(format!(
                            "element '{}' in manifest view '{}' needs a block reference",
                            element.name, view.name
                        ))
                    })?;
                    if self.view(target).is_none() {
                        return Err(ViewError::config(format!(
                            "element '{}' in manifest view '{}' refers to unknown view '{target}'",
                            element.name, view.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Description of view `name`
    pub fn describe(self: &Arc<Self>, name: &str) -> ViewResult<Arc<dyn Describable>> {
        if self.view(name).is_none() {
            return Err(ViewError::UnknownPage {
                name: name.to_string(),
            });
        }
        Ok(Arc::new(ManifestView {
            set: Arc::clone(self),
            name: name.to_string(),
        }))
    }

    /// Factory building descriptions of view `name`
    fn factory(self: &Arc<Self>, name: &str) -> BlockFactory {
        let set = Arc::clone(self);
        let name = name.to_string();
        Arc::new(move || {
            Arc::new(ManifestView {
                set: Arc::clone(&set),
                name: name.clone(),
            }) as Arc<dyn Describable>
        })
    }

    /// Register every view as a page under its own name
    pub fn register_pages(self: &Arc<Self>, registry: &mut PageRegistry) {
        for name in self.names() {
            registry.register_with(name, self.factory(name));
        }
    }
}

/// One view of a [`ManifestSet`]
#[derive(Debug, Clone)]
pub struct ManifestView {
    set: Arc<ManifestSet>,
    name: String,
}

impl ManifestView {
    fn spec(&self, element: &ElementManifest) -> ElementSpec {
        let Some(kind) = DeclaredKind::parse(&element.kind) else {
            return ElementSpec::unsupported(&element.name, &element.kind);
        };
        let locator = element.locator.as_ref().map(ManifestLocator::selector);
        let block = element.block.as_deref().unwrap_or_default();
        let spec = match (kind, locator) {
            (DeclaredKind::Element, Some(selector)) => ElementSpec::element(&element.name, selector),
            (DeclaredKind::Elements, Some(selector)) => ElementSpec::elements(&element.name, selector),
            (DeclaredKind::Block, locator) => {
                ElementSpec::block_with(&element.name, locator, self.set.factory(block))
            }
            (DeclaredKind::Blocks, Some(selector)) => {
                ElementSpec::blocks_with(&element.name, selector, self.set.factory(block))
            }
            (_, None) => ElementSpec::unsupported(&element.name, format!("{} without locator", element.kind)),
        };
        match element.mode.unwrap_or_default() {
            ElementMode::Mandatory => spec.mandatory(),
            ElementMode::Optional => spec.optional(),
            ElementMode::Hidden => spec.hidden(),
            ElementMode::Primary => spec,
        }
    }
}

impl Describable for ManifestView {
    fn view_name(&self) -> String {
        self.name.clone()
    }

    fn describe_elements(&self) -> Vec<ElementSpec> {
        self.set
            .view(&self.name)
            .map(|view| view.elements.iter().map(|e| self.spec(e)).collect())
            .unwrap_or_default()
    }
}
