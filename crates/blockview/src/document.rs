//! Document access: the provider seam and lazily re-resolved handles.
//!
//! An [`ElementHandle`] never caches what it found. Every query goes back to
//! the [`DocumentProvider`] with the handle's [`LocatorPath`], so a handle kept
//! across a document mutation observes the new state.

use crate::condition::Condition;
use crate::locator::{LocatorPath, Selector};
use crate::wait::{WaitOptions, Waiter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The rendered document, as seen by the verification engine.
///
/// Implementations sit on top of a browser driver (or an in-memory model such
/// as [`MockDocument`](crate::mock::MockDocument)). They must re-resolve paths
/// on every call.
pub trait DocumentProvider: Send + Sync + fmt::Debug {
    /// Current state of the element at `path`, `None` when it does not exist.
    fn inspect(&self, path: &LocatorPath) -> Option<ElementState>;

    /// Number of elements matching `selector` inside the element at `scope`.
    ///
    /// A missing scope has no matches.
    fn count(&self, scope: &LocatorPath, selector: &Selector) -> usize;

    /// Bring the element at `path` into the viewport before it is inspected.
    fn scroll_into_view(&self, _path: &LocatorPath) {}
}

/// Snapshot of one element's observable state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    /// Lower-case tag name
    pub tag: String,
    /// Rendered text content
    pub text: String,
    /// Form value, for inputs
    pub value: Option<String>,
    /// DOM attributes
    pub attributes: BTreeMap<String, String>,
    /// Computed CSS properties
    pub css: BTreeMap<String, String>,
    /// Displayed (element and all ancestors)
    pub visible: bool,
    /// Not disabled
    pub enabled: bool,
    /// Has input focus
    pub focused: bool,
    /// Read-only input
    pub readonly: bool,
    /// Image finished loading with a non-zero natural size
    pub image_loaded: bool,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            tag: "div".to_string(),
            text: String::new(),
            value: None,
            attributes: BTreeMap::new(),
            css: BTreeMap::new(),
            visible: true,
            enabled: true,
            focused: false,
            readonly: false,
            image_loaded: false,
        }
    }
}

impl ElementState {
    /// Attribute value, with `value` falling back to the form value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self.attributes.get(name) {
            Some(v) => Some(v.as_str()),
            None if name == "value" => self.value.as_deref(),
            None => None,
        }
    }
}

/// A lazily resolved reference to one element
#[derive(Clone)]
pub struct ElementHandle {
    document: Arc<dyn DocumentProvider>,
    path: LocatorPath,
}

impl fmt::Debug for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementHandle")
            .field("path", &self.path.to_string())
            .finish_non_exhaustive()
    }
}

/// Handles are equal when they describe the same path.
impl PartialEq for ElementHandle {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl ElementHandle {
    /// Handle on the document root
    #[must_use]
    pub fn document_root(document: Arc<dyn DocumentProvider>) -> Self {
        Self {
            document,
            path: LocatorPath::root(),
        }
    }

    /// Handle on an explicit path
    #[must_use]
    pub fn at(document: Arc<dyn DocumentProvider>, path: LocatorPath) -> Self {
        Self { document, path }
    }

    /// Path this handle resolves
    #[must_use]
    pub fn path(&self) -> &LocatorPath {
        &self.path
    }

    /// Provider backing this handle
    #[must_use]
    pub fn document(&self) -> &Arc<dyn DocumentProvider> {
        &self.document
    }

    /// Whether this is the document root
    #[must_use]
    pub fn is_document_root(&self) -> bool {
        self.path.is_root()
    }

    /// First match of `selector` inside this element
    #[must_use]
    pub fn find(&self, selector: Selector) -> Self {
        Self {
            document: Arc::clone(&self.document),
            path: self.path.child(selector, 0),
        }
    }

    /// All matches of `selector` inside this element
    #[must_use]
    pub fn find_all(&self, selector: Selector) -> ElementCollection {
        ElementCollection {
            document: Arc::clone(&self.document),
            scope: self.path.clone(),
            selector,
        }
    }

    /// Current state, `None` when absent
    #[must_use]
    pub fn state(&self) -> Option<ElementState> {
        self.document.inspect(&self.path)
    }

    /// Whether the element currently exists
    #[must_use]
    pub fn exists(&self) -> bool {
        self.state().is_some()
    }

    /// Evaluate a condition once, without waiting
    #[must_use]
    pub fn is(&self, condition: &Condition) -> bool {
        condition.evaluate(self.state().as_ref())
    }

    /// Poll until `condition` holds or the window closes
    #[must_use]
    pub fn wait_until(&self, condition: &Condition, options: &WaitOptions) -> bool {
        Waiter::new(*options)
            .until(|| self.is(condition))
            .success
    }

    /// Like [`wait_until`](Self::wait_until), failing with a diagnostic
    pub fn should(&self, condition: &Condition, options: &WaitOptions) -> crate::ViewResult<()> {
        if self.wait_until(condition, options) {
            return Ok(());
        }
        let actual = match self.state() {
            Some(state) => format!("text '{}', visible {}", state.text, state.visible),
            None => "element not found".to_string(),
        };
        Err(crate::ViewError::verification(format!(
            "Element {} should be {} within {}ms\nActual: {}",
            self.path, condition, options.timeout_ms, actual
        )))
    }

    /// Ask the provider to scroll this element into view
    pub fn scroll_into_view(&self) {
        self.document.scroll_into_view(&self.path);
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// A lazily resolved, ordered collection of elements
#[derive(Clone)]
pub struct ElementCollection {
    document: Arc<dyn DocumentProvider>,
    scope: LocatorPath,
    selector: Selector,
}

impl fmt::Debug for ElementCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementCollection")
            .field("scope", &self.scope.to_string())
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ElementCollection {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope && self.selector == other.selector
    }
}

impl ElementCollection {
    /// Selector matched inside the scope
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Current number of matches
    #[must_use]
    pub fn size(&self) -> usize {
        self.document.count(&self.scope, &self.selector)
    }

    /// Whether there are currently no matches
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Handle on the `index`-th match (zero-based), resolved lazily
    #[must_use]
    pub fn get(&self, index: usize) -> ElementHandle {
        ElementHandle {
            document: Arc::clone(&self.document),
            path: self.scope.child(self.selector.clone(), index),
        }
    }

    /// Handle on the first match
    #[must_use]
    pub fn first(&self) -> ElementHandle {
        self.get(0)
    }

    /// Handles on every current match, in document order
    #[must_use]
    pub fn handles(&self) -> Vec<ElementHandle> {
        (0..self.size()).map(|i| self.get(i)).collect()
    }
}

impl fmt::Display for ElementCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope.is_root() {
            write!(f, "{}", self.selector)
        } else {
            write!(f, "{} >> {}", self.scope, self.selector)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::{MockDocument, MockNode};

    fn catalog() -> Arc<MockDocument> {
        let doc = MockDocument::new();
        let list = doc.append(doc.root(), MockNode::new("ul").class("catalog"));
        for name in ["Apple", "Pear"] {
            let item = doc.append(list, MockNode::new("li").class("item"));
            let _ = doc.append(item, MockNode::new("span").class("name").text(name));
        }
        doc
    }

    #[test]
    fn test_collection_size_and_get() {
        let doc = catalog();
        let root = ElementHandle::document_root(doc);
        let items = root.find_all(Selector::css(".item"));
        assert_eq!(items.size(), 2);
        let second = items.get(1).find(Selector::css(".name"));
        assert_eq!(second.state().unwrap().text, "Pear");
    }

    #[test]
    fn test_handle_is_live() {
        let doc = catalog();
        let root = ElementHandle::document_root(doc.clone());
        let items = root.find_all(Selector::css(".item"));
        let third = items.get(2);
        assert!(!third.exists());

        let list = doc.find_first(".catalog").unwrap();
        let _ = doc.append(list, MockNode::new("li").class("item"));
        assert!(third.exists());
        assert_eq!(items.size(), 3);
    }

    #[test]
    fn test_should_reports_missing_element() {
        let doc = catalog();
        let root = ElementHandle::document_root(doc);
        let missing = root.find(Selector::css(".nope"));
        let err = missing
            .should(&Condition::Visible, &WaitOptions::new().with_timeout(0))
            .unwrap_err();
        assert!(err.to_string().contains("element not found"));
    }

    #[test]
    fn test_handle_equality_is_structural() {
        let doc = catalog();
        let a = ElementHandle::document_root(doc.clone()).find(Selector::css(".item"));
        let b = ElementHandle::document_root(doc).find(Selector::css(".item"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_value_attribute_falls_back_to_form_value() {
        let state = ElementState {
            value: Some("42".to_string()),
            ..ElementState::default()
        };
        assert_eq!(state.attribute("value"), Some("42"));
        assert_eq!(state.attribute("title"), None);
    }
}
