//! In-memory document for exercising views without a browser.
//!
//! [`MockDocument`] is a small DOM tree implementing
//! [`DocumentProvider`](crate::document::DocumentProvider). It can be mutated
//! while a verification is polling (from another thread), which is how the
//! live semantics of handles and block lists are tested.
//!
//! ## Example
//!
//! ```rust
//! use blockview::mock::{MockDocument, MockNode};
//!
//! let doc = MockDocument::new();
//! let list = doc.append(doc.root(), MockNode::new("ul").class("cart"));
//! let row = doc.append(list, MockNode::new("li").class("row"));
//! let _ = doc.append(row, MockNode::new("span").class("name").text("Apple"));
//! assert_eq!(doc.find_all("li.row").len(), 1);
//! ```

mod css;

use crate::document::{DocumentProvider, ElementState};
use crate::locator::{LocatorPath, Selector};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Identifier of a node inside one [`MockDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Element description used to build and mutate a [`MockDocument`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockNode {
    /// Tag name
    pub tag: String,
    /// `id` attribute
    pub id: Option<String>,
    /// Class list
    pub classes: Vec<String>,
    /// Other attributes
    pub attributes: BTreeMap<String, String>,
    /// Computed CSS properties
    pub css: BTreeMap<String, String>,
    /// Own text (descendant text is appended when inspected)
    pub text: String,
    /// Form value
    pub value: Option<String>,
    /// Displayed, before ancestor visibility is applied
    pub visible: bool,
    /// Not disabled
    pub enabled: bool,
    /// Has focus
    pub focused: bool,
    /// Read-only
    pub readonly: bool,
    /// Image finished loading
    pub image_loaded: bool,
}

impl MockNode {
    /// New visible, enabled element
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            css: BTreeMap::new(),
            text: String::new(),
            value: None,
            visible: true,
            enabled: true,
            focused: false,
            readonly: false,
            image_loaded: false,
        }
    }

    /// Set the `id`
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set `data-testid`
    #[must_use]
    pub fn test_id(self, id: impl Into<String>) -> Self {
        self.attr("data-testid", id)
    }

    /// Set a computed CSS property
    #[must_use]
    pub fn css(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.css.insert(name.into(), value.into());
        self
    }

    /// Set own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set form value
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Mark as not displayed
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Mark as disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Mark as focused
    #[must_use]
    pub fn focused(mut self) -> Self {
        self.focused = true;
        self
    }

    /// Mark as read-only
    #[must_use]
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Mark as a loaded image
    #[must_use]
    pub fn loaded_image(mut self) -> Self {
        self.image_loaded = true;
        self
    }
}

#[derive(Debug)]
struct Slot {
    node: MockNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

#[derive(Debug)]
struct Tree {
    slots: Vec<Slot>,
}

impl Tree {
    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.0).filter(|s| s.attached)
    }

    /// Attached descendants of `scope` in document order, excluding `scope`
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.slot(scope) {
            Some(slot) => slot.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            if let Some(slot) = self.slot(id) {
                out.push(id);
                stack.extend(slot.children.iter().rev().copied());
            }
        }
        out
    }

    fn matches(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let candidates = self.descendants(scope);
        match selector {
            Selector::Css(text) => match css::parse(text) {
                Some(chain) => candidates
                    .into_iter()
                    .filter(|id| self.matches_chain(*id, &chain))
                    .collect(),
                None => Vec::new(),
            },
            Selector::TestId(test_id) => candidates
                .into_iter()
                .filter(|id| {
                    self.slots[id.0].node.attributes.get("data-testid") == Some(test_id)
                })
                .collect(),
            Selector::Text(text) => candidates
                .into_iter()
                .filter(|id| self.slots[id.0].node.text.contains(text.as_str()))
                .collect(),
            Selector::XPath(_) => Vec::new(),
        }
    }

    fn matches_chain(&self, id: NodeId, chain: &css::CssChain) -> bool {
        let Some((last, outer)) = chain.compounds.split_last() else {
            return false;
        };
        if !last.matches(&self.slots[id.0].node) {
            return false;
        }
        let mut remaining = outer.iter().rev().peekable();
        let mut current = self.slots[id.0].parent;
        while let (Some(compound), Some(ancestor)) = (remaining.peek(), current) {
            if compound.matches(&self.slots[ancestor.0].node) {
                let _ = remaining.next();
            }
            current = self.slots[ancestor.0].parent;
        }
        remaining.peek().is_none()
    }

    fn resolve(&self, root: NodeId, path: &LocatorPath) -> Option<NodeId> {
        path.steps().iter().try_fold(root, |scope, step| {
            self.matches(scope, &step.selector).get(step.nth).copied()
        })
    }

    fn text_content(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let own = self.slots[id.0].node.text.trim();
        if !own.is_empty() {
            parts.push(own.to_string());
        }
        for child in &self.slots[id.0].children {
            if self.slot(*child).is_some() {
                let text = self.text_content(*child);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
        }
        parts.join(" ")
    }

    fn displayed(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if !self.slots[node.0].node.visible {
                return false;
            }
            current = self.slots[node.0].parent;
        }
        true
    }

    fn state(&self, id: NodeId) -> ElementState {
        let node = &self.slots[id.0].node;
        let mut attributes = node.attributes.clone();
        if let Some(element_id) = &node.id {
            let _ = attributes.insert("id".to_string(), element_id.clone());
        }
        if !node.classes.is_empty() {
            let _ = attributes.insert("class".to_string(), node.classes.join(" "));
        }
        if node.readonly {
            let _ = attributes.insert("readonly".to_string(), String::new());
        }
        ElementState {
            tag: node.tag.to_lowercase(),
            text: self.text_content(id),
            value: node.value.clone(),
            attributes,
            css: node.css.clone(),
            visible: self.displayed(id),
            enabled: node.enabled,
            focused: node.focused,
            readonly: node.readonly,
            image_loaded: node.image_loaded,
        }
    }
}

/// Thread-safe in-memory DOM
#[derive(Debug)]
pub struct MockDocument {
    tree: RwLock<Tree>,
    scrolls: AtomicUsize,
}

impl MockDocument {
    /// New document containing only the `html` root
    #[must_use]
    pub fn new() -> Arc<Self> {
        let root = Slot {
            node: MockNode::new("html"),
            parent: None,
            children: Vec::new(),
            attached: true,
        };
        Arc::new(Self {
            tree: RwLock::new(Tree { slots: vec![root] }),
            scrolls: AtomicUsize::new(0),
        })
    }

    /// The `html` root
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tree> {
        self.tree.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tree> {
        self.tree.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Append `node` as the last child of `parent`.
    ///
    /// An unknown `parent` leaves the node detached: it gets an id but is
    /// never matched. Use [`try_append`](Self::try_append) to detect that.
    pub fn append(&self, parent: NodeId, node: MockNode) -> NodeId {
        let mut tree = self.write();
        let known = tree.slots.get(parent.0).is_some();
        if !known {
            tracing::warn!(parent = parent.0, "appending below an unknown node");
        }
        let id = NodeId(tree.slots.len());
        tree.slots.push(Slot {
            node,
            parent: known.then_some(parent),
            children: Vec::new(),
            attached: known,
        });
        if let Some(slot) = tree.slots.get_mut(parent.0) {
            slot.children.push(id);
        }
        id
    }

    /// Like [`append`](Self::append), but `None` when `parent` is unknown
    pub fn try_append(&self, parent: NodeId, node: MockNode) -> Option<NodeId> {
        if self.read().slots.get(parent.0).is_none() {
            return None;
        }
        Some(self.append(parent, node))
    }

    /// Detach a node and its subtree
    pub fn remove(&self, id: NodeId) {
        let mut tree = self.write();
        let Some(parent) = tree.slots.get(id.0).and_then(|s| s.parent) else {
            return;
        };
        if let Some(slot) = tree.slots.get_mut(parent.0) {
            slot.children.retain(|c| *c != id);
        }
        if let Some(slot) = tree.slots.get_mut(id.0) {
            slot.attached = false;
        }
    }

    /// Mutate a node in place
    pub fn update<F>(&self, id: NodeId, mutate: F)
    where
        F: FnOnce(&mut MockNode),
    {
        if let Some(slot) = self.write().slots.get_mut(id.0) {
            mutate(&mut slot.node);
        }
    }

    /// Show or hide a node
    pub fn set_visible(&self, id: NodeId, visible: bool) {
        self.update(id, |n| n.visible = visible);
    }

    /// Replace a node's own text
    pub fn set_text(&self, id: NodeId, text: impl Into<String>) {
        let text = text.into();
        self.update(id, |n| n.text = text);
    }

    /// Attached nodes matching a CSS selector, in document order
    #[must_use]
    pub fn find_all(&self, css: &str) -> Vec<NodeId> {
        let tree = self.read();
        tree.matches(self.root(), &Selector::css(css))
    }

    /// First attached node matching a CSS selector
    #[must_use]
    pub fn find_first(&self, css: &str) -> Option<NodeId> {
        self.find_all(css).into_iter().next()
    }

    /// How many scroll-into-view requests were received
    #[must_use]
    pub fn scroll_requests(&self) -> usize {
        self.scrolls.load(Ordering::Relaxed)
    }
}

impl DocumentProvider for MockDocument {
    fn inspect(&self, path: &LocatorPath) -> Option<ElementState> {
        let tree = self.read();
        let id = tree.resolve(self.root(), path)?;
        Some(tree.state(id))
    }

    fn count(&self, scope: &LocatorPath, selector: &Selector) -> usize {
        let tree = self.read();
        tree.resolve(self.root(), scope)
            .map_or(0, |id| tree.matches(id, selector).len())
    }

    fn scroll_into_view(&self, _path: &LocatorPath) {
        let _ = self.scrolls.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shop() -> Arc<MockDocument> {
        let doc = MockDocument::new();
        let list = doc.append(doc.root(), MockNode::new("ul").class("catalog"));
        for (name, price) in [("Apple", "10"), ("Pear", "12")] {
            let row = doc.append(list, MockNode::new("li").class("item"));
            let _ = doc.append(row, MockNode::new("span").class("name").text(name));
            let _ = doc.append(row, MockNode::new("span").class("price").text(price));
        }
        doc
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_scoped_resolution() {
            let doc = shop();
            let path = LocatorPath::root()
                .child(Selector::css(".item"), 1)
                .child(Selector::css(".name"), 0);
            assert_eq!(doc.inspect(&path).unwrap().text, "Pear");
        }

        #[test]
        fn test_descendant_selector() {
            let doc = shop();
            assert_eq!(
                doc.count(&LocatorPath::root(), &Selector::css("ul.catalog .price")),
                2
            );
            assert_eq!(doc.count(&LocatorPath::root(), &Selector::css("ol .price")), 0);
        }

        #[test]
        fn test_missing_scope_counts_zero() {
            let doc = shop();
            let scope = LocatorPath::root().child(Selector::css(".item"), 5);
            assert_eq!(doc.count(&scope, &Selector::css(".name")), 0);
        }

        #[test]
        fn test_text_content_includes_descendants() {
            let doc = shop();
            let row = LocatorPath::root().child(Selector::css(".item"), 0);
            assert_eq!(doc.inspect(&row).unwrap().text, "Apple 10");
        }

        #[test]
        fn test_test_id_and_text_selectors() {
            let doc = MockDocument::new();
            let _ = doc.append(doc.root(), MockNode::new("button").test_id("buy").text("Buy now"));
            assert_eq!(doc.count(&LocatorPath::root(), &Selector::test_id("buy")), 1);
            assert_eq!(doc.count(&LocatorPath::root(), &Selector::text("Buy")), 1);
            assert_eq!(doc.count(&LocatorPath::root(), &Selector::xpath("//button")), 0);
        }
    }

    mod mutation_tests {
        use super::*;

        #[test]
        fn test_hidden_ancestor_hides_descendants() {
            let doc = shop();
            let list = doc.find_first(".catalog").unwrap();
            doc.set_visible(list, false);
            let path = LocatorPath::root().child(Selector::css(".name"), 0);
            assert!(!doc.inspect(&path).unwrap().visible);
        }

        #[test]
        fn test_remove_detaches_subtree() {
            let doc = shop();
            let first = doc.find_first(".item").unwrap();
            doc.remove(first);
            assert_eq!(doc.find_all(".item").len(), 1);
            assert_eq!(doc.find_all(".name").len(), 1);
        }

        #[test]
        fn test_set_text() {
            let doc = shop();
            let name = doc.find_first(".name").unwrap();
            doc.set_text(name, "Plum");
            let path = LocatorPath::root().child(Selector::css(".name"), 0);
            assert_eq!(doc.inspect(&path).unwrap().text, "Plum");
        }

        #[test]
        fn test_scroll_requests_counted() {
            let doc = shop();
            doc.scroll_into_view(&LocatorPath::root());
            doc.scroll_into_view(&LocatorPath::root());
            assert_eq!(doc.scroll_requests(), 2);
        }
    }

    mod append_tests {
        use super::*;

        #[test]
        fn test_unknown_parent_is_rejected() {
            let doc = shop();
            assert!(doc.try_append(NodeId(999), MockNode::new("li")).is_none());
            assert!(doc.try_append(doc.root(), MockNode::new("li")).is_some());
        }

        #[test]
        fn test_orphan_is_never_matched() {
            let doc = shop();
            let orphan = doc.append(NodeId(999), MockNode::new("li").class("item"));
            let _ = doc.append(orphan, MockNode::new("span").class("name").text("Ghost"));
            doc.remove(orphan);

            assert_eq!(doc.find_all(".item").len(), 2);
            assert_eq!(doc.count(&LocatorPath::root(), &Selector::css(".name")), 2);
            assert!(doc.inspect(&LocatorPath::root().child(Selector::text("Ghost"), 0)).is_none());
        }
    }
}
