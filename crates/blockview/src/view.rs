//! Pages and blocks.
//!
//! A [`View`] is built from a [`Describable`] by a discovery pass
//! ([`View::initialize`]) that turns every declared element into an
//! [`ElementDescriptor`]. Handles are resolved relative to the view's root, so
//! two blocks of the same type in one list never see each other's elements.
//!
//! ## Appearance checks
//!
//! | Check | Selected at this level | Selected inside blocks | Condition |
//! |-------|------------------------|------------------------|-----------|
//! | mandatory | Mandatory | Mandatory, Primary | visible |
//! | hidden | Hidden | Hidden | hidden or absent |
//! | primary | Primary (+ Mandatory) | Mandatory, Primary | visible |
//! | disappeared | all | all | hidden or absent |
//!
//! A block is selected by its own mode, but its interior is always filtered by
//! the narrower "inside blocks" set, whatever the block's mode was.

use crate::blocks::LiveBlockCollection;
use crate::check::{ConditionCheck, ConditionEvaluator};
use crate::condition::Condition;
use crate::document::{DocumentProvider, ElementCollection, ElementHandle};
use crate::element::{ElementDescriptor, ElementKind, ElementMode, ElementSpec, ElementTarget, Shape};
use crate::result::{ViewError, ViewResult};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// Deepest allowed block nesting below a page
pub const MAX_NESTING_DEPTH: usize = 32;

/// Declarative description of a page or block.
///
/// # Example
///
/// ```rust
/// use blockview::{Describable, ElementSpec, Selector};
///
/// #[derive(Default)]
/// struct SearchForm;
///
/// impl Describable for SearchForm {
///     fn describe_elements(&self) -> Vec<ElementSpec> {
///         vec![
///             ElementSpec::element("Query", Selector::css("input.query")).mandatory(),
///             ElementSpec::element("Submit", Selector::css("button")),
///             ElementSpec::element("Spinner", Selector::css(".spinner")).hidden(),
///         ]
///     }
/// }
///
/// assert_eq!(SearchForm.view_name(), "SearchForm");
/// ```
pub trait Describable: Send + Sync {
    /// Name used in diagnostics; the type name by default
    fn view_name(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Declared elements, in order
    fn describe_elements(&self) -> Vec<ElementSpec>;
}

fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckGroup {
    Mandatory,
    Hidden,
    Primary { include_mandatory: bool },
    Disappeared,
}

impl CheckGroup {
    fn parent_modes(self) -> Vec<ElementMode> {
        match self {
            Self::Mandatory => vec![ElementMode::Mandatory],
            Self::Hidden => vec![ElementMode::Hidden],
            Self::Primary {
                include_mandatory: true,
            } => vec![ElementMode::Mandatory, ElementMode::Primary],
            Self::Primary {
                include_mandatory: false,
            } => vec![ElementMode::Primary],
            Self::Disappeared => ElementMode::ALL.to_vec(),
        }
    }

    fn child_modes(self) -> Vec<ElementMode> {
        match self {
            Self::Mandatory | Self::Primary { .. } => {
                vec![ElementMode::Mandatory, ElementMode::Primary]
            }
            Self::Hidden => vec![ElementMode::Hidden],
            Self::Disappeared => ElementMode::ALL.to_vec(),
        }
    }

    const fn condition(self) -> Condition {
        match self {
            Self::Mandatory | Self::Primary { .. } => Condition::Visible,
            Self::Hidden | Self::Disappeared => Condition::Hidden,
        }
    }

    const fn expectation(self) -> &'static str {
        match self {
            Self::Mandatory | Self::Primary { .. } => "is displayed on the page",
            Self::Hidden | Self::Disappeared => "is not displayed on the page",
        }
    }

    const fn passed_label(self) -> &'static str {
        match self {
            Self::Mandatory => "Passed mandatory element checks",
            Self::Hidden => "Passed hidden element checks",
            Self::Primary { .. } => "Passed primary element checks",
            Self::Disappeared => "Passed disappearance checks",
        }
    }

    const fn headline(self) -> &'static str {
        match self {
            Self::Mandatory => "Not all mandatory elements are displayed",
            Self::Hidden => "Not all hidden elements are hidden",
            Self::Primary { .. } => "Not all primary elements are displayed",
            Self::Disappeared => "Not all described elements disappeared",
        }
    }
}

/// A page or block with its discovered elements
#[derive(Clone)]
pub struct View {
    name: String,
    description: Arc<dyn Describable>,
    root: ElementHandle,
    depth: usize,
    elements: Vec<ElementDescriptor>,
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("elements", &self.elements)
            .finish_non_exhaustive()
    }
}

/// Structural equality: same name, same root path and the same
/// elements with the same kinds, modes and targets.
impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.root == other.root && self.elements == other.elements
    }
}

impl View {
    /// Page rooted at the document root, initialized
    pub fn page(description: Arc<dyn Describable>, document: Arc<dyn DocumentProvider>) -> ViewResult<Self> {
        Self::nested(description, ElementHandle::document_root(document), 0)
    }

    /// Block rooted at `root`, initialized
    pub fn block(description: Arc<dyn Describable>, root: ElementHandle) -> ViewResult<Self> {
        Self::nested(description, root, 0)
    }

    pub(crate) fn nested(
        description: Arc<dyn Describable>,
        root: ElementHandle,
        depth: usize,
    ) -> ViewResult<Self> {
        let mut view = Self {
            name: description.view_name(),
            description,
            root,
            depth,
            elements: Vec::new(),
        };
        view.initialize()?;
        Ok(view)
    }

    /// Rename, e.g. to the name a page was registered under
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// (Re)build the descriptors from the description.
    ///
    /// Running it again without a document change yields the same
    /// descriptors. On error the previous descriptors are kept.
    pub fn initialize(&mut self) -> ViewResult<()> {
        let specs = self.description.describe_elements();
        self.reject_duplicates(&specs)?;

        let mut elements = Vec::with_capacity(specs.len());
        for spec in &specs {
            let target = self.resolve(spec)?;
            elements.push(ElementDescriptor {
                name: spec.name.clone(),
                mode: spec.mode(),
                target,
            });
        }
        tracing::debug!(
            view = %self.name,
            root = %self.root,
            depth = self.depth,
            elements = elements.len(),
            "discovered view elements"
        );
        self.elements = elements;
        Ok(())
    }

    fn reject_duplicates(&self, specs: &[ElementSpec]) -> ViewResult<()> {
        let mut seen = HashSet::new();
        let duplicates: BTreeSet<&str> = specs
            .iter()
            .filter(|spec| !seen.insert(spec.name.as_str()))
            .map(|spec| spec.name.as_str())
            .collect();
        if duplicates.is_empty() {
            return Ok(());
        }
        Err(ViewError::DuplicateNames {
            view: self.name.clone(),
            names: duplicates.into_iter().map(str::to_string).collect(),
        })
    }

    fn resolve(&self, spec: &ElementSpec) -> ViewResult<ElementTarget> {
        match &spec.shape {
            Shape::Element(selector) => Ok(ElementTarget::Element(self.root.find(selector.clone()))),
            Shape::Elements(selector) => Ok(ElementTarget::Collection(
                self.root.find_all(selector.clone()),
            )),
            Shape::Block { locator, factory } => {
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(ViewError::NestingTooDeep {
                        view: self.name.clone(),
                        element: spec.name.clone(),
                        max_depth: MAX_NESTING_DEPTH,
                    });
                }
                let root = match locator {
                    Some(selector) => self.root.find(selector.clone()),
                    None => self.root.clone(),
                };
                let block = Self::nested(factory(), root, self.depth + 1)?;
                Ok(ElementTarget::Block(Box::new(block)))
            }
            Shape::Blocks { locator, factory } => Ok(ElementTarget::Blocks(LiveBlockCollection::new(
                spec.name.clone(),
                self.root.find_all(locator.clone()),
                Arc::clone(factory),
                self.depth + 1,
            ))),
            Shape::Unsupported { type_name } => Err(ViewError::UnsupportedShape {
                view: self.name.clone(),
                element: spec.name.clone(),
                found: type_name.clone(),
            }),
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Diagnostic name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root handle: the document root for a page, the block root for a block
    #[must_use]
    pub fn root(&self) -> &ElementHandle {
        &self.root
    }

    /// Nesting depth below the page that created this view
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Description this view was built from
    #[must_use]
    pub fn description(&self) -> &Arc<dyn Describable> {
        &self.description
    }

    /// Every descriptor, in declaration order
    #[must_use]
    pub fn elements(&self) -> &[ElementDescriptor] {
        &self.elements
    }

    /// Name to mode mapping
    #[must_use]
    pub fn modes(&self) -> BTreeMap<String, ElementMode> {
        self.elements
            .iter()
            .map(|d| (d.name.clone(), d.mode))
            .collect()
    }

    /// Descriptor by name
    pub fn descriptor(&self, name: &str) -> ViewResult<&ElementDescriptor> {
        self.elements
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| ViewError::ElementNotDescribed {
                view: self.name.clone(),
                name: name.to_string(),
            })
    }

    fn mismatch(&self, descriptor: &ElementDescriptor, expected: ElementKind) -> ViewError {
        ViewError::KindMismatch {
            view: self.name.clone(),
            name: descriptor.name.clone(),
            expected: expected.to_string(),
            actual: descriptor.kind().to_string(),
        }
    }

    /// Single element by name
    pub fn get_element(&self, name: &str) -> ViewResult<&ElementHandle> {
        let descriptor = self.descriptor(name)?;
        match &descriptor.target {
            ElementTarget::Element(handle) => Ok(handle),
            _ => Err(self.mismatch(descriptor, ElementKind::SingleHandle)),
        }
    }

    /// Element collection by name
    pub fn get_elements_list(&self, name: &str) -> ViewResult<&ElementCollection> {
        let descriptor = self.descriptor(name)?;
        match &descriptor.target {
            ElementTarget::Collection(collection) => Ok(collection),
            _ => Err(self.mismatch(descriptor, ElementKind::Collection)),
        }
    }

    /// Nested block by name
    pub fn get_block(&self, name: &str) -> ViewResult<&Self> {
        let descriptor = self.descriptor(name)?;
        match &descriptor.target {
            ElementTarget::Block(view) => Ok(view),
            _ => Err(self.mismatch(descriptor, ElementKind::NestedView)),
        }
    }

    /// Live block list by name
    pub fn get_blocks_collection(&self, name: &str) -> ViewResult<&LiveBlockCollection> {
        let descriptor = self.descriptor(name)?;
        match &descriptor.target {
            ElementTarget::Blocks(blocks) => Ok(blocks),
            _ => Err(self.mismatch(descriptor, ElementKind::ViewList)),
        }
    }

    /// Current blocks of a list, freshly built
    pub fn get_blocks_list(&self, name: &str) -> ViewResult<Vec<Self>> {
        self.get_blocks_collection(name)?.snapshot()
    }

    // =========================================================================
    // MODE SELECTION
    // =========================================================================

    /// Leaf descriptors selected for a check.
    ///
    /// Descriptors whose mode is in `parent_modes` are kept. A block list is
    /// expanded into its current blocks, and every block (listed or nested) is
    /// replaced by its own descriptors selected with `child_modes` at every
    /// level below.
    pub fn get_elements_with_modes(
        &self,
        parent_modes: &[ElementMode],
        child_modes: &[ElementMode],
    ) -> ViewResult<Vec<ElementDescriptor>> {
        let mut selected = Vec::new();
        for descriptor in self.elements.iter().filter(|d| d.has_mode(parent_modes)) {
            match &descriptor.target {
                ElementTarget::Block(view) => {
                    selected.extend(view.get_elements_with_modes(child_modes, child_modes)?);
                }
                ElementTarget::Blocks(blocks) => {
                    for view in blocks.snapshot()? {
                        selected.extend(view.get_elements_with_modes(child_modes, child_modes)?);
                    }
                }
                ElementTarget::Element(_) | ElementTarget::Collection(_) => {
                    selected.push(descriptor.clone());
                }
            }
        }
        Ok(selected)
    }

    fn checks_for(&self, group: CheckGroup) -> ViewResult<Vec<ConditionCheck>> {
        let condition = group.condition();
        let descriptors =
            self.get_elements_with_modes(&group.parent_modes(), &group.child_modes())?;
        Ok(descriptors
            .into_iter()
            .map(|d| {
                let message = format!("Element '{}' {}", d.name, group.expectation());
                ConditionCheck::new(d.name.clone(), d.check_handle(), condition.clone(), message)
            })
            .collect())
    }

    fn run_group(&self, evaluator: &ConditionEvaluator, group: CheckGroup) -> ViewResult<Vec<ConditionCheck>> {
        let checks = evaluator.check_all(self.checks_for(group)?);
        evaluator.attach_check_list_results(group.passed_label(), &checks, true);
        Ok(checks)
    }

    fn verify_group(&self, evaluator: &ConditionEvaluator, group: CheckGroup) -> ViewResult<()> {
        let checks = self.run_group(evaluator, group)?;
        evaluator.ensure_passed(&format!("{} on '{}'", group.headline(), self.name), &checks)
    }

    // =========================================================================
    // APPEARANCE CHECKS
    // =========================================================================

    /// Mandatory elements (and Mandatory/Primary elements of selected blocks)
    /// become visible
    pub fn check_mandatory(&self, evaluator: &ConditionEvaluator) -> ViewResult<()> {
        self.verify_group(evaluator, CheckGroup::Mandatory)
    }

    /// Hidden elements are hidden or absent
    pub fn check_hidden(&self, evaluator: &ConditionEvaluator) -> ViewResult<()> {
        self.verify_group(evaluator, CheckGroup::Hidden)
    }

    /// Primary elements (optionally also Mandatory ones) become visible
    pub fn check_primary(&self, evaluator: &ConditionEvaluator, include_mandatory: bool) -> ViewResult<()> {
        self.verify_group(evaluator, CheckGroup::Primary { include_mandatory })
    }

    /// Run every check group enabled in the configuration and fail once with
    /// all violations of all groups.
    ///
    /// The primary group includes Mandatory elements only when the mandatory
    /// group is disabled.
    pub fn is_appeared(&self, evaluator: &ConditionEvaluator) -> ViewResult<()> {
        let config = *evaluator.config();
        let mut groups = Vec::new();
        if config.check_mandatory {
            groups.push(CheckGroup::Mandatory);
        }
        if config.check_hidden {
            groups.push(CheckGroup::Hidden);
        }
        if config.check_primary {
            groups.push(CheckGroup::Primary {
                include_mandatory: !config.check_mandatory,
            });
        }

        let mut checks = Vec::new();
        for group in groups {
            checks.extend(self.run_group(evaluator, group)?);
        }
        tracing::info!(view = %self.name, checks = checks.len(), "appearance check");
        evaluator.ensure_passed(&format!("Page '{}' did not appear as described", self.name), &checks)
    }

    /// Every described element, whatever its mode, becomes hidden or absent
    pub fn is_disappeared(&self, evaluator: &ConditionEvaluator) -> ViewResult<()> {
        self.verify_group(evaluator, CheckGroup::Disappeared)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::VerifyConfig;
    use crate::locator::Selector;
    use crate::mock::{MockDocument, MockNode};
    use crate::report::MemorySink;

    #[derive(Default)]
    struct Header;

    impl Describable for Header {
        fn describe_elements(&self) -> Vec<ElementSpec> {
            vec![
                ElementSpec::element("Logo", Selector::css(".logo")),
                ElementSpec::element("Banner", Selector::css(".banner")).optional(),
                ElementSpec::element("Alert", Selector::css(".alert")).hidden(),
            ]
        }
    }

    #[derive(Default)]
    struct Row;

    impl Describable for Row {
        fn describe_elements(&self) -> Vec<ElementSpec> {
            vec![ElementSpec::element("Name", Selector::css(".name"))]
        }
    }

    #[derive(Default)]
    struct Shop;

    impl Describable for Shop {
        fn describe_elements(&self) -> Vec<ElementSpec> {
            vec![
                ElementSpec::element("Title", Selector::css("h1")).mandatory(),
                ElementSpec::elements("Links", Selector::css("a")),
                ElementSpec::block::<Header>("Header", Selector::css("header")).mandatory(),
                ElementSpec::blocks::<Row>("Rows", Selector::css("li.row")),
                ElementSpec::element("Spinner", Selector::css(".spinner")).hidden(),
            ]
        }
    }

    struct Dupes;

    impl Describable for Dupes {
        fn describe_elements(&self) -> Vec<ElementSpec> {
            vec![
                ElementSpec::element("Y", Selector::css(".y1")),
                ElementSpec::element("X", Selector::css(".x1")),
                ElementSpec::element("Z", Selector::css(".z")),
                ElementSpec::element("X", Selector::css(".x2")),
                ElementSpec::element("Y", Selector::css(".y2")),
            ]
        }
    }

    #[derive(Default)]
    struct Cyclic;

    impl Describable for Cyclic {
        fn describe_elements(&self) -> Vec<ElementSpec> {
            vec![ElementSpec::inline_block::<Self>("Again")]
        }
    }

    fn shop_document() -> Arc<MockDocument> {
        let doc = MockDocument::new();
        let _ = doc.append(doc.root(), MockNode::new("h1").text("Shop"));
        let header = doc.append(doc.root(), MockNode::new("header"));
        let _ = doc.append(header, MockNode::new("img").class("logo"));
        let list = doc.append(doc.root(), MockNode::new("ul"));
        for name in ["Apple", "Pear"] {
            let row = doc.append(list, MockNode::new("li").class("row"));
            let _ = doc.append(row, MockNode::new("span").class("name").text(name));
        }
        doc
    }

    fn evaluator(config: VerifyConfig) -> ConditionEvaluator {
        ConditionEvaluator::new(
            Arc::new(config.with_timeout_ms(50).with_polling_interval_ms(5)),
            Arc::new(MemorySink::new()),
        )
    }

    mod discovery_tests {
        use super::*;

        #[test]
        fn test_kinds_and_modes() {
            let view = View::page(Arc::new(Shop), shop_document()).unwrap();
            assert_eq!(view.name(), "Shop");
            let kinds: Vec<_> = view.elements().iter().map(ElementDescriptor::kind).collect();
            assert_eq!(
                kinds,
                vec![
                    ElementKind::SingleHandle,
                    ElementKind::Collection,
                    ElementKind::NestedView,
                    ElementKind::ViewList,
                    ElementKind::SingleHandle,
                ]
            );
            assert_eq!(view.modes()["Title"], ElementMode::Mandatory);
            assert_eq!(view.modes()["Links"], ElementMode::Primary);
            assert_eq!(view.modes()["Spinner"], ElementMode::Hidden);
        }

        #[test]
        fn test_initialize_is_idempotent() {
            let mut view = View::page(Arc::new(Shop), shop_document()).unwrap();
            let before = view.modes();
            let snapshot = view.clone();
            view.initialize().unwrap();
            assert_eq!(view.modes(), before);
            assert_eq!(view, snapshot);
        }

        #[test]
        fn test_duplicates_all_named() {
            let err = View::page(Arc::new(Dupes), MockDocument::new()).unwrap_err();
            match err {
                ViewError::DuplicateNames { view, names } => {
                    assert_eq!(view, "Dupes");
                    assert_eq!(names, vec!["X".to_string(), "Y".to_string()]);
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_cycle_is_bounded() {
            let err = View::page(Arc::new(Cyclic), MockDocument::new()).unwrap_err();
            assert!(matches!(
                err,
                ViewError::NestingTooDeep {
                    max_depth: MAX_NESTING_DEPTH,
                    ..
                }
            ));
        }

        #[test]
        fn test_block_scoped_to_its_root() {
            let view = View::page(Arc::new(Shop), shop_document()).unwrap();
            let header = view.get_block("Header").unwrap();
            assert_eq!(header.root().to_string(), "By.css: header");
            assert_eq!(
                header.get_element("Logo").unwrap().to_string(),
                "By.css: header >> By.css: .logo"
            );
        }

        #[test]
        fn test_inline_block_shares_owner_root() {
            #[derive(Default)]
            struct Page;
            impl Describable for Page {
                fn describe_elements(&self) -> Vec<ElementSpec> {
                    vec![ElementSpec::inline_block::<Header>("Header")]
                }
            }
            let view = View::page(Arc::new(Page), MockDocument::new()).unwrap();
            assert!(view.get_block("Header").unwrap().root().is_document_root());
        }

        #[test]
        fn test_unsupported_shape() {
            struct Bad;
            impl Describable for Bad {
                fn describe_elements(&self) -> Vec<ElementSpec> {
                    vec![ElementSpec::unsupported("Price", "f64")]
                }
            }
            let err = View::page(Arc::new(Bad), MockDocument::new()).unwrap_err();
            let text = err.to_string();
            assert!(text.contains("Price"));
            assert!(text.contains("f64"));
        }
    }

    mod accessor_tests {
        use super::*;

        #[test]
        fn test_missing_name() {
            let view = View::page(Arc::new(Shop), shop_document()).unwrap();
            let err = view.get_element("Nope").unwrap_err();
            assert!(matches!(err, ViewError::ElementNotDescribed { .. }));
            assert!(err.to_string().contains("Shop"));
            assert!(err.to_string().contains("Nope"));
        }

        #[test]
        fn test_wrong_accessor() {
            let view = View::page(Arc::new(Shop), shop_document()).unwrap();
            let err = view.get_block("Title").unwrap_err();
            assert_eq!(
                err.to_string(),
                "Element 'Title' in Shop is element, expected block"
            );
            assert!(view.get_elements_list("Rows").is_err());
            assert_eq!(view.get_blocks_list("Rows").unwrap().len(), 2);
        }
    }

    mod mode_selection_tests {
        use super::*;

        #[test]
        fn test_block_interior_uses_child_modes() {
            let view = View::page(Arc::new(Shop), shop_document()).unwrap();
            let selected = view
                .get_elements_with_modes(
                    &[ElementMode::Mandatory],
                    &[ElementMode::Mandatory, ElementMode::Primary],
                )
                .unwrap();
            let names: Vec<_> = selected.iter().map(|d| d.name.as_str()).collect();
            // Header is Mandatory; inside it only the Primary Logo qualifies
            assert_eq!(names, vec!["Title", "Logo"]);
        }

        #[test]
        fn test_list_expanded_per_block() {
            let view = View::page(Arc::new(Shop), shop_document()).unwrap();
            let selected = view
                .get_elements_with_modes(&[ElementMode::Primary], &[ElementMode::Primary])
                .unwrap();
            let names: Vec<_> = selected.iter().map(|d| d.name.as_str()).collect();
            assert_eq!(names, vec!["Links", "Name", "Name"]);
        }
    }

    mod appearance_tests {
        use super::*;

        #[test]
        fn test_default_flags_pass() {
            let view = View::page(Arc::new(Shop), shop_document()).unwrap();
            view.is_appeared(&evaluator(VerifyConfig::default())).unwrap();
        }

        #[test]
        fn test_missing_mandatory_fails() {
            let doc = shop_document();
            let view = View::page(Arc::new(Shop), doc.clone()).unwrap();
            let logo = doc.find_first(".logo").unwrap();
            doc.remove(logo);
            let err = view.check_mandatory(&evaluator(VerifyConfig::default())).unwrap_err();
            let text = err.to_string();
            assert!(text.contains("1 of 2"));
            assert!(text.contains("Element: Logo"));
        }

        #[test]
        fn test_disappeared() {
            let doc = MockDocument::new();
            let view = View::page(Arc::new(Shop), doc).unwrap();
            view.is_disappeared(&evaluator(VerifyConfig::default())).unwrap();

            let view = View::page(Arc::new(Shop), shop_document()).unwrap();
            assert!(view
                .is_disappeared(&evaluator(VerifyConfig::default()))
                .unwrap_err()
                .is_verification());
        }
    }
}
