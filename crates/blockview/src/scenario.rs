//! Per-scenario context: registered pages and the current page.
//!
//! Each test scenario owns one [`Scenario`]. Independent scenarios can run on
//! separate threads; they share nothing but the read-only configuration.

use crate::blocks::{Comparison, LiveBlockCollection};
use crate::check::ConditionEvaluator;
use crate::config::VerifyConfig;
use crate::document::DocumentProvider;
use crate::element::BlockFactory;
use crate::report::AttachmentSink;
use crate::result::{ViewError, ViewResult};
use crate::view::{Describable, View};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// PAGE REGISTRY
// =============================================================================

/// Page name to description factory
#[derive(Clone, Default)]
pub struct PageRegistry {
    pages: BTreeMap<String, BlockFactory>,
}

impl fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRegistry")
            .field("pages", &self.list())
            .finish()
    }
}

impl PageRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register page type `T` under `name`, replacing any previous entry
    pub fn register<T>(&mut self, name: impl Into<String>)
    where
        T: Describable + Default + 'static,
    {
        self.register_with(name, crate::blocks::factory::<T>());
    }

    /// Register a factory under `name`
    pub fn register_with(&mut self, name: impl Into<String>, factory: BlockFactory) {
        let _ = self.pages.insert(name.into(), factory);
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with_page<T>(mut self, name: impl Into<String>) -> Self
    where
        T: Describable + Default + 'static,
    {
        self.register::<T>(name);
        self
    }

    /// Whether `name` is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.pages.contains_key(name)
    }

    /// Fresh description of page `name`
    pub fn create(&self, name: &str) -> ViewResult<Arc<dyn Describable>> {
        self.pages
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ViewError::UnknownPage {
                name: name.to_string(),
            })
    }

    /// Registered names, sorted
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.pages.keys().map(String::as_str).collect()
    }

    /// Number of registered pages
    #[must_use]
    pub fn count(&self) -> usize {
        self.pages.len()
    }
}

// =============================================================================
// SCENARIO
// =============================================================================

/// Context of one test scenario
#[derive(Debug)]
pub struct Scenario {
    document: Arc<dyn DocumentProvider>,
    evaluator: ConditionEvaluator,
    pages: PageRegistry,
    current: Option<View>,
}

impl Scenario {
    /// Scenario over `document` with no pages registered
    #[must_use]
    pub fn new(
        document: Arc<dyn DocumentProvider>,
        config: Arc<VerifyConfig>,
        sink: Arc<dyn AttachmentSink>,
    ) -> Self {
        Self {
            document,
            evaluator: ConditionEvaluator::new(config, sink),
            pages: PageRegistry::new(),
            current: None,
        }
    }

    /// Use `pages` as the registry
    #[must_use]
    pub fn with_pages(mut self, pages: PageRegistry) -> Self {
        self.pages = pages;
        self
    }

    /// Page registry
    #[must_use]
    pub fn pages(&self) -> &PageRegistry {
        &self.pages
    }

    /// Page registry, for registering more pages
    pub fn pages_mut(&mut self) -> &mut PageRegistry {
        &mut self.pages
    }

    /// Document every page of this scenario is built on
    #[must_use]
    pub fn document(&self) -> &Arc<dyn DocumentProvider> {
        &self.document
    }

    /// Evaluator with this scenario's configuration and sink
    #[must_use]
    pub fn evaluator(&self) -> &ConditionEvaluator {
        &self.evaluator
    }

    /// Shared configuration
    #[must_use]
    pub fn config(&self) -> &VerifyConfig {
        self.evaluator.config()
    }

    /// Build page `name` and make it current. No appearance check runs.
    pub fn open_page(&mut self, name: &str) -> ViewResult<&View> {
        let description = self.pages.create(name)?;
        let page = View::page(description, Arc::clone(&self.document))?.with_name(name);
        tracing::info!(page = name, "opened page");
        Ok(self.current.insert(page))
    }

    /// [`open_page`](Self::open_page), then require it to appear as described
    pub fn open_page_appeared(&mut self, name: &str) -> ViewResult<&View> {
        let _ = self.open_page(name)?;
        let page = self.current_page()?;
        page.is_appeared(&self.evaluator)?;
        Ok(page)
    }

    /// Make an already built view current
    pub fn set_current_page(&mut self, page: View) {
        self.current = Some(page);
    }

    /// Current page
    pub fn current_page(&self) -> ViewResult<&View> {
        self.current.as_ref().ok_or(ViewError::NoCurrentPage)
    }

    /// Blocks of list `list` on the current page, after waiting for their
    /// count to satisfy `comparison` against `count`
    pub fn block_list_with_quantity(
        &self,
        list: &str,
        comparison: Comparison,
        count: usize,
    ) -> ViewResult<Vec<View>> {
        let page = self.current_page()?;
        let blocks = page.get_blocks_collection(list)?;
        self.wait_quantity(page.name(), None, blocks, comparison, count)
    }

    /// Blocks of list `list` inside block `container` of the current page,
    /// after waiting for their count
    pub fn block_list_in_block_with_quantity(
        &self,
        container: &str,
        list: &str,
        comparison: Comparison,
        count: usize,
    ) -> ViewResult<Vec<View>> {
        let page = self.current_page()?;
        let blocks = page.get_block(container)?.get_blocks_collection(list)?;
        self.wait_quantity(page.name(), Some(container), blocks, comparison, count)
    }

    fn wait_quantity(
        &self,
        page: &str,
        container: Option<&str>,
        blocks: &LiveBlockCollection,
        comparison: Comparison,
        count: usize,
    ) -> ViewResult<Vec<View>> {
        match blocks.wait_for_size(comparison, count, &self.evaluator.wait_options()) {
            Ok(_) => blocks.snapshot(),
            Err(actual) => Err(ViewError::verification(format!(
                "{}\nQuantity condition: {comparison}\nExpected blocks: {count}\nActual blocks: {actual}",
                describe_list_context(page, container, blocks.name())
            ))),
        }
    }
}

/// `Current page / Container block / Blocks list` header of list diagnostics
#[must_use]
pub fn describe_list_context(page: &str, container: Option<&str>, list: &str) -> String {
    let mut text = format!("Current page: '{page}'");
    if let Some(container) = container {
        text.push_str(&format!("\nContainer block: '{container}'"));
    }
    text.push_str(&format!("\nBlocks list: '{list}'"));
    text
}
