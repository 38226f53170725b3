//! Searching and filtering a live block list.
//!
//! A [`BlockListContext`] re-reads the list from the document on every call.
//! Search helpers poll: each round rebuilds the list and scans it in document
//! order, so a block that appears or changes while the search runs is found.

use crate::blocks::{describe_blocks, Comparison, LiveBlockCollection};
use crate::check::{ConditionCheck, ConditionEvaluator};
use crate::condition::Condition;
use crate::document::ElementHandle;
use crate::filter::{FilterKind, FilterTriple};
use crate::result::{ViewError, ViewResult};
use crate::scenario::{describe_list_context, Scenario};
use crate::view::View;
use crate::wait::Waiter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One expected cell of a block table: block `block` (1-based) has element
/// `element` satisfying `kind` with `expected`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// 1-based block number
    pub block: usize,
    /// Element name within the block
    pub element: String,
    /// Condition kind, as accepted by [`FilterKind`]
    pub kind: String,
    /// Expected value
    #[serde(default)]
    pub expected: String,
}

impl TableRow {
    /// New row
    #[must_use]
    pub fn new(
        block: usize,
        element: impl Into<String>,
        kind: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            block,
            element: element.into(),
            kind: kind.into(),
            expected: expected.into(),
        }
    }
}

/// Search helpers over one block list of the current page
#[derive(Debug, Clone)]
pub struct BlockListContext {
    page: String,
    container: Option<String>,
    blocks: LiveBlockCollection,
    evaluator: ConditionEvaluator,
}

impl BlockListContext {
    /// Context over list `list` of the current page. Waits until the list
    /// has at least one block.
    pub fn from_list(scenario: &Scenario, list: &str) -> ViewResult<Self> {
        let _ = scenario.block_list_with_quantity(list, Comparison::Greater, 0)?;
        let page = scenario.current_page()?;
        Ok(Self {
            page: page.name().to_string(),
            container: None,
            blocks: page.get_blocks_collection(list)?.clone(),
            evaluator: scenario.evaluator().clone(),
        })
    }

    /// Context over list `list` inside block `container` of the current
    /// page. Waits until the list has at least one block.
    pub fn from_block(scenario: &Scenario, container: &str, list: &str) -> ViewResult<Self> {
        let _ = scenario.block_list_in_block_with_quantity(container, list, Comparison::Greater, 0)?;
        let page = scenario.current_page()?;
        Ok(Self {
            page: page.name().to_string(),
            container: Some(container.to_string()),
            blocks: page.get_block(container)?.get_blocks_collection(list)?.clone(),
            evaluator: scenario.evaluator().clone(),
        })
    }

    /// Context over an arbitrary collection, without waiting
    #[must_use]
    pub fn new(page: impl Into<String>, blocks: LiveBlockCollection, evaluator: ConditionEvaluator) -> Self {
        Self {
            page: page.into(),
            container: None,
            blocks,
            evaluator,
        }
    }

    /// List name
    #[must_use]
    pub fn list_name(&self) -> &str {
        self.blocks.name()
    }

    /// Container block name, when built from one
    #[must_use]
    pub fn container_name(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// Underlying live collection
    #[must_use]
    pub fn collection(&self) -> &LiveBlockCollection {
        &self.blocks
    }

    /// Current blocks, rebuilt on every call
    pub fn blocks(&self) -> ViewResult<Vec<View>> {
        self.blocks.snapshot()
    }

    fn context(&self) -> String {
        describe_list_context(&self.page, self.container.as_deref(), self.blocks.name())
    }

    /// Block number `number` (1-based) of the current list
    pub fn nth_block(&self, number: usize) -> ViewResult<View> {
        let size = self.blocks.size();
        if number == 0 || number > size {
            return Err(ViewError::OutOfRange {
                requested: number,
                size,
            });
        }
        self.blocks.get(number - 1)
    }

    /// Handle of `element` in `block`, scrolled into view
    fn element_of(block: &View, element: &str) -> ViewResult<ElementHandle> {
        let handle = block.get_element(element)?.clone();
        handle.scroll_into_view();
        Ok(handle)
    }

    // =========================================================================
    // FIRST-MATCH SEARCH
    // =========================================================================

    fn find_first(&self, element: &str, condition: &Condition, not_found: String) -> ViewResult<View> {
        let mut last_seen: Vec<View> = Vec::new();
        let (found, result) = Waiter::new(self.evaluator.wait_options()).poll(|| {
            let blocks = self.blocks.snapshot()?;
            for block in &blocks {
                if Self::element_of(block, element)?.is(condition) {
                    return Ok(Some(block.clone()));
                }
            }
            last_seen = blocks;
            Ok::<_, ViewError>(None)
        })?;
        if let Some(block) = found {
            tracing::debug!(list = self.blocks.name(), element, attempts = result.attempts, "found block");
            return Ok(block);
        }
        Err(ViewError::verification(format!(
            "{not_found}\n{}\nBlocks list size: {}\nBlocks:\n{}",
            self.context(),
            last_seen.len(),
            describe_blocks(&last_seen)
        )))
    }

    /// First block whose `element` text, value or title equals `expected`
    pub fn find_by_text_equals(&self, element: &str, expected: &str) -> ViewResult<View> {
        self.find_first(
            element,
            &Condition::text_equals(expected),
            format!("No block has element '{element}' with text '{expected}'"),
        )
    }

    /// First block whose `element` text or value contains `expected`
    pub fn find_by_text_contains(&self, element: &str, expected: &str) -> ViewResult<View> {
        self.find_first(
            element,
            &Condition::text_contains(expected),
            format!("No block has element '{element}' containing text '{expected}'"),
        )
    }

    /// First block whose `element` text, value or title matches `pattern`
    pub fn find_by_regexp(&self, element: &str, pattern: &str) -> ViewResult<View> {
        self.find_first(
            element,
            &Condition::text_matches(pattern)?,
            format!("No block has element '{element}' matching '{pattern}'"),
        )
    }

    /// First block whose `element` is visible
    pub fn find_by_visible_element(&self, element: &str) -> ViewResult<View> {
        self.find_first(
            element,
            &Condition::Visible,
            format!("No block has a visible element '{element}'"),
        )
    }

    // =========================================================================
    // FILTERING
    // =========================================================================

    /// Blocks satisfying every row, narrowed stage by stage.
    ///
    /// Row kinds are validated before any polling. Each polling round starts
    /// from the full live list; a round fails at the first stage that leaves
    /// no block, and the final diagnostic lists what every earlier stage kept.
    pub fn filter_by_conditions(&self, triples: &[FilterTriple]) -> ViewResult<Vec<View>> {
        if triples.is_empty() {
            return Err(ViewError::config("filter needs at least one condition"));
        }
        let stages = triples
            .iter()
            .map(|t| t.compile().map(|(kind, condition)| (t, kind, condition)))
            .collect::<ViewResult<Vec<_>>>()?;

        let mut failure = String::new();
        let (found, _) = Waiter::new(self.evaluator.wait_options()).poll(|| {
            let mut survivors = self.blocks.snapshot()?;
            let mut report = String::new();
            for (triple, kind, condition) in &stages {
                let before = survivors;
                survivors = Vec::new();
                for block in &before {
                    let handle = block.get_element(&triple.element)?;
                    if kind.requires_presence() && !handle.exists() {
                        continue;
                    }
                    handle.scroll_into_view();
                    if handle.is(condition) {
                        survivors.push(block.clone());
                    }
                }
                if survivors.is_empty() {
                    failure = format!(
                        "{report}No block has element {triple}\nBlocks list size: {}\nBlocks:\n{}",
                        before.len(),
                        describe_blocks(&before)
                    );
                    return Ok(None);
                }
                report.push_str(&format!(
                    "Blocks where element {triple}:\n{}\n",
                    describe_blocks(&survivors)
                ));
            }
            Ok::<_, ViewError>(Some(survivors))
        })?;

        found.ok_or_else(|| ViewError::verification(format!("{}\n{failure}", self.context())))
    }

    // =========================================================================
    // LIST-WIDE CHECKS
    // =========================================================================

    /// `element` satisfies `condition` in every current block. All failing
    /// blocks are reported together.
    pub fn check_element_in_every_block(&self, element: &str, condition: &Condition) -> ViewResult<()> {
        let checks = self
            .blocks()?
            .iter()
            .enumerate()
            .map(|(i, block)| {
                Ok(ConditionCheck::new(
                    format!("{element} (block {})", i + 1),
                    Self::element_of(block, element)?,
                    condition.clone(),
                    format!("Element '{element}' is {condition}"),
                ))
            })
            .collect::<ViewResult<Vec<_>>>()?;
        let checks = self.evaluator.check_all(checks);
        self.evaluator
            .attach_check_list_results("Passed block checks", &checks, true);
        self.evaluator.ensure_passed(
            &format!(
                "Element '{element}' is not {condition} in every block of '{}'",
                self.blocks.name()
            ),
            &checks,
        )
    }

    /// Every current block satisfies every row.
    ///
    /// Rows are validated before polling. Each round re-reads the list; when
    /// the window closes, every (block, row) pair still failing is reported.
    pub fn every_block_matches(&self, triples: &[FilterTriple]) -> ViewResult<()> {
        if triples.is_empty() {
            return Err(ViewError::config("block match needs at least one condition"));
        }
        let stages = triples
            .iter()
            .map(|t| t.compile().map(|(_, condition)| (t, condition)))
            .collect::<ViewResult<Vec<_>>>()?;

        let mut mismatches = Vec::new();
        let mut failed_blocks = BTreeSet::new();
        let mut total = 0;
        let (matched, _) = Waiter::new(self.evaluator.wait_options()).poll(|| {
            let blocks = self.blocks.snapshot()?;
            total = blocks.len();
            mismatches.clear();
            failed_blocks.clear();
            for (i, block) in blocks.iter().enumerate() {
                for (triple, condition) in &stages {
                    if !Self::element_of(block, &triple.element)?.is(condition) {
                        mismatches.push(format!("Block {}: element {triple}", i + 1));
                        let _ = failed_blocks.insert(i);
                    }
                }
            }
            Ok::<_, ViewError>(mismatches.is_empty().then_some(()))
        })?;
        if matched.is_some() {
            return Ok(());
        }
        Err(ViewError::verification(format!(
            "{}\nBlocks not matching every condition: {} of {total}\n{}",
            self.context(),
            failed_blocks.len(),
            mismatches.join("\n")
        )))
    }

    /// Every current block appears as described
    pub fn every_block_appeared(&self) -> ViewResult<()> {
        let blocks = self.blocks()?;
        let mut failures = Vec::new();
        for (i, block) in blocks.iter().enumerate() {
            match block.is_appeared(&self.evaluator) {
                Ok(()) => {}
                Err(e) if e.is_verification() => failures.push(format!("Block {}: {e}", i + 1)),
                Err(e) => return Err(e),
            }
        }
        if failures.is_empty() {
            return Ok(());
        }
        Err(ViewError::verification(format!(
            "{}\nBlocks that did not appear: {} of {}\n{}",
            self.context(),
            failures.len(),
            blocks.len(),
            failures.join("\n\n")
        )))
    }

    /// Number of current blocks whose `element` satisfies `condition`, without waiting
    pub fn count_matching(&self, element: &str, condition: &Condition) -> ViewResult<usize> {
        let mut count = 0;
        for block in self.blocks()? {
            if block.get_element(element)?.is(condition) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Poll until the number of blocks whose `element` satisfies `condition`
    /// relates to `expected` by `comparison`
    pub fn should_have_matching_count(
        &self,
        element: &str,
        condition: &Condition,
        comparison: Comparison,
        expected: usize,
    ) -> ViewResult<usize> {
        let mut actual = 0;
        let (found, _) = Waiter::new(self.evaluator.wait_options()).poll(|| {
            actual = self.count_matching(element, condition)?;
            Ok::<_, ViewError>(comparison.holds(actual, expected).then_some(actual))
        })?;
        found.ok_or_else(|| {
            ViewError::verification(format!(
                "{}\nBlocks where element '{element}' is {condition} should be {comparison} {expected}\nExpected count: {expected}\nActual count: {actual}",
                self.context()
            ))
        })
    }

    /// Every row holds for its block. Kinds are validated first; every
    /// mismatching row is reported.
    pub fn matches_table(&self, rows: &[TableRow]) -> ViewResult<()> {
        let compiled = rows
            .iter()
            .map(|row| {
                let kind: FilterKind = row.kind.parse()?;
                Ok((row, kind.condition(&row.expected)?))
            })
            .collect::<ViewResult<Vec<_>>>()?;

        let options = self.evaluator.wait_options();
        let mut mismatches = Vec::new();
        for (i, (row, condition)) in compiled.iter().enumerate() {
            let block = self.nth_block(row.block)?;
            let handle = Self::element_of(&block, &row.element)?;
            if handle.wait_until(condition, &options) {
                continue;
            }
            let actual = handle.state().map_or_else(
                || "element not found".to_string(),
                |s| format!("text '{}'", s.text),
            );
            mismatches.push(format!(
                "Row {}: block {} element '{}' should be {condition}; actual: {actual}",
                i + 1,
                row.block,
                row.element
            ));
        }
        if mismatches.is_empty() {
            return Ok(());
        }
        Err(ViewError::verification(format!(
            "{}\nTable rows not matched: {} of {}\n{}",
            self.context(),
            mismatches.len(),
            rows.len(),
            mismatches.join("\n")
        )))
    }
}
