//! Live block lists.
//!
//! A [`LiveBlockCollection`] is a read-only projection of a repeated document
//! region. It caches nothing: its size is read from the document on every
//! call, and every access builds fresh [`View`]s rooted at the current
//! matches. Two reads may disagree when the document changed in between.

use crate::check::ConditionEvaluator;
use crate::document::ElementCollection;
use crate::element::BlockFactory;
use crate::result::{ViewError, ViewResult};
use crate::view::{View, MAX_NESTING_DEPTH};
use crate::wait::{WaitOptions, Waiter};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// =============================================================================
// COMPARISON
// =============================================================================

/// Comparison between an actual and an expected count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `>=`
    GreaterOrEqual,
    /// `<=`
    LessOrEqual,
}

impl Comparison {
    /// Whether `actual` relates to `expected` this way
    #[must_use]
    pub const fn holds(self, actual: usize, expected: usize) -> bool {
        match self {
            Self::Equal => actual == expected,
            Self::NotEqual => actual != expected,
            Self::Greater => actual > expected,
            Self::Less => actual < expected,
            Self::GreaterOrEqual => actual >= expected,
            Self::LessOrEqual => actual <= expected,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Equal => "equal",
            Self::NotEqual => "not equal",
            Self::Greater => "greater",
            Self::Less => "less",
            Self::GreaterOrEqual => "greater or equal",
            Self::LessOrEqual => "less or equal",
        };
        f.write_str(text)
    }
}

impl FromStr for Comparison {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        match folded.as_str() {
            "equal" | "equals" | "==" | "=" => Ok(Self::Equal),
            "not equal" | "!=" => Ok(Self::NotEqual),
            "greater" | "greater than" | "more" | ">" => Ok(Self::Greater),
            "less" | "less than" | "fewer" | "<" => Ok(Self::Less),
            "greater or equal" | ">=" => Ok(Self::GreaterOrEqual),
            "less or equal" | "<=" => Ok(Self::LessOrEqual),
            _ => Err(ViewError::config(format!("unknown comparison '{s}'"))),
        }
    }
}

// =============================================================================
// LIVE BLOCK COLLECTION
// =============================================================================

/// Read-only, non-cached list of blocks
#[derive(Clone)]
pub struct LiveBlockCollection {
    name: String,
    roots: ElementCollection,
    factory: BlockFactory,
    block_type: String,
    depth: usize,
}

impl fmt::Debug for LiveBlockCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveBlockCollection")
            .field("name", &self.name)
            .field("roots", &self.roots)
            .field("block_type", &self.block_type)
            .finish_non_exhaustive()
    }
}

/// Structural equality: same list, same roots, same block type
impl PartialEq for LiveBlockCollection {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.roots == other.roots
            && self.block_type == other.block_type
            && self.depth == other.depth
    }
}

impl LiveBlockCollection {
    /// Blocks built by `factory` at every match of `roots`
    #[must_use]
    pub fn new(name: impl Into<String>, roots: ElementCollection, factory: BlockFactory, depth: usize) -> Self {
        let block_type = factory().view_name();
        Self {
            name: name.into(),
            roots,
            factory,
            block_type,
            depth,
        }
    }

    /// List name, as declared on the owning view
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the block type
    #[must_use]
    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    /// Underlying root handles
    #[must_use]
    pub fn roots(&self) -> &ElementCollection {
        &self.roots
    }

    /// Current number of blocks. No view is built.
    #[must_use]
    pub fn size(&self) -> usize {
        self.roots.size()
    }

    /// Whether there are currently no blocks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    fn build(&self, index: usize) -> ViewResult<View> {
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ViewError::NestingTooDeep {
                view: self.block_type.clone(),
                element: self.name.clone(),
                max_depth: MAX_NESTING_DEPTH,
            });
        }
        View::nested((self.factory)(), self.roots.get(index), self.depth)
    }

    /// Freshly built block at zero-based `index`.
    ///
    /// Every call builds a new view; two calls return distinct views that
    /// compare equal while the document is unchanged. An index past the
    /// current end fails with the 1-based block number.
    pub fn get(&self, index: usize) -> ViewResult<View> {
        let size = self.size();
        if index >= size {
            return Err(ViewError::OutOfRange {
                requested: index + 1,
                size,
            });
        }
        self.build(index)
    }

    /// Build each current block in document order
    pub fn iter(&self) -> impl Iterator<Item = ViewResult<View>> + '_ {
        (0..self.size()).map(move |i| self.build(i))
    }

    /// Every current block
    pub fn snapshot(&self) -> ViewResult<Vec<View>> {
        self.iter().collect()
    }

    /// Always fails: the collection is a projection of the document
    pub fn insert(&self, _index: usize, _block: View) -> ViewResult<()> {
        Err(ViewError::ReadOnly { operation: "insert" })
    }

    /// Always fails: the collection is a projection of the document
    pub fn remove(&self, _index: usize) -> ViewResult<View> {
        Err(ViewError::ReadOnly { operation: "remove" })
    }

    /// Always fails: the collection is a projection of the document
    pub fn replace(&self, _index: usize, _block: View) -> ViewResult<View> {
        Err(ViewError::ReadOnly { operation: "replace" })
    }

    /// Always fails: the collection is a projection of the document
    pub fn sort_by<F>(&self, _compare: F) -> ViewResult<()>
    where
        F: FnMut(&View, &View) -> std::cmp::Ordering,
    {
        Err(ViewError::ReadOnly { operation: "sort" })
    }

    /// Always fails: the collection is a projection of the document
    pub fn clear(&self) -> ViewResult<()> {
        Err(ViewError::ReadOnly { operation: "clear" })
    }

    /// Poll until the size satisfies `comparison` against `expected`.
    ///
    /// Returns the size that satisfied it, or the last size observed when the
    /// window closed. A failure always spends the whole window.
    pub fn wait_for_size(&self, comparison: Comparison, expected: usize, options: &WaitOptions) -> Result<usize, usize> {
        let mut last = 0;
        let result = Waiter::new(*options).until(|| {
            last = self.size();
            comparison.holds(last, expected)
        });
        if result.success {
            Ok(last)
        } else {
            tracing::debug!(
                list = %self.name,
                %comparison,
                expected,
                actual = last,
                attempts = result.attempts,
                "block count not reached"
            );
            Err(last)
        }
    }

    /// Like [`wait_for_size`](Self::wait_for_size) with the evaluator's
    /// window, failing with a diagnostic
    pub fn should_have_size(
        &self,
        comparison: Comparison,
        expected: usize,
        evaluator: &ConditionEvaluator,
    ) -> ViewResult<usize> {
        self.wait_for_size(comparison, expected, &evaluator.wait_options())
            .map_err(|actual| {
                ViewError::verification(format!(
                    "Blocks list '{}' size should be {comparison} {expected}\nExpected count: {expected}\nActual count: {actual}",
                    self.name
                ))
            })
    }
}

impl fmt::Display for LiveBlockCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] at {}", self.name, self.block_type, self.roots)
    }
}

/// `Block N: <root>` line per block, numbered from 1
#[must_use]
pub fn describe_blocks(blocks: &[View]) -> String {
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| format!("Block {}: {}\n", i + 1, block.root()))
        .collect()
}

/// Wrap a [`Describable`](crate::view::Describable) type as a block factory
#[must_use]
pub fn factory<T>() -> BlockFactory
where
    T: crate::view::Describable + Default + 'static,
{
    Arc::new(|| Arc::new(T::default()) as Arc<dyn crate::view::Describable>)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::VerifyConfig;
    use crate::document::ElementHandle;
    use crate::element::ElementSpec;
    use crate::locator::Selector;
    use crate::mock::{MockDocument, MockNode};
    use crate::report::MemorySink;
    use crate::view::Describable;
    use proptest::prelude::*;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct Item;

    impl Describable for Item {
        fn describe_elements(&self) -> Vec<ElementSpec> {
            vec![ElementSpec::element("Name", Selector::css(".name"))]
        }
    }

    fn list_of(names: &[&str]) -> (Arc<MockDocument>, LiveBlockCollection) {
        let doc = MockDocument::new();
        let list = doc.append(doc.root(), MockNode::new("ul"));
        for name in names {
            let row = doc.append(list, MockNode::new("li").class("item"));
            let _ = doc.append(row, MockNode::new("span").class("name").text(*name));
        }
        let roots = ElementHandle::document_root(doc.clone()).find_all(Selector::css("li.item"));
        (doc, LiveBlockCollection::new("Items", roots, factory::<Item>(), 1))
    }

    fn evaluator(timeout_ms: u64) -> ConditionEvaluator {
        let config = VerifyConfig::new()
            .with_timeout_ms(timeout_ms)
            .with_polling_interval_ms(10);
        ConditionEvaluator::new(Arc::new(config), Arc::new(MemorySink::new()))
    }

    mod comparison_tests {
        use super::*;

        #[test]
        fn test_parse_words_and_symbols() {
            assert_eq!("greater or equal".parse::<Comparison>().unwrap(), Comparison::GreaterOrEqual);
            assert_eq!("Not  Equal".parse::<Comparison>().unwrap(), Comparison::NotEqual);
            assert_eq!("<".parse::<Comparison>().unwrap(), Comparison::Less);
            assert!("about".parse::<Comparison>().is_err());
        }

        #[test]
        fn test_holds() {
            assert!(Comparison::Greater.holds(1, 0));
            assert!(!Comparison::Greater.holds(0, 0));
            assert!(Comparison::LessOrEqual.holds(3, 3));
        }

        proptest! {
            #[test]
            fn prop_display_round_trips(actual in 0usize..50, expected in 0usize..50) {
                for comparison in [
                    Comparison::Equal,
                    Comparison::NotEqual,
                    Comparison::Greater,
                    Comparison::Less,
                    Comparison::GreaterOrEqual,
                    Comparison::LessOrEqual,
                ] {
                    let parsed: Comparison = comparison.to_string().parse().unwrap();
                    prop_assert_eq!(parsed.holds(actual, expected), comparison.holds(actual, expected));
                }
            }

            #[test]
            fn prop_negations_disagree(actual in 0usize..50, expected in 0usize..50) {
                prop_assert_ne!(Comparison::Equal.holds(actual, expected), Comparison::NotEqual.holds(actual, expected));
                prop_assert_ne!(Comparison::Greater.holds(actual, expected), Comparison::LessOrEqual.holds(actual, expected));
                prop_assert_ne!(Comparison::Less.holds(actual, expected), Comparison::GreaterOrEqual.holds(actual, expected));
            }
        }
    }

    mod collection_tests {
        use super::*;

        #[test]
        fn test_get_builds_distinct_equal_views() {
            let (_doc, blocks) = list_of(&["Apple", "Pear"]);
            let first = blocks.get(0).unwrap();
            let again = blocks.get(0).unwrap();
            assert_eq!(first, again);
            assert!(!Arc::ptr_eq(first.description(), again.description()));
            assert_ne!(first, blocks.get(1).unwrap());
        }

        #[test]
        fn test_blocks_resolve_relative_to_their_root() {
            let (_doc, blocks) = list_of(&["Apple", "Pear"]);
            let second = blocks.get(1).unwrap();
            let name = second.get_element("Name").unwrap().state().unwrap();
            assert_eq!(name.text, "Pear");
        }

        #[test]
        fn test_size_is_live() {
            let (doc, blocks) = list_of(&["Apple"]);
            assert_eq!(blocks.size(), 1);
            let list = doc.find_first("ul").unwrap();
            let _ = doc.append(list, MockNode::new("li").class("item"));
            assert_eq!(blocks.size(), 2);
            assert_eq!(blocks.snapshot().unwrap().len(), 2);
        }

        #[test]
        fn test_get_out_of_range() {
            let (_doc, blocks) = list_of(&["Apple"]);
            let err = blocks.get(1).unwrap_err();
            assert!(matches!(err, ViewError::OutOfRange { requested: 2, size: 1 }));
        }

        #[test]
        fn test_mutators_are_read_only() {
            let (_doc, blocks) = list_of(&["Apple"]);
            let block = blocks.get(0).unwrap();
            assert!(matches!(blocks.insert(0, block.clone()), Err(ViewError::ReadOnly { .. })));
            assert!(matches!(blocks.remove(0), Err(ViewError::ReadOnly { .. })));
            assert!(matches!(blocks.replace(0, block), Err(ViewError::ReadOnly { .. })));
            assert!(matches!(blocks.sort_by(|_, _| std::cmp::Ordering::Equal), Err(ViewError::ReadOnly { .. })));
            assert!(matches!(blocks.clear(), Err(ViewError::ReadOnly { operation: "clear" })));
            assert_eq!(blocks.size(), 1);
        }
    }

    mod size_wait_tests {
        use super::*;

        #[test]
        fn test_empty_list_waits_full_window() {
            let (_doc, blocks) = list_of(&[]);
            let start = Instant::now();
            let err = blocks
                .should_have_size(Comparison::Greater, 0, &evaluator(150))
                .unwrap_err();
            assert!(start.elapsed() >= Duration::from_millis(150));
            let text = err.to_string();
            assert!(text.contains("greater"));
            assert!(text.contains("Actual count: 0"));
        }

        #[test]
        fn test_list_filled_concurrently() {
            let (doc, blocks) = list_of(&[]);
            let list = doc.find_first("ul").unwrap();
            let writer = std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(30));
                for _ in 0..3 {
                    let _ = doc.append(list, MockNode::new("li").class("item"));
                }
            });
            let size = blocks
                .should_have_size(Comparison::GreaterOrEqual, 3, &evaluator(2_000))
                .unwrap();
            writer.join().unwrap();
            assert_eq!(size, 3);
        }
    }

    #[test]
    fn test_describe_blocks() {
        let (_doc, blocks) = list_of(&["Apple", "Pear"]);
        let text = describe_blocks(&blocks.snapshot().unwrap());
        assert_eq!(text, "Block 1: By.css: li.item\nBlock 2: By.css: li.item[2]\n");
    }
}
