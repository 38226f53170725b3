//! Locators: selectors and the scoped paths built from them.
//!
//! The engine never interprets selector syntax. A [`Selector`] is handed to the
//! [`DocumentProvider`](crate::document::DocumentProvider) as-is; a
//! [`LocatorPath`] records how an element handle was reached (scope chain plus
//! the position among matches at each step) so that the provider can
//! re-resolve it against the current document on every query.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "div.product")
    Css(String),
    /// XPath selector
    XPath(String),
    /// Text content selector
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::XPath(selector.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "By.css: {s}"),
            Self::XPath(s) => write!(f, "By.xpath: {s}"),
            Self::Text(t) => write!(f, "By.text: {t}"),
            Self::TestId(id) => write!(f, "By.testId: {id}"),
        }
    }
}

/// One step of a [`LocatorPath`]: the `nth` match of `selector` below the
/// previous step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathStep {
    /// Selector evaluated within the previous step
    pub selector: Selector,
    /// Zero-based position among the matches
    pub nth: usize,
}

/// Scope chain from the document root to one element.
///
/// The empty path is the document root itself. Displayed positions are
/// 1-based, like block numbers, and omitted for the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LocatorPath {
    steps: Vec<PathStep>,
}

impl LocatorPath {
    /// Path of the document root
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this is the document root
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps from the root, outermost first
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Extend the path by the `nth` match of `selector`
    #[must_use]
    pub fn child(&self, selector: Selector, nth: usize) -> Self {
        let mut steps = self.steps.clone();
        steps.push(PathStep { selector, nth });
        Self { steps }
    }
}

impl fmt::Display for LocatorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "html");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " >> ")?;
            }
            if step.nth == 0 {
                write!(f, "{}", step.selector)?;
            } else {
                write!(f, "{}[{}]", step.selector, step.nth + 1)?;
            }
        }
        Ok(())
    }
}
