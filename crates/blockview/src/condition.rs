//! Element conditions evaluated against [`ElementState`] snapshots.
//!
//! Text conditions compare whitespace-normalized text case-insensitively;
//! value, attribute and CSS conditions compare exactly.

use crate::document::ElementState;
use crate::result::{ViewError, ViewResult};
use regex::Regex;
use std::fmt;

/// Background colour that marks a control as disabled by styling only
pub const PSEUDO_DISABLED_BACKGROUND: &str = "rgba(240, 242, 245, 1)";

/// A boolean predicate over an element's current state
#[derive(Debug, Clone)]
pub enum Condition {
    /// Element exists in the document
    Exists,
    /// Element does not exist
    Absent,
    /// Element exists and is displayed
    Visible,
    /// Element is absent or not displayed
    Hidden,
    /// Whole text equals the expected text
    ExactText(String),
    /// Text contains the expected text
    ContainsText(String),
    /// Text has a match for the pattern
    MatchesText(Regex),
    /// Form value equals the expected value
    ExactValue(String),
    /// Form value contains the expected value
    ContainsValue(String),
    /// Attribute is present, optionally with an exact value
    Attribute {
        /// Attribute name
        name: String,
        /// Required value, any value when `None`
        value: Option<String>,
    },
    /// Attribute value has a match for the pattern
    AttributeMatching {
        /// Attribute name
        name: String,
        /// Pattern searched in the value
        pattern: Regex,
    },
    /// Computed CSS property equals the expected value
    CssValue {
        /// Property name
        name: String,
        /// Expected value
        value: String,
    },
    /// Element exists and is enabled
    Enabled,
    /// Element exists and is disabled
    Disabled,
    /// Element exists with empty text and empty value
    Empty,
    /// Element exists and has focus
    Focused,
    /// Element exists and is read-only
    ReadOnly,
    /// Element is an image that finished loading
    ImageLoaded,
    /// Negation
    Not(Box<Condition>),
    /// Holds when any of the inner conditions holds
    AnyOf {
        /// Description used in diagnostics
        description: String,
        /// Alternatives
        conditions: Vec<Condition>,
    },
}

impl Condition {
    /// Text pattern condition
    pub fn matches_text(pattern: &str) -> ViewResult<Self> {
        Ok(Self::MatchesText(compile(pattern)?))
    }

    /// Attribute pattern condition
    pub fn attribute_matching(name: impl Into<String>, pattern: &str) -> ViewResult<Self> {
        Ok(Self::AttributeMatching {
            name: name.into(),
            pattern: compile(pattern)?,
        })
    }

    /// Attribute presence (`value == None`) or exact value
    #[must_use]
    pub fn attribute(name: impl Into<String>, value: Option<&str>) -> Self {
        Self::Attribute {
            name: name.into(),
            value: value.map(str::to_string),
        }
    }

    /// CSS property equality
    #[must_use]
    pub fn css(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::CssValue {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Negate a condition
    #[must_use]
    pub fn not(condition: Self) -> Self {
        Self::Not(Box::new(condition))
    }

    /// Disjunction of conditions
    #[must_use]
    pub fn any_of(description: impl Into<String>, conditions: Vec<Self>) -> Self {
        Self::AnyOf {
            description: description.into(),
            conditions,
        }
    }

    /// Text, value or `title` attribute equals `expected`
    #[must_use]
    pub fn text_equals(expected: &str) -> Self {
        Self::any_of(
            format!("text equals '{expected}'"),
            vec![
                Self::ExactText(expected.to_string()),
                Self::ExactValue(expected.to_string()),
                Self::attribute("title", Some(expected)),
            ],
        )
    }

    /// Text or value contains `expected`, or `title` equals it
    #[must_use]
    pub fn text_contains(expected: &str) -> Self {
        Self::any_of(
            format!("text contains '{expected}'"),
            vec![
                Self::ContainsText(expected.to_string()),
                Self::ContainsValue(expected.to_string()),
                Self::attribute("title", Some(expected)),
            ],
        )
    }

    /// Text, `value` or `title` attribute matches `pattern`
    pub fn text_matches(pattern: &str) -> ViewResult<Self> {
        Ok(Self::any_of(
            format!("text matches '{pattern}'"),
            vec![
                Self::matches_text(pattern)?,
                Self::attribute_matching("value", pattern)?,
                Self::attribute_matching("title", pattern)?,
            ],
        ))
    }

    /// Evaluate against a snapshot, `None` meaning the element is absent
    #[must_use]
    pub fn evaluate(&self, state: Option<&ElementState>) -> bool {
        match self {
            Self::Exists => state.is_some(),
            Self::Absent => state.is_none(),
            Self::Hidden => state.map_or(true, |s| !s.visible),
            Self::Not(inner) => !inner.evaluate(state),
            Self::AnyOf { conditions, .. } => conditions.iter().any(|c| c.evaluate(state)),
            _ => state.is_some_and(|s| self.evaluate_present(s)),
        }
    }

    fn evaluate_present(&self, s: &ElementState) -> bool {
        match self {
            Self::Visible => s.visible,
            Self::ExactText(expected) => normalize(&s.text) == normalize(expected),
            Self::ContainsText(expected) => normalize(&s.text).contains(&normalize(expected)),
            Self::MatchesText(pattern) => pattern.is_match(&s.text),
            Self::ExactValue(expected) => s.value.as_deref() == Some(expected.as_str()),
            Self::ContainsValue(expected) => s
                .value
                .as_deref()
                .is_some_and(|v| v.contains(expected.as_str())),
            Self::Attribute { name, value } => match (s.attribute(name), value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            },
            Self::AttributeMatching { name, pattern } => {
                s.attribute(name).is_some_and(|v| pattern.is_match(v))
            }
            Self::CssValue { name, value } => s.css.get(name).is_some_and(|v| v == value),
            Self::Enabled => s.enabled,
            Self::Disabled => !s.enabled,
            Self::Empty => s.text.trim().is_empty() && s.value.as_deref().unwrap_or("").is_empty(),
            Self::Focused => s.focused,
            Self::ReadOnly => s.readonly,
            Self::ImageLoaded => s.tag == "img" && s.image_loaded,
            Self::Exists => true,
            Self::Absent
            | Self::Hidden
            | Self::Not(_)
            | Self::AnyOf { .. } => self.evaluate(Some(s)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exists => write!(f, "exist"),
            Self::Absent => write!(f, "absent"),
            Self::Visible => write!(f, "visible"),
            Self::Hidden => write!(f, "hidden"),
            Self::ExactText(t) => write!(f, "exact text '{t}'"),
            Self::ContainsText(t) => write!(f, "text '{t}'"),
            Self::MatchesText(p) => write!(f, "match text '{p}'"),
            Self::ExactValue(v) => write!(f, "exact value '{v}'"),
            Self::ContainsValue(v) => write!(f, "value '{v}'"),
            Self::Attribute { name, value: None } => write!(f, "attribute {name}"),
            Self::Attribute {
                name,
                value: Some(v),
            } => write!(f, "attribute {name}=\"{v}\""),
            Self::AttributeMatching { name, pattern } => {
                write!(f, "attribute {name} matching '{pattern}'")
            }
            Self::CssValue { name, value } => write!(f, "css {name}=\"{value}\""),
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
            Self::Empty => write!(f, "empty"),
            Self::Focused => write!(f, "focused"),
            Self::ReadOnly => write!(f, "readonly"),
            Self::ImageLoaded => write!(f, "loaded image"),
            Self::Not(inner) => write!(f, "not {inner}"),
            Self::AnyOf { description, .. } => write!(f, "{description}"),
        }
    }
}

fn compile(pattern: &str) -> ViewResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| ViewError::config(format!("invalid regular expression '{pattern}': {e}")))
}

/// Collapse whitespace runs and lower-case
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
