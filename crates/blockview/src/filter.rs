//! Block-list condition kinds.
//!
//! A filter row names an element of each block, a condition kind and an
//! expected value, e.g. `("Price", "has-css", "color;red")`.

use crate::condition::{Condition, PSEUDO_DISABLED_BACKGROUND};
use crate::result::{ViewError, ViewResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported condition kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Text, value or title equals
    Equals,
    /// Text or value contains, or title equals
    Contains,
    /// Text, value or title matches a regular expression
    Matches,
    /// Negation of [`FilterKind::Contains`]
    NotContains,
    /// CSS property, expected as `name;value`
    HasCss,
    /// Attribute, expected as `name` or `name;value`
    HasAttribute,
    /// Displayed
    Visible,
    /// Not displayed or absent
    Hidden,
    /// Not in the document
    Absent,
    /// Loaded image
    ImageLoaded,
    /// Enabled
    Enabled,
    /// Disabled
    Disabled,
    /// Styled as disabled through its background color
    PseudoDisabled,
    /// Not styled as disabled
    NotPseudoDisabled,
    /// No text and no value
    Empty,
    /// Has text or a value
    NotEmpty,
    /// Has focus
    Focused,
    /// Read-only
    ReadOnly,
}

impl FilterKind {
    /// Every kind with its canonical name
    pub const ALL: [(Self, &'static str); 18] = [
        (Self::Equals, "equals"),
        (Self::Contains, "contains"),
        (Self::Matches, "matches"),
        (Self::NotContains, "not-contains"),
        (Self::HasCss, "has-css"),
        (Self::HasAttribute, "has-attribute"),
        (Self::Visible, "visible"),
        (Self::Hidden, "hidden"),
        (Self::Absent, "absent"),
        (Self::ImageLoaded, "image-loaded"),
        (Self::Enabled, "enabled"),
        (Self::Disabled, "disabled"),
        (Self::PseudoDisabled, "pseudo-disabled"),
        (Self::NotPseudoDisabled, "not-pseudo-disabled"),
        (Self::Empty, "empty"),
        (Self::NotEmpty, "not-empty"),
        (Self::Focused, "focused"),
        (Self::ReadOnly, "readonly"),
    ];

    /// Canonical name
    #[must_use]
    pub fn name(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or("unknown", |(_, name)| name)
    }

    /// Whether the element has to exist for a block to qualify.
    ///
    /// Kinds satisfied by absence skip the existence pre-check.
    #[must_use]
    pub const fn requires_presence(self) -> bool {
        !matches!(self, Self::Hidden | Self::Absent)
    }

    /// Condition for this kind and expected value
    pub fn condition(self, expected: &str) -> ViewResult<Condition> {
        let condition = match self {
            Self::Equals => Condition::text_equals(expected),
            Self::Contains => Condition::text_contains(expected),
            Self::Matches => Condition::text_matches(expected)?,
            Self::NotContains => Condition::not(Condition::text_contains(expected)),
            Self::HasCss => {
                let (name, value) = expected.split_once(';').ok_or_else(|| {
                    ViewError::config(format!("has-css expects 'name;value', got '{expected}'"))
                })?;
                Condition::css(name.trim(), value.trim())
            }
            Self::HasAttribute => match expected.split_once(';') {
                Some((name, value)) => Condition::attribute(name.trim(), Some(value.trim())),
                None => Condition::attribute(expected.trim(), None),
            },
            Self::Visible => Condition::Visible,
            Self::Hidden => Condition::Hidden,
            Self::Absent => Condition::Absent,
            Self::ImageLoaded => Condition::ImageLoaded,
            Self::Enabled => Condition::Enabled,
            Self::Disabled => Condition::Disabled,
            Self::PseudoDisabled => Condition::css("background-color", PSEUDO_DISABLED_BACKGROUND),
            Self::NotPseudoDisabled => {
                Condition::not(Condition::css("background-color", PSEUDO_DISABLED_BACKGROUND))
            }
            Self::Empty => Condition::Empty,
            Self::NotEmpty => Condition::not(Condition::Empty),
            Self::Focused => Condition::Focused,
            Self::ReadOnly => Condition::ReadOnly,
        };
        Ok(condition)
    }
}

impl FromStr for FilterKind {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = s.trim().to_lowercase().replace(['_', ' '], "-");
        let folded = match folded.as_str() {
            "equal" | "text-equals" => "equals",
            "contain" | "text-contains" => "contains",
            "match" | "regexp" | "matches-regex" => "matches",
            "not-contain" => "not-contains",
            "has-css-property" | "css" => "has-css",
            "attribute" => "has-attribute",
            "exists-not" | "not-exists" => "absent",
            "image" | "is-image-and-loaded" => "image-loaded",
            "read-only" => "readonly",
            other => other,
        }
        .to_string();
        Self::ALL
            .iter()
            .find(|(_, name)| *name == folded)
            .map(|(kind, _)| *kind)
            .ok_or_else(|| ViewError::UnknownCondition { kind: s.to_string() })
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One `(element, kind, expected)` filter row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTriple {
    /// Element name within each block
    pub element: String,
    /// Condition kind, e.g. `equals`
    pub kind: String,
    /// Expected value; ignored by kinds that take none
    #[serde(default)]
    pub expected: String,
}

impl FilterTriple {
    /// New row
    #[must_use]
    pub fn new(element: impl Into<String>, kind: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            kind: kind.into(),
            expected: expected.into(),
        }
    }

    /// Parse the kind and build the condition
    pub fn compile(&self) -> ViewResult<(FilterKind, Condition)> {
        let kind: FilterKind = self.kind.parse()?;
        Ok((kind, kind.condition(&self.expected)?))
    }
}

impl fmt::Display for FilterTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' {} '{}'", self.element, self.kind, self.expected)
    }
}

impl<E, K, V> From<(E, K, V)> for FilterTriple
where
    E: Into<String>,
    K: Into<String>,
    V: Into<String>,
{
    fn from((element, kind, expected): (E, K, V)) -> Self {
        Self::new(element, kind, expected)
    }
}
