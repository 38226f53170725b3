//! Result and error types for blockview.

use thiserror::Error;

/// Result type for blockview operations
pub type ViewResult<T> = Result<T, ViewError>;

/// Broad class of a [`ViewError`].
///
/// Only [`ErrorCategory::Verification`] is ever aggregated across several
/// elements; every other category surfaces on the first occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad declarative setup or configuration
    Config,
    /// Unknown name or wrong accessor for an element kind
    Lookup,
    /// Index outside the current bounds of a live list
    Range,
    /// Mutation attempted on a read-only projection
    ReadOnly,
    /// A condition stayed false for the whole polling window
    Verification,
    /// Reading configuration or manifests failed
    Io,
}

/// Errors that can occur in blockview
#[derive(Debug, Error)]
pub enum ViewError {
    /// Several elements of one view share a name
    #[error("Found several elements with the same name in {view}\nDuplicates: {}", names.join(", "))]
    DuplicateNames {
        /// View type name
        view: String,
        /// Every duplicated name, sorted
        names: Vec<String>,
    },

    /// An element was declared with a shape the engine cannot use
    #[error("Element '{element}' in {view} must be a single element, an element collection, a block or a list of blocks; found type {found}")]
    UnsupportedShape {
        /// View type name
        view: String,
        /// Offending element name
        element: String,
        /// Declared type that was found
        found: String,
    },

    /// Block composition nests deeper than allowed (usually a cycle)
    #[error("Block '{element}' in {view} exceeds the maximum nesting depth of {max_depth}")]
    NestingTooDeep {
        /// View type name
        view: String,
        /// Block element that would exceed the limit
        element: String,
        /// Maximum allowed depth
        max_depth: usize,
    },

    /// Unrecognized block-list condition kind
    #[error("No implementation for condition: {kind}")]
    UnknownCondition {
        /// The unsupported condition string
        kind: String,
    },

    /// Invalid configuration or declarative input
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Element name not present in a view
    #[error("Element '{name}' is not described in {view}")]
    ElementNotDescribed {
        /// View type name
        view: String,
        /// Requested element name
        name: String,
    },

    /// Element exists but has a different kind than requested
    #[error("Element '{name}' in {view} is {actual}, expected {expected}")]
    KindMismatch {
        /// View type name
        view: String,
        /// Requested element name
        name: String,
        /// Kind required by the accessor
        expected: String,
        /// Kind of the described element
        actual: String,
    },

    /// No page has been opened in the scenario yet
    #[error("No current page is set in the scenario")]
    NoCurrentPage,

    /// Page name not registered
    #[error("Page '{name}' is not registered")]
    UnknownPage {
        /// Requested page name
        name: String,
    },

    /// Block number outside the current list bounds
    #[error("Block number must be in range [1..{size}], got: {requested}")]
    OutOfRange {
        /// Requested 1-based number
        requested: usize,
        /// List size at the moment of the call
        size: usize,
    },

    /// Mutation of a live block collection
    #[error("{operation} is not supported: block collections are read-only")]
    ReadOnly {
        /// Name of the rejected operation
        operation: &'static str,
    },

    /// Condition did not hold within the polling window
    #[error("Verification failed: {message}")]
    Verification {
        /// Full diagnostic
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ViewError {
    /// Create a verification failure
    #[must_use]
    pub fn verification(message: impl Into<String>) -> Self {
        Self::Verification {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Category of this error
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateNames { .. }
            | Self::UnsupportedShape { .. }
            | Self::NestingTooDeep { .. }
            | Self::UnknownCondition { .. }
            | Self::Config { .. }
            | Self::Yaml(_)
            | Self::Json(_) => ErrorCategory::Config,
            Self::ElementNotDescribed { .. }
            | Self::KindMismatch { .. }
            | Self::NoCurrentPage
            | Self::UnknownPage { .. } => ErrorCategory::Lookup,
            Self::OutOfRange { .. } => ErrorCategory::Range,
            Self::ReadOnly { .. } => ErrorCategory::ReadOnly,
            Self::Verification { .. } => ErrorCategory::Verification,
            Self::Io(_) => ErrorCategory::Io,
        }
    }

    /// Whether this is a verification failure
    #[must_use]
    pub const fn is_verification(&self) -> bool {
        matches!(self, Self::Verification { .. })
    }
}
