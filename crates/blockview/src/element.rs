//! Element declarations and the descriptors discovery builds from them.
//!
//! A concrete view lists its elements as [`ElementSpec`]s. Discovery turns each
//! spec into an [`ElementDescriptor`]: the kind is derived from the declared
//! [`Shape`] and the mode from the markers.

use crate::blocks::LiveBlockCollection;
use crate::document::{ElementCollection, ElementHandle};
use crate::locator::Selector;
use crate::view::{Describable, View};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which accessor an element is reachable through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// One element handle
    SingleHandle,
    /// An ordered collection of element handles
    Collection,
    /// A nested block
    NestedView,
    /// A live list of blocks
    ViewList,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SingleHandle => "element",
            Self::Collection => "elements list",
            Self::NestedView => "block",
            Self::ViewList => "blocks list",
        };
        f.write_str(name)
    }
}

/// Visibility expectation used by the aggregate appearance checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementMode {
    /// Must appear whenever the mandatory check runs
    Mandatory,
    /// Must appear when the primary check runs
    #[default]
    Primary,
    /// Never checked for appearance
    Optional,
    /// Must be hidden or absent
    Hidden,
}

impl ElementMode {
    /// Every mode, in declaration order
    pub const ALL: [Self; 4] = [Self::Mandatory, Self::Primary, Self::Optional, Self::Hidden];
}

impl fmt::Display for ElementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mandatory => "mandatory",
            Self::Primary => "primary",
            Self::Optional => "optional",
            Self::Hidden => "hidden",
        };
        f.write_str(name)
    }
}

/// Constructs a fresh description for each block instance
pub type BlockFactory = Arc<dyn Fn() -> Arc<dyn Describable> + Send + Sync>;

/// Declared shape of an element
#[derive(Clone)]
pub enum Shape {
    /// A single element found by `selector`
    Element(Selector),
    /// Every element matching `selector`
    Elements(Selector),
    /// A nested block. Without a locator it shares the owner's root.
    Block {
        /// Root of the block relative to the owner
        locator: Option<Selector>,
        /// Block description
        factory: BlockFactory,
    },
    /// One block per element matching `locator`
    Blocks {
        /// Root of each block relative to the owner
        locator: Selector,
        /// Block description
        factory: BlockFactory,
    },
    /// A declaration discovery cannot classify
    Unsupported {
        /// Declared type, reported in the error
        type_name: String,
    },
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(s) => f.debug_tuple("Element").field(s).finish(),
            Self::Elements(s) => f.debug_tuple("Elements").field(s).finish(),
            Self::Block { locator, .. } => f
                .debug_struct("Block")
                .field("locator", locator)
                .finish_non_exhaustive(),
            Self::Blocks { locator, .. } => f
                .debug_struct("Blocks")
                .field("locator", locator)
                .finish_non_exhaustive(),
            Self::Unsupported { type_name } => f
                .debug_struct("Unsupported")
                .field("type_name", type_name)
                .finish(),
        }
    }
}

impl Shape {
    /// Kind this shape discovers as, or the offending type name
    pub fn kind(&self) -> Result<ElementKind, &str> {
        match self {
            Self::Element(_) => Ok(ElementKind::SingleHandle),
            Self::Elements(_) => Ok(ElementKind::Collection),
            Self::Block { .. } => Ok(ElementKind::NestedView),
            Self::Blocks { .. } => Ok(ElementKind::ViewList),
            Self::Unsupported { type_name } => Err(type_name),
        }
    }
}

/// Declarative mode markers. More than one may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Markers {
    /// Marked mandatory
    pub mandatory: bool,
    /// Marked optional
    pub optional: bool,
    /// Marked hidden
    pub hidden: bool,
}

impl Markers {
    /// Resolve to a mode: Mandatory > Optional > Hidden, otherwise Primary
    #[must_use]
    pub const fn mode(&self) -> ElementMode {
        if self.mandatory {
            ElementMode::Mandatory
        } else if self.optional {
            ElementMode::Optional
        } else if self.hidden {
            ElementMode::Hidden
        } else {
            ElementMode::Primary
        }
    }
}

/// One declared element of a view
#[derive(Debug, Clone)]
pub struct ElementSpec {
    /// Name, unique within the owning view
    pub name: String,
    /// Declared shape
    pub shape: Shape,
    /// Mode markers
    pub markers: Markers,
}

impl ElementSpec {
    /// Spec with an explicit shape and no markers
    #[must_use]
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            markers: Markers::default(),
        }
    }

    /// Single element
    #[must_use]
    pub fn element(name: impl Into<String>, selector: Selector) -> Self {
        Self::new(name, Shape::Element(selector))
    }

    /// Element collection
    #[must_use]
    pub fn elements(name: impl Into<String>, selector: Selector) -> Self {
        Self::new(name, Shape::Elements(selector))
    }

    /// Nested block of type `T` rooted at `selector`
    #[must_use]
    pub fn block<T>(name: impl Into<String>, selector: Selector) -> Self
    where
        T: Describable + Default + 'static,
    {
        Self::block_with(name, Some(selector), crate::blocks::factory::<T>())
    }

    /// Nested block of type `T` sharing the owner's root
    #[must_use]
    pub fn inline_block<T>(name: impl Into<String>) -> Self
    where
        T: Describable + Default + 'static,
    {
        Self::block_with(name, None, crate::blocks::factory::<T>())
    }

    /// Nested block with an explicit factory
    #[must_use]
    pub fn block_with(name: impl Into<String>, locator: Option<Selector>, factory: BlockFactory) -> Self {
        Self::new(name, Shape::Block { locator, factory })
    }

    /// Live list of blocks of type `T`, one per match of `selector`
    #[must_use]
    pub fn blocks<T>(name: impl Into<String>, selector: Selector) -> Self
    where
        T: Describable + Default + 'static,
    {
        Self::blocks_with(name, selector, crate::blocks::factory::<T>())
    }

    /// Live list of blocks with an explicit factory
    #[must_use]
    pub fn blocks_with(name: impl Into<String>, selector: Selector, factory: BlockFactory) -> Self {
        Self::new(
            name,
            Shape::Blocks {
                locator: selector,
                factory,
            },
        )
    }

    /// Declaration of a type discovery does not support
    #[must_use]
    pub fn unsupported(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(
            name,
            Shape::Unsupported {
                type_name: type_name.into(),
            },
        )
    }

    /// Add the mandatory marker
    #[must_use]
    pub const fn mandatory(mut self) -> Self {
        self.markers.mandatory = true;
        self
    }

    /// Add the optional marker
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.markers.optional = true;
        self
    }

    /// Add the hidden marker
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.markers.hidden = true;
        self
    }

    /// Resolved mode
    #[must_use]
    pub const fn mode(&self) -> ElementMode {
        self.markers.mode()
    }
}

/// What a descriptor resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum ElementTarget {
    /// Single handle
    Element(ElementHandle),
    /// Handle collection
    Collection(ElementCollection),
    /// Nested block
    Block(Box<View>),
    /// Live block list
    Blocks(LiveBlockCollection),
}

/// One discovered element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDescriptor {
    /// Name within the owning view
    pub name: String,
    /// Visibility expectation
    pub mode: ElementMode,
    /// Resolved target
    pub target: ElementTarget,
}

impl ElementDescriptor {
    /// Kind, derived from the target
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self.target {
            ElementTarget::Element(_) => ElementKind::SingleHandle,
            ElementTarget::Collection(_) => ElementKind::Collection,
            ElementTarget::Block(_) => ElementKind::NestedView,
            ElementTarget::Blocks(_) => ElementKind::ViewList,
        }
    }

    /// Whether the mode is one of `modes`
    #[must_use]
    pub fn has_mode(&self, modes: &[ElementMode]) -> bool {
        modes.contains(&self.mode)
    }

    /// Handle a visibility check runs against. Collections are checked
    /// through their first element; blocks through their root.
    #[must_use]
    pub fn check_handle(&self) -> ElementHandle {
        match &self.target {
            ElementTarget::Element(handle) => handle.clone(),
            ElementTarget::Collection(collection) => collection.first(),
            ElementTarget::Block(view) => view.root().clone(),
            ElementTarget::Blocks(blocks) => blocks.roots().first(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod markers_tests {
        use super::*;

        #[test]
        fn test_no_marker_is_primary() {
            assert_eq!(Markers::default().mode(), ElementMode::Primary);
        }

        #[test]
        fn test_precedence() {
            let all = Markers {
                mandatory: true,
                optional: true,
                hidden: true,
            };
            assert_eq!(all.mode(), ElementMode::Mandatory);

            let optional_hidden = Markers {
                mandatory: false,
                optional: true,
                hidden: true,
            };
            assert_eq!(optional_hidden.mode(), ElementMode::Optional);

            let hidden = Markers {
                hidden: true,
                ..Markers::default()
            };
            assert_eq!(hidden.mode(), ElementMode::Hidden);
        }

        #[test]
        fn test_builder_markers() {
            let spec = ElementSpec::element("title", Selector::css("h1"))
                .hidden()
                .mandatory();
            assert_eq!(spec.mode(), ElementMode::Mandatory);
        }
    }

    mod shape_tests {
        use super::*;

        #[test]
        fn test_kinds() {
            assert_eq!(
                Shape::Element(Selector::css("a")).kind(),
                Ok(ElementKind::SingleHandle)
            );
            assert_eq!(
                Shape::Elements(Selector::css("a")).kind(),
                Ok(ElementKind::Collection)
            );
            assert_eq!(
                Shape::Unsupported {
                    type_name: "HashMap<String, u8>".to_string()
                }
                .kind(),
                Err("HashMap<String, u8>")
            );
        }

        #[test]
        fn test_display() {
            assert_eq!(ElementKind::ViewList.to_string(), "blocks list");
            assert_eq!(ElementMode::Hidden.to_string(), "hidden");
        }
    }
}
