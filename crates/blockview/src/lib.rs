//! Blockview: declarative page and block verification.
//!
//! Pages and the repeating blocks inside them are described once, as ordered
//! element declarations. Discovery resolves every declaration against a live
//! document, and verification polls the document until elements appear,
//! disappear or match a condition, reporting every failure together.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     BLOCKVIEW Architecture                       │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐     │
//! │   │ Describable │───►│ View        │───►│ DocumentProvider │     │
//! │   │ / manifest  │    │ (discovery) │    │ (browser / mock) │     │
//! │   └─────────────┘    └──────┬──────┘    └──────────────────┘     │
//! │                             │                                    │
//! │          ┌──────────────────┼───────────────────┐                │
//! │          ▼                  ▼                   ▼                │
//! │   ┌─────────────┐    ┌─────────────┐    ┌──────────────┐         │
//! │   │ Appearance  │    │ Live block  │    │ Block list   │         │
//! │   │ checks      │    │ collections │    │ search/filter│         │
//! │   └──────┬──────┘    └─────────────┘    └──────────────┘         │
//! │          ▼                                                       │
//! │   ┌─────────────┐                                                │
//! │   │ Attachments │                                                │
//! │   └─────────────┘                                                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use blockview::mock::{MockDocument, MockNode};
//! use blockview::{Describable, ElementSpec, MemorySink, PageRegistry, Scenario, Selector, VerifyConfig};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Row;
//!
//! impl Describable for Row {
//!     fn describe_elements(&self) -> Vec<ElementSpec> {
//!         vec![ElementSpec::element("Name", Selector::css(".name"))]
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Cart;
//!
//! impl Describable for Cart {
//!     fn describe_elements(&self) -> Vec<ElementSpec> {
//!         vec![
//!             ElementSpec::element("Title", Selector::css("h1")).mandatory(),
//!             ElementSpec::blocks::<Row>("Rows", Selector::css("li")),
//!         ]
//!     }
//! }
//!
//! let doc = MockDocument::new();
//! let _ = doc.append(doc.root(), MockNode::new("h1").text("Cart"));
//! let row = doc.append(doc.root(), MockNode::new("li"));
//! let _ = doc.append(row, MockNode::new("span").class("name").text("Apple"));
//!
//! let config = VerifyConfig::new().with_timeout_ms(50).with_polling_interval_ms(10);
//! let mut scenario = Scenario::new(doc, Arc::new(config), Arc::new(MemorySink::new()))
//!     .with_pages(PageRegistry::new().with_page::<Cart>("Cart"));
//!
//! let page = scenario.open_page_appeared("Cart").unwrap();
//! assert_eq!(page.get_blocks_list("Rows").unwrap().len(), 1);
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Block-list search, filtering and list-wide checks
pub mod block_list;

/// Live block collections and count comparisons
pub mod blocks;

/// Condition checks and failure aggregation
pub mod check;

/// Condition primitives evaluated against element snapshots
pub mod condition;

/// Verification settings loaded from YAML, properties or the environment
pub mod config;

/// Document provider seam and element handles
pub mod document;

/// Element declarations, kinds and modes
pub mod element;

/// Filter condition kinds
pub mod filter;

/// Tracing subscriber setup
pub mod logging;

/// Selectors and locator paths
pub mod locator;

/// Views declared in YAML
pub mod manifest;

/// In-memory document for tests and demos
#[allow(clippy::missing_panics_doc)]
pub mod mock;

/// Verification attachments
pub mod report;

/// Error type
pub mod result;

/// Scenario context and page registry
pub mod scenario;

/// Pages, blocks and appearance checks
pub mod view;

/// Polling
pub mod wait;

pub use block_list::{BlockListContext, TableRow};
pub use blocks::{describe_blocks, Comparison, LiveBlockCollection};
pub use check::{ConditionCheck, ConditionEvaluator};
pub use condition::Condition;
pub use config::VerifyConfig;
pub use document::{DocumentProvider, ElementCollection, ElementHandle, ElementState};
pub use element::{
    BlockFactory, ElementDescriptor, ElementKind, ElementMode, ElementSpec, ElementTarget,
    Markers, Shape,
};
pub use filter::{FilterKind, FilterTriple};
pub use locator::{LocatorPath, Selector};
pub use manifest::{ManifestSet, ManifestView, ViewManifest};
pub use report::{Attachment, AttachmentSink, AttachmentStatus, MemorySink, TracingSink};
pub use result::{ErrorCategory, ViewError, ViewResult};
pub use scenario::{PageRegistry, Scenario};
pub use view::{Describable, View, MAX_NESTING_DEPTH};
pub use wait::{WaitOptions, WaitResult, Waiter};
