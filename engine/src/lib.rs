//! # Stockpile Engine
//!
//! Snapshot codec and reconciliation engine for a key-value backed shop
//! admin.
//!
//! The application keeps its state (products, orders, users, settings, ...)
//! as JSON values in a key-value store. This crate turns any number of
//! those named record collections into one portable text document, and
//! merges such a document back into the store.
//!
//! ## Design Principles
//!
//! - **No IO**: the store is injected through [`KeyValueStore`]
//! - **Tolerant decoding**: a corrupt section is skipped, never fatal
//! - **Generic**: records are flat maps of values; no domain knowledge
//!
//! ## Document Format
//!
//! ```text
//! # products
//! id,name,price
//! 1,Widget,9.99
//! 2,"Gadget, Deluxe",19.5
//!
//! # orders
//! id,total,paid
//! 100,9.99,true
//! ```
//!
//! Each section is a `# name` line, a header line and one line per record.
//! Sections are separated by one blank line. Cells containing a comma, a
//! quote or a line break are quoted, with inner quotes doubled. Decoding
//! classifies each cell as structured JSON, boolean, number or string, in
//! that order; a typed header (`price:number`) pins the type per column.
//!
//! ## Quick Start
//!
//! ```rust
//! use stockpile_engine::{snapshot, EncodeOptions, MemoryStore, MergeStrategy};
//! use serde_json::json;
//!
//! let source = MemoryStore::new()
//!     .with_entry("products", json!([{"id": 1, "name": "Widget", "price": 9.99}]))
//!     .with_entry("users", json!([{"id": 7, "email": "a@example.com"}]));
//!
//! // Export an allow-list of collections
//! let text = snapshot::export(&source, &["products", "users"], &EncodeOptions::default()).unwrap();
//! assert!(text.starts_with("# products\nid,name,price\n1,Widget,9.99"));
//!
//! // Import into another store
//! let mut target = MemoryStore::new();
//! let report = snapshot::import(&mut target, &text, MergeStrategy::Concatenate).unwrap();
//! assert_eq!(report.sections_imported, 2);
//! assert_eq!(target, source);
//! ```
//!
//! ## Merge Strategies
//!
//! - [`MergeStrategy::Concatenate`] - imported records first, then stored (default)
//! - [`MergeStrategy::ReplaceById`] - replace stored records sharing a key
//! - [`MergeStrategy::ReplaceCollection`] - imported records replace stored
//!
//! ## FFI
//!
//! The [`ffi`] module exposes export, backup and import over an in-memory
//! store to host applications through a C ABI.

pub mod document;
pub mod error;
pub mod ffi;
pub mod reconcile;
pub mod record;
pub mod row;
pub mod schema;
pub mod section;
pub mod selector;
pub mod snapshot;
pub mod store;
pub mod value;

// Re-export main types at crate root
pub use document::{encode_document, Document, DocumentSummary};
pub use error::Error;
pub use reconcile::{merge_section, ImportReport, MergeStrategy, Reconciler, SectionFailure};
pub use record::{Collection, Record};
pub use schema::{Column, FieldType, Header};
pub use section::{
    decode_section, encode_section, DecodedSection, EncodeOptions, SectionOutcome, SkipReason,
};
pub use selector::SnapshotSelector;
pub use store::{KeyValueStore, MemoryStore};
pub use value::Value;

/// Name of a stored collection (its store key).
pub type CollectionName = String;

/// Engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
