//! Error types for the Stockpile engine.

use crate::CollectionName;
use thiserror::Error;

/// All possible errors from the Stockpile engine.
///
/// Malformed input text is never an error: undecodable blocks are reported
/// as skipped sections and undecodable cells degrade to strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Encoding errors
    #[error("invalid collection name: {0:?}")]
    InvalidCollectionName(CollectionName),

    #[error("invalid field name {field:?} in collection '{collection}'")]
    InvalidFieldName {
        collection: CollectionName,
        field: String,
    },

    // Store errors
    #[error("store error: {0}")]
    Store(String),

    #[error("import incomplete: {imported} section(s) written, failed: {}: {message}", .failed.join(", "))]
    ImportIncomplete {
        imported: usize,
        failed: Vec<CollectionName>,
        message: String,
    },

    // Configuration errors
    #[error("invalid merge strategy: {0}")]
    InvalidStrategy(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
