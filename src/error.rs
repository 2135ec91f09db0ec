//! Error types for catalog operations and persistence.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Rejected catalog operations. The document is untouched when one of these
/// is returned.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A required text field was blank after trimming.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// The source is already registered.
    #[error("source '{0}' already exists")]
    AlreadyExists(String),

    /// Price was zero, negative, or not a finite number.
    #[error("price must be greater than 0 (got {0})")]
    InvalidPrice(f64),

    /// The index does not address a product in the category.
    #[error("no product at index {index} in category '{category}' ({len} products)")]
    IndexOutOfRange {
        category: String,
        index: usize,
        len: usize,
    },
}

/// Failures persisting the document. Never swallowed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serializing catalog document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
