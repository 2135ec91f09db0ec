//! Clinic catalog document and the operations on it.
//!
//! `store` owns the JSON file on disk, `migrate` turns whatever the file held
//! into the canonical list shape, and `service` implements the product and
//! source operations against an in-memory document. Callers load once, run any
//! number of operations, then save once.

pub mod access;
mod lenient;
pub mod migrate;
pub mod model;
pub mod service;
pub mod store;
pub mod view;

pub use access::{Role, Session, authenticate};
pub use migrate::migrate_if_needed;
pub use model::{
    CatalogDocument, LegacyCategory, LegacyRecord, Product, ProductDraft, ProductList,
    STARTER_SOURCES, STARTER_USERS, StoredCategory, StoredDocument, sample_document,
};
pub use service::{
    CategorySummary, add_product, add_source, delete_product, ensure_categories,
    list_categories, products, update_product,
};
pub use store::CatalogStore;
pub use view::{ViewerRow, viewer_rows};

/// Categories offered by the clinic, in display order.
pub const CATEGORIES: [&str; 5] = ["填充", "水光", "溶脂", "肉毒", "生髮"];

/// Units offered in the product form. `Product::unit` itself is free text.
pub const UNIT_OPTIONS: [&str; 5] = ["per 支", "per 盒", "per part", "per ml", "per vial"];
