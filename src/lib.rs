//! Clinic product catalog kept in a single JSON file, with admin and viewer front ends.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub mod catalog;
pub mod error;

pub use catalog::{
    CATEGORIES, CatalogDocument, CatalogStore, CategorySummary, Product, ProductDraft, Role,
    Session, StoredDocument, UNIT_OPTIONS, ViewerRow, add_product, add_source, authenticate,
    delete_product, ensure_categories, list_categories, migrate_if_needed, products,
    sample_document, update_product, viewer_rows,
};
pub use error::{CatalogError, StoreError};

/// Environment variable naming the data file when `--data` is not given.
pub const DATA_FILE_ENV: &str = "CLINIC_DATA_FILE";
/// Data file used when neither `--data` nor the environment names one.
pub const DEFAULT_DATA_FILE: &str = "clinic_data.json";

const DEFAULT_LOG_FILTER: &str = "clinic_catalog=warn";

/// Resolve the data file: explicit flag, then `CLINIC_DATA_FILE`, then
/// `clinic_data.json` in the working directory.
pub fn resolve_data_path(flag: Option<PathBuf>) -> PathBuf {
    resolve_data_path_from(flag, env::var_os(DATA_FILE_ENV))
}

fn resolve_data_path_from(flag: Option<PathBuf>, env_value: Option<OsString>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    match env_value {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_DATA_FILE),
    }
}

/// Install the stderr log subscriber shared by the binaries. `RUST_LOG`
/// overrides the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
