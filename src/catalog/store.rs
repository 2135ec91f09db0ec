//! JSON file persistence for the catalog document.
//!
//! Reads never fail: a missing, unreadable, or unparsable file yields the
//! starter document so the admin and viewer stay usable. Writes always
//! replace the whole file and report every failure.
//!
//! There is no locking. Two load → modify → save cycles racing on the same
//! file end with the second save winning at whole-document granularity.

use crate::catalog::{CatalogDocument, StoredDocument, migrate_if_needed};
use crate::error::StoreError;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

const UTF8_BOM: char = '\u{feff}';

#[derive(Clone, Debug)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document as stored, legacy categories included.
    pub fn load_raw(&self) -> StoredDocument {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "catalog file not found; using starter document");
                return StoredDocument::starter();
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "catalog file unreadable; using starter document");
                return StoredDocument::starter();
            }
        };

        match serde_json::from_str(data.trim_start_matches(UTF8_BOM)) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "catalog file corrupt; using starter document");
                StoredDocument::starter()
            }
        }
    }

    /// Read and migrate the document into its canonical shape.
    pub fn load(&self) -> CatalogDocument {
        migrate_if_needed(self.load_raw())
    }

    /// Replace the file with `doc`.
    ///
    /// Output is two-space indented UTF-8 with non-ASCII text written
    /// literally. The content goes to a sibling temp file first and is then
    /// renamed over the target, so readers never observe a partial write.
    pub fn save(&self, doc: &CatalogDocument) -> Result<(), StoreError> {
        let mut rendered = render(doc)?;
        rendered.push('\n');

        let write_err = |source: io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        // Rename onto the file a symlink points at, not over the link.
        let target = fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(rendered.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        if let Ok(meta) = fs::metadata(&target) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(write_err)?;
        }
        tmp.persist(&target).map_err(|err| write_err(err.error))?;

        info!(path = %self.path.display(), bytes = rendered.len(), "catalog saved");
        Ok(())
    }
}

/// Serialize `doc` exactly as `save` writes it, minus the trailing newline.
pub fn render(doc: &CatalogDocument) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(doc)?)
}
