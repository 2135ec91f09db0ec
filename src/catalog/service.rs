//! In-memory catalog operations.
//!
//! Every mutator validates first and only then touches the document, so an
//! `Err` always leaves `doc` exactly as it was. Products are addressed by
//! `(category, index)`; an index taken from an older snapshot may point at a
//! different record or be out of range after another writer saved.

use crate::catalog::migrate::{base_id, unique_id};
use crate::catalog::{CATEGORIES, CatalogDocument, Product, ProductDraft};
use crate::error::CatalogError;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

/// `date_added` format.
pub const DATE_ADDED_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Timestamp suffix format for generated ids (microsecond resolution).
pub const ID_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%6f";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub count: usize,
}

/// The fixed categories in display order, with their product counts.
pub fn list_categories(doc: &CatalogDocument) -> Vec<CategorySummary> {
    CATEGORIES
        .iter()
        .map(|name| CategorySummary {
            name: name.to_string(),
            count: products(doc, name).len(),
        })
        .collect()
}

/// Products of `category`; an absent category reads as empty.
pub fn products<'a>(doc: &'a CatalogDocument, category: &str) -> &'a [Product] {
    doc.products.get(category).map(Vec::as_slice).unwrap_or(&[])
}

/// Give every fixed category an entry, empty if it had none. Returns the
/// number of categories added.
pub fn ensure_categories(doc: &mut CatalogDocument) -> usize {
    let mut added = 0;
    for name in CATEGORIES {
        if !doc.products.contains_key(name) {
            doc.products.insert(name.to_string(), Vec::new());
            added += 1;
        }
    }
    if added > 0 {
        info!(added, "seeded empty categories");
    }
    added
}

/// Register a new source at the end of the list.
pub fn add_source(doc: &mut CatalogDocument, name: &str) -> Result<(), CatalogError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::Empty { field: "source" });
    }
    if doc.sources.iter().any(|existing| existing == name) {
        return Err(CatalogError::AlreadyExists(name.to_string()));
    }
    doc.sources.push(name.to_string());
    info!(source = %name, "source added");
    Ok(())
}

/// Append a new product to `category`, creating the category if needed.
///
/// The id is `{base}_{timestamp}` where `base` follows the migration rule;
/// a counter suffix is added if that still collides.
pub fn add_product<'a>(
    doc: &'a mut CatalogDocument,
    category: &str,
    draft: ProductDraft,
    now: NaiveDateTime,
) -> Result<&'a Product, CatalogError> {
    let draft = validate(draft)?;

    let list = doc.products.entry(category.to_string()).or_default();
    let taken: HashSet<String> = list.iter().map(|p| p.id.clone()).collect();
    let base = format!(
        "{}_{}",
        base_id(&draft.name, draft.is_genuine),
        now.format(ID_TIMESTAMP_FORMAT)
    );
    let id = unique_id(base, &taken);

    info!(category = %category, id = %id, "product added");
    list.push(Product {
        id,
        name: draft.name,
        source: draft.source,
        is_genuine: draft.is_genuine,
        price: draft.price,
        unit: draft.unit,
        date_added: now.format(DATE_ADDED_FORMAT).to_string(),
    });
    let index = list.len() - 1;
    Ok(&list[index])
}

/// Replace the product at `index`, keeping its `id` and `date_added`.
///
/// A source not yet registered is appended to `sources` first.
pub fn update_product<'a>(
    doc: &'a mut CatalogDocument,
    category: &str,
    index: usize,
    draft: ProductDraft,
) -> Result<&'a Product, CatalogError> {
    let draft = validate(draft)?;
    check_index(doc, category, index)?;

    if !doc.sources.contains(&draft.source) {
        info!(source = %draft.source, "registering source from product update");
        doc.sources.push(draft.source.clone());
    }

    let list = doc
        .products
        .get_mut(category)
        .ok_or_else(|| out_of_range(category, index, 0))?;
    let len = list.len();
    let slot = list
        .get_mut(index)
        .ok_or_else(|| out_of_range(category, index, len))?;
    let id = std::mem::take(&mut slot.id);
    let date_added = std::mem::take(&mut slot.date_added);
    *slot = Product {
        id,
        name: draft.name,
        source: draft.source,
        is_genuine: draft.is_genuine,
        price: draft.price,
        unit: draft.unit,
        date_added,
    };
    info!(category = %category, index, id = %slot.id, "product updated");
    Ok(slot)
}

/// Remove and return the product at `index`.
pub fn delete_product(
    doc: &mut CatalogDocument,
    category: &str,
    index: usize,
) -> Result<Product, CatalogError> {
    check_index(doc, category, index)?;
    let list = doc
        .products
        .get_mut(category)
        .ok_or_else(|| out_of_range(category, index, 0))?;
    let removed = list.remove(index);
    info!(category = %category, index, id = %removed.id, "product deleted");
    Ok(removed)
}

fn validate(draft: ProductDraft) -> Result<ProductDraft, CatalogError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(CatalogError::Empty { field: "name" });
    }
    let source = draft.source.trim();
    if source.is_empty() {
        return Err(CatalogError::Empty { field: "source" });
    }
    if !draft.price.is_finite() || draft.price <= 0.0 {
        return Err(CatalogError::InvalidPrice(draft.price));
    }
    let price = round_cents(draft.price);
    if !price.is_finite() || price <= 0.0 {
        return Err(CatalogError::InvalidPrice(draft.price));
    }
    let unit = draft.unit.trim();
    if unit.is_empty() {
        return Err(CatalogError::Empty { field: "unit" });
    }

    Ok(ProductDraft {
        name: name.to_string(),
        source: source.to_string(),
        is_genuine: draft.is_genuine,
        price,
        unit: unit.to_string(),
    })
}

/// Rounds to two decimals. Magnitudes too large to scale by 100 have no
/// fractional cents and pass through unchanged.
fn round_cents(price: f64) -> f64 {
    let cents = price * 100.0;
    if cents.is_finite() {
        cents.round() / 100.0
    } else {
        price
    }
}

fn check_index(doc: &CatalogDocument, category: &str, index: usize) -> Result<(), CatalogError> {
    let len = products(doc, category).len();
    if index < len {
        Ok(())
    } else {
        Err(out_of_range(category, index, len))
    }
}

fn out_of_range(category: &str, index: usize, len: usize) -> CatalogError {
    CatalogError::IndexOutOfRange {
        category: category.to_string(),
        index,
        len,
    }
}
