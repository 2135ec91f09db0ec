//! Legacy-shape migration and id synthesis.
//!
//! The only place that distinguishes the two category shapes. Everything
//! downstream sees a `CatalogDocument` whose categories are plain lists with
//! an `id` on every record.

use crate::catalog::{
    CatalogDocument, LegacyCategory, Product, ProductList, StoredCategory, StoredDocument,
};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// Normalize `doc` into the canonical list shape.
///
/// Legacy categories are rewritten in file order with synthesized ids.
/// Listed categories pass through untouched except for records missing an
/// id, so migrating an already-migrated document is a no-op.
pub fn migrate_if_needed(doc: StoredDocument) -> CatalogDocument {
    let products = doc
        .products
        .into_iter()
        .map(|(category, stored)| {
            let list = match stored {
                StoredCategory::Listed(list) => backfill_ids(&category, list),
                StoredCategory::Legacy(legacy) => {
                    debug!(
                        category = %category,
                        entries = legacy.0.len(),
                        "migrating legacy category"
                    );
                    migrate_legacy(legacy)
                }
                StoredCategory::Unreadable(value) => {
                    warn!(category = %category, value = %value, "category is not a list; starting it empty");
                    ProductList::new()
                }
            };
            (category, list)
        })
        .collect();

    CatalogDocument {
        products,
        sources: dedup_sources(doc.sources),
        users: doc.users,
    }
}

/// `{lowercased name, spaces as underscores}{_g|_ng}`.
pub fn base_id(name: &str, is_genuine: bool) -> String {
    let normalized = name.trim().to_lowercase().replace(' ', "_");
    let suffix = if is_genuine { "_g" } else { "_ng" };
    format!("{normalized}{suffix}")
}

/// Returns `base` if unused, else the first free `base_2`, `base_3`, ...
pub fn unique_id(base: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&base) {
        return base;
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{base}_{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn migrate_legacy(legacy: LegacyCategory) -> ProductList {
    let mut taken = HashSet::new();
    let mut list = Vec::with_capacity(legacy.0.len());
    for (name, record) in legacy.0 {
        let id = unique_id(base_id(&name, record.is_genuine), &taken);
        taken.insert(id.clone());
        list.push(Product {
            id,
            name,
            source: record.source,
            is_genuine: record.is_genuine,
            price: record.price,
            unit: record.unit,
            date_added: record.date_added,
        });
    }
    list
}

fn backfill_ids(category: &str, mut list: ProductList) -> ProductList {
    let mut taken: HashSet<String> = list
        .iter()
        .filter(|p| !p.id.is_empty())
        .map(|p| p.id.clone())
        .collect();
    if taken.len() < list.iter().filter(|p| !p.id.is_empty()).count() {
        warn!(category = %category, "category contains duplicate product ids");
    }
    for product in list.iter_mut().filter(|p| p.id.is_empty()) {
        let id = unique_id(base_id(&product.name, product.is_genuine), &taken);
        taken.insert(id.clone());
        product.id = id;
    }
    list
}

fn dedup_sources(sources: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    sources
        .into_iter()
        .filter(|source| seen.insert(source.clone()))
        .collect()
}
