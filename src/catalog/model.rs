//! Typed records for the catalog document.
//!
//! `CatalogDocument` is the canonical in-memory shape every operation works
//! on. `StoredDocument` is what the store accepts from disk: each category may
//! still be in the legacy name-keyed shape, and only
//! [`migrate_if_needed`](crate::catalog::migrate_if_needed) looks at that
//! difference.

use crate::catalog::lenient;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Sources offered on a fresh install.
pub const STARTER_SOURCES: [&str; 4] = ["本地供應商", "香港代理", "台灣進口", "其他"];

/// Credentials seeded on a fresh install.
pub const STARTER_USERS: [(&str, &str); 2] = [("admin", "admin123"), ("partner", "partner123")];

/// A single catalog entry.
///
/// Missing, `null` or oddly typed fields fall back to the same defaults the
/// viewer historically assumed, so hand-edited files still load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub source: String,
    #[serde(default = "default_genuine", deserialize_with = "lenient::genuine")]
    pub is_genuine: bool,
    #[serde(default, deserialize_with = "lenient::price")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date_added: String,
}

/// Ordered products of one category; order is display order.
pub type ProductList = Vec<Product>;

/// Caller-supplied fields for creating or editing a product.
///
/// `id` and `date_added` are never taken from the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub source: String,
    pub is_genuine: bool,
    pub price: f64,
    pub unit: String,
}

/// The whole catalog after migration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogDocument {
    pub products: BTreeMap<String, ProductList>,
    pub sources: Vec<String>,
    pub users: BTreeMap<String, String>,
}

impl CatalogDocument {
    /// Document used when the data file is missing or unreadable.
    pub fn starter() -> Self {
        Self {
            products: BTreeMap::new(),
            sources: starter_sources(),
            users: starter_users(),
        }
    }
}

/// Record body of the legacy shape; the product name lived in the map key.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LegacyRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub source: String,
    #[serde(default = "default_genuine", deserialize_with = "lenient::genuine")]
    pub is_genuine: bool,
    #[serde(default, deserialize_with = "lenient::price")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date_added: String,
}

/// A legacy category: name-keyed records in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LegacyCategory(pub Vec<(String, LegacyRecord)>);

impl<'de> Deserialize<'de> for LegacyCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = LegacyCategory;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of product name to product record")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                // Keep file order; a BTreeMap would sort the names.
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, value)) = map.next_entry::<String, Value>()? {
                    match LegacyRecord::deserialize(value) {
                        Ok(record) => entries.push((name, record)),
                        Err(err) => warn!(product = %name, %err, "skipping unreadable legacy record"),
                    }
                }
                Ok(LegacyCategory(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Per-category value as found on disk.
///
/// `Unreadable` holds anything that is neither a list nor a map; migration
/// turns it into an empty category.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StoredCategory {
    #[serde(deserialize_with = "lenient::records")]
    Listed(ProductList),
    Legacy(LegacyCategory),
    Unreadable(Value),
}

/// Document as read from disk, before migration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StoredDocument {
    #[serde(default, deserialize_with = "lenient::categories")]
    pub products: BTreeMap<String, StoredCategory>,
    #[serde(default = "starter_sources", deserialize_with = "lenient::sources")]
    pub sources: Vec<String>,
    #[serde(default = "starter_users", deserialize_with = "lenient::users")]
    pub users: BTreeMap<String, String>,
}

impl StoredDocument {
    pub fn starter() -> Self {
        CatalogDocument::starter().into()
    }
}

impl From<CatalogDocument> for StoredDocument {
    fn from(doc: CatalogDocument) -> Self {
        Self {
            products: doc
                .products
                .into_iter()
                .map(|(category, list)| (category, StoredCategory::Listed(list)))
                .collect(),
            sources: doc.sources,
            users: doc.users,
        }
    }
}

/// Demonstration catalog used by `clinic-admin reset-sample`.
pub fn sample_document() -> CatalogDocument {
    let product = |id: &str,
                   name: &str,
                   source: &str,
                   is_genuine: bool,
                   price: f64,
                   unit: &str,
                   date_added: &str| Product {
        id: id.to_string(),
        name: name.to_string(),
        source: source.to_string(),
        is_genuine,
        price,
        unit: unit.to_string(),
        date_added: date_added.to_string(),
    };

    let mut products = BTreeMap::new();
    products.insert(
        "填充".to_string(),
        vec![
            product("voluma_ng", "VOLUMA", "SINOPHARM", false, 820.0, "per 支", "2026-01-01 09:38"),
            product("vobella_g", "VOBELLA", "SINOPHARM", true, 820.0, "per 支", "2026-01-01 12:00"),
        ],
    );
    products.insert(
        "水光".to_string(),
        vec![product(
            "hyal_001",
            "Hyaluronic Acid Solution 5ml",
            "Local Supplier",
            true,
            120.0,
            "per bottle",
            "2024-01-01 10:30",
        )],
    );
    products.insert(
        "溶脂".to_string(),
        vec![product(
            "lipo_001",
            "Lipodissolve Solution 10ml",
            "Medical Supply Co",
            false,
            85.0,
            "per vial",
            "2024-01-01 10:45",
        )],
    );

    CatalogDocument {
        products,
        sources: ["Medical Supply Co", "Pharma Corp", "Local Supplier", "Global Med", "SINOPHARM"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        users: starter_users(),
    }
}

fn default_genuine() -> bool {
    true
}

pub(crate) fn starter_sources() -> Vec<String> {
    STARTER_SOURCES.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn starter_users() -> BTreeMap<String, String> {
    STARTER_USERS
        .iter()
        .map(|(user, password)| (user.to_string(), password.to_string()))
        .collect()
}
