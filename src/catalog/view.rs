//! Read-only projections for the end-user viewer.

use crate::catalog::{CatalogDocument, service};
use serde::Serialize;

/// Label for genuine (authorized import) goods.
pub const GENUINE_LABEL: &str = "行";
/// Label for parallel imports.
pub const PARALLEL_LABEL: &str = "水";

const MISSING_SOURCE: &str = "N/A";

/// One line of the viewer table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewerRow {
    pub name: String,
    pub price: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
}

pub fn viewer_rows(doc: &CatalogDocument, category: &str) -> Vec<ViewerRow> {
    service::products(doc, category)
        .iter()
        .map(|product| ViewerRow {
            name: product.name.clone(),
            price: format!("{:.2}", product.price),
            kind: if product.is_genuine {
                GENUINE_LABEL
            } else {
                PARALLEL_LABEL
            }
            .to_string(),
            source: if product.source.is_empty() {
                MISSING_SOURCE.to_string()
            } else {
                product.source.clone()
            },
        })
        .collect()
}
