//! Field decoders that never fail on a well-formed JSON value.
//!
//! Hand-edited files carry `null`s, quoted numbers and quoted booleans. Each
//! decoder maps what it can and falls back to the field's documented default
//! otherwise, so one odd record never makes the whole document unreadable.

use crate::catalog::model::{
    Product, ProductList, StoredCategory, starter_sources, starter_users,
};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Number, or numeric string; anything else is `0.0`.
pub(crate) fn price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed.filter(|p| p.is_finite()) {
        Some(price) => Ok(price),
        None => {
            fallback("price", &value);
            Ok(0.0)
        }
    }
}

/// Bool, `"true"`/`"false"`, or a number (non-zero is genuine); anything
/// else counts as genuine.
pub(crate) fn genuine<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(|| {
        fallback("is_genuine", &value);
        true
    }))
}

/// String, or a number/bool rendered as text; anything else is empty.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => {
            fallback("text", &other);
            String::new()
        }
    })
}

/// Records of a listed category.
///
/// Entries that are not records are skipped. A record with no name borrows
/// its id as the name; one with neither is skipped. Fails only when the value
/// is not an array, so the legacy map shape can be tried next.
pub(crate) fn records<'de, D>(deserializer: D) -> Result<ProductList, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Err(D::Error::custom("expected a list of products"));
    };
    let mut list = Vec::with_capacity(items.len());
    for item in items {
        let mut product = match Product::deserialize(item) {
            Ok(product) => product,
            Err(err) => {
                warn!(%err, "skipping unreadable product record");
                continue;
            }
        };
        if product.name.trim().is_empty() {
            if product.id.trim().is_empty() {
                warn!("skipping product record with neither name nor id");
                continue;
            }
            warn!(id = %product.id, "product record has no name; using its id");
            product.name = product.id.clone();
        }
        list.push(product);
    }
    Ok(list)
}

/// Category map; a non-object yields no categories.
pub(crate) fn categories<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, StoredCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map
            .into_iter()
            .filter_map(|(category, value)| match StoredCategory::deserialize(value) {
                Ok(stored) => Some((category, stored)),
                Err(err) => {
                    warn!(category = %category, %err, "skipping unreadable category");
                    None
                }
            })
            .collect()),
        other => {
            fallback("products", &other);
            Ok(BTreeMap::new())
        }
    }
}

/// String entries of an array; a non-array yields the starter sources.
pub(crate) fn sources<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                other => {
                    fallback("sources entry", &other);
                    None
                }
            })
            .collect()),
        other => {
            fallback("sources", &other);
            Ok(starter_sources())
        }
    }
}

/// String-valued entries of an object; a non-object yields the starter users.
pub(crate) fn users<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map
            .into_iter()
            .filter_map(|(user, password)| match password {
                Value::String(password) => Some((user, password)),
                other => {
                    fallback("users entry", &other);
                    None
                }
            })
            .collect()),
        other => {
            fallback("users", &other);
            Ok(starter_users())
        }
    }
}

fn fallback(field: &str, value: &Value) {
    if !value.is_null() {
        warn!(field, value = %value, "unexpected value in catalog file; using default");
    }
}
