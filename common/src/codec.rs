//! Byte encoding of product records.
//!
//! Records are JSON objects. Lifecycle fields missing from an older record
//! decode as absent, so the format only ever grows optional fields. Older
//! writers also spelled "unset" as `""` and `0`, which decode as absent too.

use crate::error::{LedgerError, Result};
use crate::product::Product;

fn blank_to_none(field: &mut Option<String>) {
    if field.as_deref() == Some("") {
        *field = None;
    }
}

fn normalize_unset(product: &mut Product) {
    blank_to_none(&mut product.supply_date);
    blank_to_none(&mut product.warehouse_location);
    blank_to_none(&mut product.wholesale_date);
    blank_to_none(&mut product.wholesale_location);
    if product.quantity == Some(0)
        && product.wholesale_date.is_none()
        && product.wholesale_location.is_none()
    {
        product.quantity = None;
    }
}

pub fn encode(product: &Product) -> Result<Vec<u8>> {
    serde_json::to_vec(product).map_err(|e| LedgerError::Serialization {
        id: product.id.to_string(),
        reason: e.to_string(),
    })
}

/// Decode the record stored under `key`.
///
/// A payload that is not a complete product, or that names a different
/// product than its key, is corrupt.
pub fn decode(key: &str, bytes: &[u8]) -> Result<Product> {
    let mut product: Product = serde_json::from_slice(bytes).map_err(|e| LedgerError::CorruptRecord {
        id: key.to_string(),
        reason: e.to_string(),
    })?;
    if product.id.as_str() != key {
        return Err(LedgerError::CorruptRecord {
            id: key.to_string(),
            reason: format!("record is keyed '{key}' but names product '{}'", product.id),
        });
    }
    normalize_unset(&mut product);
    Ok(product)
}
