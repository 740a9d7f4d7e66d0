//! Deployment-time sample data.

use tracing::info;

use crate::codec;
use crate::error::Result;
use crate::product::{NewProduct, Product, ProductId};
use crate::store::KeyValueStore;

/// The two sample records written at deployment.
pub fn sample_products() -> Vec<Product> {
    vec![
        Product::new(NewProduct {
            id: "P001".into(),
            name: "Product1".into(),
            description: "Description for Product1".into(),
            manufacturing_date: "2023-09-25".into(),
            batch_number: "B001".into(),
        }),
        Product::new(NewProduct {
            id: "P002".into(),
            name: "Product2".into(),
            description: "Description for Product2".into(),
            manufacturing_date: "2023-09-26".into(),
            batch_number: "B002".into(),
        }),
    ]
}

/// Write the sample records, overwriting whatever is stored under their ids.
///
/// Stops at the first failure; records written before it stay written.
pub fn initialize_ledger<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<Vec<ProductId>> {
    let mut seeded = Vec::new();
    for product in sample_products() {
        let bytes = codec::encode(&product)?;
        store.put(product.id.as_str(), bytes)?;
        seeded.push(product.id);
    }
    info!(count = seeded.len(), "ledger initialized");
    Ok(seeded)
}
