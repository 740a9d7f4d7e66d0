use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lifecycle::Lifecycle;
use crate::product::{NewProduct, Product, ProductId};
use crate::seed;
use crate::store::KeyValueStore;

/// A named contract transaction, as submitted over the wire.
///
/// Encoded as `{"function": "RecordSupply", "args": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function", content = "args", rename_all_fields = "camelCase")]
pub enum Invocation {
    InitLedger,
    AddProduct {
        #[serde(flatten)]
        product: NewProduct,
        /// Replace an existing record instead of failing.
        #[serde(default)]
        upsert: bool,
    },
    RecordSupply {
        #[serde(rename = "productID")]
        id: String,
        supply_date: String,
        warehouse_location: String,
    },
    RecordWholesale {
        #[serde(rename = "productID")]
        id: String,
        wholesale_date: String,
        wholesale_location: String,
        quantity: i64,
    },
    ChangeProductStatus {
        #[serde(rename = "productID")]
        id: String,
        status: String,
    },
    RetrieveProduct {
        #[serde(rename = "productID")]
        id: String,
    },
}

/// What a successful invocation returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    Seeded(Vec<ProductId>),
    Product(Product),
}

impl Invocation {
    /// Queries are evaluated; everything else is submitted for ordering.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Invocation::RetrieveProduct { .. })
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            Invocation::InitLedger => "InitLedger",
            Invocation::AddProduct { .. } => "AddProduct",
            Invocation::RecordSupply { .. } => "RecordSupply",
            Invocation::RecordWholesale { .. } => "RecordWholesale",
            Invocation::ChangeProductStatus { .. } => "ChangeProductStatus",
            Invocation::RetrieveProduct { .. } => "RetrieveProduct",
        }
    }

    pub fn apply<S: KeyValueStore + ?Sized>(self, store: &mut S) -> Result<Outcome> {
        let product = match self {
            Invocation::InitLedger => {
                return seed::initialize_ledger(store).map(Outcome::Seeded);
            }
            Invocation::AddProduct {
                product,
                upsert: false,
            } => Lifecycle::new(store).create(product)?,
            Invocation::AddProduct {
                product,
                upsert: true,
            } => Lifecycle::new(store).create_or_replace(product)?,
            Invocation::RecordSupply {
                id,
                supply_date,
                warehouse_location,
            } => Lifecycle::new(store).supply(&id, &supply_date, &warehouse_location)?,
            Invocation::RecordWholesale {
                id,
                wholesale_date,
                wholesale_location,
                quantity,
            } => Lifecycle::new(store).wholesale(
                &id,
                &wholesale_date,
                &wholesale_location,
                quantity,
            )?,
            Invocation::ChangeProductStatus { id, status } => {
                Lifecycle::new(store).change_status(&id, &status)?
            }
            Invocation::RetrieveProduct { id } => Lifecycle::new(store).query(&id)?,
        };
        Ok(Outcome::Product(product))
    }
}
