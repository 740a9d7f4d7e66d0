//! The product lifecycle contract.
//!
//! Every operation rehydrates the record from the store, checks its
//! preconditions, and writes the whole new record back with a single `put`.
//! Nothing is cached between calls. Transitions only require the record to
//! exist: they may run in any order and any number of times, and the last
//! write wins.

use tracing::{debug, info};

use crate::codec;
use crate::error::{LedgerError, Result};
use crate::product::{NewProduct, Product, ProductStatus};
use crate::store::KeyValueStore;

/// The contract bound to one store for the duration of an operation.
pub struct Lifecycle<'s, S: KeyValueStore + ?Sized> {
    store: &'s mut S,
}

impl<'s, S: KeyValueStore + ?Sized> Lifecycle<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// Create a product. Fails if a record already exists under its id.
    pub fn create(&mut self, args: NewProduct) -> Result<Product> {
        validate_id(&args.id)?;
        if self.store.get(&args.id)?.is_some() {
            return Err(LedgerError::AlreadyExists { id: args.id });
        }
        let product = Product::new(args);
        self.save(&product)?;
        info!(product = %product.id, "product created");
        Ok(product)
    }

    /// Create a product, replacing any record already stored under its id.
    ///
    /// The replacement starts over at `Created` with no lifecycle fields.
    pub fn create_or_replace(&mut self, args: NewProduct) -> Result<Product> {
        validate_id(&args.id)?;
        let product = Product::new(args);
        self.save(&product)?;
        info!(product = %product.id, "product created (upsert)");
        Ok(product)
    }

    /// Record that the product was supplied to a warehouse.
    pub fn supply(
        &mut self,
        id: &str,
        supply_date: &str,
        warehouse_location: &str,
    ) -> Result<Product> {
        let mut product = self.load(id)?;
        product.supply_date = Some(supply_date.to_string());
        product.warehouse_location = Some(warehouse_location.to_string());
        product.status = ProductStatus::Supplied;
        self.save(&product)?;
        info!(product = %product.id, warehouse = warehouse_location, "supply recorded");
        Ok(product)
    }

    /// Record a wholesale purchase of `quantity` units.
    ///
    /// The quantity is checked before the store is touched, so a negative
    /// value leaves the record exactly as it was.
    pub fn wholesale(
        &mut self,
        id: &str,
        wholesale_date: &str,
        wholesale_location: &str,
        quantity: i64,
    ) -> Result<Product> {
        let quantity = u64::try_from(quantity).map_err(|_| {
            LedgerError::invalid(id, format!("quantity must be non-negative, got {quantity}"))
        })?;
        let mut product = self.load(id)?;
        product.wholesale_date = Some(wholesale_date.to_string());
        product.wholesale_location = Some(wholesale_location.to_string());
        product.quantity = Some(quantity);
        product.status = ProductStatus::Wholesaled;
        self.save(&product)?;
        info!(product = %product.id, quantity, "wholesale recorded");
        Ok(product)
    }

    /// Overwrite the status, whatever it currently is. No other field changes.
    pub fn change_status(&mut self, id: &str, new_status: &str) -> Result<Product> {
        let mut product = self.load(id)?;
        let previous = std::mem::replace(&mut product.status, ProductStatus::parse(new_status));
        self.save(&product)?;
        info!(product = %product.id, from = %previous, to = %product.status, "status changed");
        Ok(product)
    }

    /// Read the current record.
    pub fn query(&self, id: &str) -> Result<Product> {
        self.load(id)
    }

    fn load(&self, id: &str) -> Result<Product> {
        match self.store.get(id)? {
            Some(bytes) => codec::decode(id, &bytes),
            None => Err(LedgerError::NotFound { id: id.to_string() }),
        }
    }

    fn save(&mut self, product: &Product) -> Result<()> {
        let bytes = codec::encode(product)?;
        debug!(product = %product.id, len = bytes.len(), "writing record");
        self.store.put(product.id.as_str(), bytes)?;
        Ok(())
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(LedgerError::invalid(id, "product id must not be empty"));
    }
    Ok(())
}
