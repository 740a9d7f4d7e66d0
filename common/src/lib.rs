pub mod codec;
pub mod error;
pub mod invocation;
pub mod ledger;
pub mod lifecycle;
pub mod product;
pub mod seed;
pub mod store;

pub use error::{ErrorKind, LedgerError, Result, StoreError};
pub use lifecycle::Lifecycle;
pub use product::{NewProduct, Product, ProductId, ProductStatus};
pub use store::{KeyValueStore, MemoryStore};
