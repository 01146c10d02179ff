mod dimensions;
mod facts;
mod models;
mod schema;
mod store;
mod trait_def;

pub use facts::{DurationMatch, FactResolver, LookupOutcome};
pub use models::*;
pub use schema::WAREHOUSE_VERSIONED_SCHEMAS;
pub use store::SqliteWarehouse;
pub use trait_def::{DimensionStore, FactStore, WarehouseStore};
