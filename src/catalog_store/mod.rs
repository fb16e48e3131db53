mod mem_store;
mod models;
mod schema;
mod store;
mod trait_def;

pub use mem_store::MemoryCatalogStore;
pub use models::{Album, Artist, Song};
pub use schema::CATALOG_VERSIONED_SCHEMAS;
pub use store::SqliteCatalogStore;
pub use trait_def::{CatalogStore, WritableCatalogStore};
