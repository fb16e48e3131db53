mod mem_store;
mod schema;
mod sqlite_store;

pub use mem_store::MemoryListeningStore;
pub use schema::LISTENING_VERSIONED_SCHEMAS;
pub use sqlite_store::SqliteListeningStore;
