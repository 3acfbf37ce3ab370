//! csslens store: SQLite key-value persistence for the API key and saved results.

pub mod schema;
pub mod sqlite;
pub mod storage;
pub mod types;

pub use sqlite::SqliteStore;
pub use storage::Storage;
pub use types::*;
