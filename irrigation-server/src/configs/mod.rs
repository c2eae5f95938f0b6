mod schema;
mod settings;
mod storage;

pub use schema::SchemaManager;
pub use settings::{Database, Logger, Relay, Server, Settings};
pub use storage::Storage;
