pub mod config;
pub mod paths;
pub mod store;

pub use config::{Config, OmdbConfig, SearchConfig, StorageConfig, DEFAULT_OMDB_BASE_URL};
pub use paths::{PathManager, popcorn_home};
pub use store::{FileStore, KeyValueStore, MemoryStore};
