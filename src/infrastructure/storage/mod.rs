//! Storage infrastructure - Topic store backends

mod factory;
#[cfg(test)]
pub mod fixtures;
mod in_memory;
pub mod migrations;
mod postgres;

pub use factory::{StorageConfig, StorageFactory, StorageType};
pub use in_memory::InMemoryTopicStore;
pub use migrations::{run_storage_migrations, storage_migrations, Migration, PostgresMigrator};
pub use postgres::{PostgresConfig, PostgresTopicStore};
