//! Storage factory for runtime backend selection

use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::domain::storage::TopicStore;
use crate::domain::DomainError;

use super::in_memory::InMemoryTopicStore;
use super::migrations::run_storage_migrations;
use super::postgres::{PostgresConfig, PostgresTopicStore};

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(DomainError::validation(format!(
                "Unknown storage backend \"{}\"",
                other
            ))),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres {
        config: PostgresConfig,
        /// Apply pending schema migrations on startup
        run_migrations: bool,
    },
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres(config: PostgresConfig, run_migrations: bool) -> Self {
        Self::Postgres {
            config,
            run_migrations,
        }
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres { .. } => StorageType::Postgres,
        }
    }
}

/// Factory for creating topic stores
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates a store for the configured backend
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn TopicStore>, DomainError> {
        let store: Arc<dyn TopicStore> = match config {
            StorageConfig::InMemory => Arc::new(InMemoryTopicStore::new()),
            StorageConfig::Postgres {
                config,
                run_migrations,
            } => {
                let store = PostgresTopicStore::connect(config).await?;
                if *run_migrations {
                    run_storage_migrations(store.pool()).await?;
                }
                Arc::new(store)
            }
        };

        info!(backend = store.backend(), "Topic store ready");
        Ok(store)
    }
}
