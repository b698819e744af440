use serde::Deserialize;

use crate::domain::query::DEFAULT_SIMILARITY_THRESHOLD;
use crate::domain::DomainError;
use crate::infrastructure::analysis::DEFAULT_MINIMUM_WORDS_PER_TEXT;
use crate::infrastructure::observability::ObservabilityConfig;
use crate::infrastructure::services::{
    TopicQueryConfig, DEFAULT_TOP_N_DOCUMENT_TOPICS, DEFAULT_TOP_N_TOPIC_TERMS,
};
use crate::infrastructure::storage::{PostgresConfig, StorageConfig, StorageType};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageSettings,
    pub topics: TopicsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `memory` or `postgres`
    pub backend: String,
    pub database_url: String,
    pub max_connections: u32,
    /// Apply pending migrations when the server starts
    pub run_migrations: bool,
}

/// Tuning of the topic engine
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TopicsConfig {
    /// Token floor, checked before and after filtering
    pub minimum_words_per_text: usize,
    pub top_n_document_topics: usize,
    /// Terms kept per topic at import time
    pub top_n_topic_terms: usize,
    /// Novelty cutoff
    pub similarity_threshold: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        let postgres = PostgresConfig::default();

        Self {
            backend: "memory".to_string(),
            database_url: postgres.url,
            max_connections: postgres.max_connections,
            run_migrations: true,
        }
    }
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            minimum_words_per_text: DEFAULT_MINIMUM_WORDS_PER_TEXT,
            top_n_document_topics: DEFAULT_TOP_N_DOCUMENT_TOPICS,
            top_n_topic_terms: DEFAULT_TOP_N_TOPIC_TERMS,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl StorageSettings {
    /// Backend settings for the storage factory
    pub fn storage_config(&self) -> Result<StorageConfig, DomainError> {
        match self.backend.parse::<StorageType>()? {
            StorageType::InMemory => Ok(StorageConfig::in_memory()),
            StorageType::Postgres => Ok(StorageConfig::postgres(
                PostgresConfig::new(&self.database_url).with_max_connections(self.max_connections),
                self.run_migrations,
            )),
        }
    }
}

impl TopicsConfig {
    pub fn query_config(&self) -> TopicQueryConfig {
        TopicQueryConfig {
            similarity_threshold: self.similarity_threshold,
        }
    }
}

impl AppConfig {
    /// `config/default` → `config/local` → `APP__SECTION__KEY`, then `DATABASE_URL`
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;
        if let Ok(url) = std::env::var("DATABASE_URL") {
            app_config.storage.database_url = url;
        }

        Ok(app_config)
    }
}
