//! CLI module for the Topic Evolution API
//!
//! - `serve`: HTTP API server
//! - `migrate`: apply the PostgreSQL schema
//! - `import-model` / `import-comparison`: load trained artifacts into the store
//! - `analyze`: score a text from the command line

pub mod analyze;
pub mod import;
pub mod migrate;
pub mod serve;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::TopicStore;
use crate::infrastructure::logging::{self, LoggingConfig};
use crate::infrastructure::storage::{StorageFactory, StorageType};

/// Topic Evolution API - query and compare pre-computed LDA topic models
#[derive(Parser)]
#[command(name = "topic-evolution-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Apply pending database migrations
    Migrate(migrate::MigrateArgs),

    /// Import a trained LDA model artifact
    ImportModel(import::ImportModelArgs),

    /// Import a topic comparison matrix between two models
    ImportComparison(import::ImportComparisonArgs),

    /// Report the most probable topics of a text
    Analyze(analyze::AnalyzeArgs),
}

/// Loads `.env` and the layered configuration
pub(crate) fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();
    Ok(AppConfig::load()?)
}

/// Console-only logging for one-shot commands
pub(crate) fn init_console_logging(config: &AppConfig) {
    logging::init_logging(&LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });
}

/// Opens the configured topic store
pub(crate) async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn TopicStore>> {
    let storage_config = config.storage.storage_config()?;

    if storage_config.storage_type() == StorageType::InMemory {
        warn!("Using the in-memory topic store; imported data is lost on exit");
    }

    Ok(StorageFactory::create(&storage_config).await?)
}
