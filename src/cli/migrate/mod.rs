//! Migrate command - applies or reverts the PostgreSQL schema

use clap::Args;
use tracing::info;

use crate::infrastructure::storage::{
    run_storage_migrations, storage_migrations, PostgresConfig, PostgresMigrator,
    PostgresTopicStore,
};

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Database URL; defaults to the configured one
    #[arg(long)]
    pub database_url: Option<String>,

    /// Revert every applied migration instead
    #[arg(long)]
    pub revert: bool,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;
    super::init_console_logging(&config);

    let url = args
        .database_url
        .unwrap_or_else(|| config.storage.database_url.clone());
    let store = PostgresTopicStore::connect(
        &PostgresConfig::new(url).with_max_connections(config.storage.max_connections),
    )
    .await?;

    if args.revert {
        let migrator = PostgresMigrator::new(store.pool().clone());
        for migration in storage_migrations().iter().rev() {
            migrator.revert_migration(migration).await?;
            info!(version = migration.version, "Reverted {}", migration.description);
        }
        return Ok(());
    }

    let version = run_storage_migrations(store.pool()).await?;
    println!(
        "Schema at version {}",
        version.map_or_else(|| "none".to_string(), |v| v.to_string())
    );

    Ok(())
}
