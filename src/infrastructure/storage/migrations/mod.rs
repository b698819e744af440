//! Database migrations infrastructure

use sqlx::postgres::PgPool;

use crate::domain::DomainError;

/// Applies versioned schema migrations, recording them in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                success BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    /// Runs a single migration
    pub async fn run_migration(&self, migration: &Migration) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        // Check if already applied
        let applied: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)",
        )
        .bind(migration.version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))?;

        if applied {
            return Ok(());
        }

        // Multi-statement scripts need the simple query protocol
        sqlx::raw_sql(&migration.up)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        // Record the migration
        sqlx::query(
            "INSERT INTO _migrations (version, description) VALUES ($1, $2)",
        )
        .bind(migration.version)
        .bind(&migration.description)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::storage(format!("Failed to record migration {}: {}", migration.version, e))
        })?;

        Ok(())
    }

    /// Reverts a single migration
    pub async fn revert_migration(&self, migration: &Migration) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        // Check if applied
        let applied: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)",
        )
        .bind(migration.version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))?;

        if !applied {
            return Ok(());
        }

        // Run the down migration
        sqlx::raw_sql(&migration.down)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to revert migration {}: {}",
                    migration.version, e
                ))
            })?;

        // Remove the migration record
        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to remove migration record {}: {}",
                    migration.version, e
                ))
            })?;

        Ok(())
    }

    /// Returns the latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        let version: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(version) FROM _migrations WHERE success = TRUE",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))?;

        Ok(version)
    }

    /// Returns all applied migration versions
    pub async fn applied_versions(&self) -> Result<Vec<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        let versions: Vec<i64> = sqlx::query_scalar(
            "SELECT version FROM _migrations WHERE success = TRUE ORDER BY version",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get applied migrations: {}", e)))?;

        Ok(versions)
    }
}

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version (timestamp-based recommended)
    pub version: i64,
    /// Human-readable description
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
    /// SQL to run when reverting the migration
    pub down: String,
}

impl Migration {
    pub fn new(
        version: i64,
        description: impl Into<String>,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
            down: down.into(),
        }
    }
}

/// Schema of the topic store
pub fn storage_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create lda_models table",
            r#"
            CREATE TABLE IF NOT EXISTS lda_models (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                training_context TEXT NOT NULL DEFAULT '',
                is_main BOOLEAN NOT NULL DEFAULT FALSE,
                path TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
            r#"
            DROP TABLE IF EXISTS lda_models;
            "#,
        ),
        Migration::new(
            2,
            "Create topics and terms tables",
            r#"
            CREATE TABLE IF NOT EXISTS topics (
                id BIGSERIAL PRIMARY KEY,
                model_id BIGINT NOT NULL REFERENCES lda_models(id) ON DELETE CASCADE,
                topic_index INTEGER NOT NULL CHECK (topic_index >= 0),
                keyphrase VARCHAR(255) NOT NULL DEFAULT '',
                UNIQUE (model_id, topic_index)
            );
            CREATE INDEX IF NOT EXISTS idx_topics_keyphrase ON topics(model_id, keyphrase);

            CREATE TABLE IF NOT EXISTS terms (
                id BIGSERIAL PRIMARY KEY,
                term_string VARCHAR(255) NOT NULL UNIQUE,
                original_word_id BIGINT REFERENCES terms(id) ON DELETE SET NULL,
                rank INTEGER CHECK (rank >= 1)
            );
            "#,
            r#"
            DROP TABLE IF EXISTS terms;
            DROP TABLE IF EXISTS topics;
            "#,
        ),
        Migration::new(
            3,
            "Create topic_term_distributions table",
            r#"
            CREATE TABLE IF NOT EXISTS topic_term_distributions (
                topic_id BIGINT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
                term_id BIGINT NOT NULL REFERENCES terms(id) ON DELETE CASCADE,
                value DOUBLE PRECISION NOT NULL,
                rank INTEGER NOT NULL CHECK (rank >= 1),
                PRIMARY KEY (topic_id, term_id),
                UNIQUE (topic_id, rank)
            );
            "#,
            r#"
            DROP TABLE IF EXISTS topic_term_distributions;
            "#,
        ),
        Migration::new(
            4,
            "Create comparisons tables",
            r#"
            CREATE TABLE IF NOT EXISTS comparisons (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                is_score BOOLEAN NOT NULL DEFAULT TRUE,
                lower_bound DOUBLE PRECISION NOT NULL,
                upper_bound DOUBLE PRECISION NOT NULL,
                model_from_id BIGINT NOT NULL REFERENCES lda_models(id) ON DELETE CASCADE,
                model_to_id BIGINT NOT NULL REFERENCES lda_models(id) ON DELETE CASCADE,
                CHECK (upper_bound >= lower_bound)
            );
            CREATE INDEX IF NOT EXISTS idx_comparisons_models
                ON comparisons(model_from_id, model_to_id);

            CREATE TABLE IF NOT EXISTS topics_comparisons (
                comparison_id BIGINT NOT NULL REFERENCES comparisons(id) ON DELETE CASCADE,
                topic_from_id BIGINT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
                topic_to_id BIGINT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
                value DOUBLE PRECISION NOT NULL,
                PRIMARY KEY (comparison_id, topic_from_id, topic_to_id)
            );
            CREATE INDEX IF NOT EXISTS idx_topics_comparisons_to
                ON topics_comparisons(topic_to_id);
            "#,
            r#"
            DROP TABLE IF EXISTS topics_comparisons;
            DROP TABLE IF EXISTS comparisons;
            "#,
        ),
    ]
}

/// Runs all pending storage migrations, returning the resulting schema version
pub async fn run_storage_migrations(pool: &PgPool) -> Result<Option<i64>, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());

    for migration in storage_migrations() {
        migrator.run_migration(&migration).await?;
    }

    let version = migrator.current_version().await?;
    tracing::info!(version = ?version, "Storage migrations applied");
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creation() {
        let migration = Migration::new(1, "Test migration", "CREATE TABLE test", "DROP TABLE test");

        assert_eq!(migration.version, 1);
        assert_eq!(migration.description, "Test migration");
        assert_eq!(migration.up, "CREATE TABLE test");
        assert_eq!(migration.down, "DROP TABLE test");
    }

    #[test]
    fn test_storage_migrations_order() {
        let migrations = storage_migrations();

        assert!(!migrations.is_empty());

        // Verify migrations are in order
        for i in 1..migrations.len() {
            assert!(
                migrations[i].version > migrations[i - 1].version,
                "Migrations should be in ascending order"
            );
        }
    }

    #[test]
    fn test_schema_covers_every_table() {
        let schema: String = storage_migrations().into_iter().map(|m| m.up).collect();

        for table in [
            "lda_models",
            "topics",
            "terms",
            "topic_term_distributions",
            "comparisons",
            "topics_comparisons",
        ] {
            assert!(
                schema.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)),
                "missing table {}",
                table
            );
        }
        assert!(schema.contains("CHECK (upper_bound >= lower_bound)"));
    }

    #[test]
    fn test_storage_migrations_content() {
        let migrations = storage_migrations();

        // Verify all migrations have required content
        for migration in migrations {
            assert!(!migration.description.is_empty());
            assert!(!migration.up.is_empty());
            assert!(!migration.down.is_empty());
        }
    }
}
