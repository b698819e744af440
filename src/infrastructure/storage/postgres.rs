//! PostgreSQL topic store with connection pooling

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use tracing::{debug, info};

use crate::domain::comparison::{
    Comparison, ComparisonRepository, ComparisonSide, EvolutionEdge, TopicSimilarity,
};
use crate::domain::ingestion::{ComparisonImport, IngestionRepository, ModelImport};
use crate::domain::model::{EntityId, LdaModel, LdaModelRepository};
use crate::domain::storage::TopicStore;
use crate::domain::topic::{OriginalWord, Topic, TopicRepository, TopicTermRow};
use crate::domain::DomainError;

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/topic_evolution".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }
}

const MODEL_COLUMNS: &str =
    "id, name, description, training_context, is_main, path, created_at";

const COMPARISON_COLUMNS: &str = "id, name, description, is_score, lower_bound, upper_bound, \
     model_from_id, model_to_id";

const TERM_ROWS_QUERY: &str = r#"
    SELECT t.topic_index, te.term_string AS term, ow.term_string AS original_word,
           ow.rank AS original_rank, d.value, d.rank
    FROM topic_term_distributions d
    JOIN topics t ON t.id = d.topic_id
    JOIN terms te ON te.id = d.term_id
    LEFT JOIN terms ow ON ow.id = te.original_word_id
    WHERE t.model_id = $1
      AND t.topic_index = ANY($2)
      AND (te.original_word_id IS NULL OR ow.rank = 1)
    ORDER BY t.topic_index, d.rank
"#;

const EDGES_FROM_QUERY: &str = r#"
    SELECT tf.topic_index AS from_index, tt.topic_index AS to_index, tc.value
    FROM topics_comparisons tc
    JOIN topics tf ON tf.id = tc.topic_from_id
    JOIN topics tt ON tt.id = tc.topic_to_id
    WHERE tc.comparison_id = $1 AND tf.topic_index = $2 AND tc.value >= $3
    ORDER BY tt.topic_index
"#;

const EDGES_TO_QUERY: &str = r#"
    SELECT tf.topic_index AS from_index, tt.topic_index AS to_index, tc.value
    FROM topics_comparisons tc
    JOIN topics tf ON tf.id = tc.topic_from_id
    JOIN topics tt ON tt.id = tc.topic_to_id
    WHERE tc.comparison_id = $1 AND tt.topic_index = $2 AND tc.value >= $3
    ORDER BY tf.topic_index
"#;

const MAX_SIMILARITY_QUERY: &str = r#"
    SELECT t.id, t.model_id, t.topic_index, t.keyphrase, MAX(tc.value) AS max_value
    FROM topics_comparisons tc
    JOIN topics t ON t.id = tc.topic_to_id
    WHERE t.model_id = $1
    GROUP BY t.id, t.model_id, t.topic_index, t.keyphrase
    ORDER BY t.topic_index
"#;

fn db_error(action: &str) -> impl Fn(sqlx::Error) -> DomainError + '_ {
    move |e| DomainError::storage(format!("Failed to {}: {}", action, e))
}

/// Maps constraint violations of an insert to domain errors
fn insert_error(action: &str, subject: &str, e: sqlx::Error) -> DomainError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return DomainError::conflict(format!("{} already exists", subject));
        }
        if db.is_check_violation() {
            return DomainError::validation(format!("{} violates a constraint: {}", subject, db));
        }
    }
    DomainError::storage(format!("Failed to {}: {}", action, e))
}

fn to_index(value: u32) -> Result<i32, DomainError> {
    i32::try_from(value)
        .map_err(|_| DomainError::validation(format!("Index {} is out of range", value)))
}

fn from_index(value: i32) -> Result<u32, DomainError> {
    u32::try_from(value)
        .map_err(|_| DomainError::storage(format!("Stored index {} is negative", value)))
}

fn model_from_row(row: &PgRow) -> Result<LdaModel, DomainError> {
    let map = db_error("read model row");
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(&map)?;

    Ok(LdaModel::new(
        row.try_get::<i64, _>("id").map_err(&map)?,
        row.try_get::<String, _>("name").map_err(&map)?,
        row.try_get::<String, _>("path").map_err(&map)?,
    )
    .with_description(row.try_get::<String, _>("description").map_err(&map)?)
    .with_training_context(row.try_get::<String, _>("training_context").map_err(&map)?)
    .with_main(row.try_get("is_main").map_err(&map)?)
    .with_created_at(created_at))
}

fn topic_from_row(row: &PgRow) -> Result<Topic, DomainError> {
    let map = db_error("read topic row");

    Ok(Topic::new(
        row.try_get("id").map_err(&map)?,
        row.try_get("model_id").map_err(&map)?,
        from_index(row.try_get("topic_index").map_err(&map)?)?,
    )
    .with_keyphrase(row.try_get::<String, _>("keyphrase").map_err(&map)?))
}

fn comparison_from_row(row: &PgRow) -> Result<Comparison, DomainError> {
    let map = db_error("read comparison row");

    Ok(Comparison {
        id: row.try_get("id").map_err(&map)?,
        name: row.try_get("name").map_err(&map)?,
        description: row.try_get("description").map_err(&map)?,
        is_score: row.try_get("is_score").map_err(&map)?,
        lower_bound: row.try_get("lower_bound").map_err(&map)?,
        upper_bound: row.try_get("upper_bound").map_err(&map)?,
        model_from_id: row.try_get("model_from_id").map_err(&map)?,
        model_to_id: row.try_get("model_to_id").map_err(&map)?,
    })
}

/// PostgreSQL-backed topic store
///
/// Reads are plain pooled queries; every import runs inside one transaction.
#[derive(Debug, Clone)]
pub struct PostgresTopicStore {
    pool: PgPool,
}

impl PostgresTopicStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a store with its own connection pool
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn model_id_by_name(
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
    ) -> Result<(EntityId, Vec<EntityId>), DomainError> {
        let model_id: Option<i64> = sqlx::query_scalar("SELECT id FROM lda_models WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_error("look up model"))?;

        let model_id = model_id.ok_or_else(|| {
            DomainError::not_found(format!("Requested model \"{}\" does not exist", name))
        })?;

        let topic_ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM topics WHERE model_id = $1 ORDER BY topic_index")
                .bind(model_id)
                .fetch_all(&mut **tx)
                .await
                .map_err(db_error("list topic ids"))?;

        Ok((model_id, topic_ids))
    }

    async fn insert_model(
        tx: &mut Transaction<'_, Postgres>,
        import: &ModelImport,
    ) -> Result<LdaModel, DomainError> {
        let row = sqlx::query(&format!(
            "INSERT INTO lda_models (name, description, training_context, is_main, path) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            MODEL_COLUMNS
        ))
        .bind(&import.name)
        .bind(&import.description)
        .bind(&import.training_context)
        .bind(import.is_main)
        .bind(&import.path)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| insert_error("insert model", &format!("Model \"{}\"", import.name), e))?;

        let model = model_from_row(&row)?;

        let indices = (0..import.topics.len() as u32)
            .map(to_index)
            .collect::<Result<Vec<i32>, _>>()?;
        let keyphrases: Vec<&str> = import.topics.iter().map(|t| t.keyphrase.as_str()).collect();

        let topic_rows = sqlx::query(
            "INSERT INTO topics (model_id, topic_index, keyphrase) \
             SELECT $1, * FROM UNNEST($2::int[], $3::text[]) \
             RETURNING id, topic_index",
        )
        .bind(model.id())
        .bind(&indices)
        .bind(&keyphrases)
        .fetch_all(&mut **tx)
        .await
        .map_err(db_error("insert topics"))?;

        let mut topic_ids: HashMap<i32, i64> = HashMap::with_capacity(topic_rows.len());
        for row in &topic_rows {
            topic_ids.insert(
                row.try_get("topic_index").map_err(db_error("read topic id"))?,
                row.try_get("id").map_err(db_error("read topic id"))?,
            );
        }

        // Every term string the import references, stems and surface forms alike
        let mut strings: BTreeSet<&str> = import
            .topics
            .iter()
            .flat_map(|t| t.terms.iter().map(|term| term.term.as_str()))
            .collect();
        let linked: Vec<(&str, &Vec<String>)> = import
            .original_words
            .iter()
            .filter(|(stem, words)| strings.contains(stem.as_str()) && !words.is_empty())
            .map(|(stem, words)| (stem.as_str(), words))
            .collect();
        for (_, words) in &linked {
            strings.extend(words.iter().map(String::as_str));
        }
        let strings: Vec<&str> = strings.into_iter().collect();

        sqlx::query(
            "INSERT INTO terms (term_string) SELECT * FROM UNNEST($1::text[]) \
             ON CONFLICT (term_string) DO NOTHING",
        )
        .bind(&strings)
        .execute(&mut **tx)
        .await
        .map_err(db_error("insert terms"))?;

        let term_rows = sqlx::query("SELECT id, term_string FROM terms WHERE term_string = ANY($1)")
            .bind(&strings)
            .fetch_all(&mut **tx)
            .await
            .map_err(db_error("read term ids"))?;

        let mut term_ids: HashMap<String, i64> = HashMap::with_capacity(term_rows.len());
        for row in &term_rows {
            term_ids.insert(
                row.try_get("term_string").map_err(db_error("read term id"))?,
                row.try_get("id").map_err(db_error("read term id"))?,
            );
        }
        let term_id = |s: &str| {
            term_ids
                .get(s)
                .copied()
                .ok_or_else(|| DomainError::internal(format!("Term \"{}\" was not stored", s)))
        };

        let mut dist_topics = Vec::new();
        let mut dist_terms = Vec::new();
        let mut dist_values = Vec::new();
        let mut dist_ranks = Vec::new();
        for (index, topic) in import.topics.iter().enumerate() {
            let topic_id = topic_ids
                .get(&to_index(index as u32)?)
                .copied()
                .ok_or_else(|| DomainError::internal(format!("Topic {} was not stored", index)))?;

            for (position, term) in topic.terms.iter().enumerate() {
                dist_topics.push(topic_id);
                dist_terms.push(term_id(&term.term)?);
                dist_values.push(term.value);
                dist_ranks.push(to_index(position as u32 + 1)?);
            }
        }

        sqlx::query(
            "INSERT INTO topic_term_distributions (topic_id, term_id, value, rank) \
             SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::float8[], $4::int[])",
        )
        .bind(&dist_topics)
        .bind(&dist_terms)
        .bind(&dist_values)
        .bind(&dist_ranks)
        .execute(&mut **tx)
        .await
        .map_err(|e| insert_error("insert distributions", "Topic term distribution", e))?;

        let mut link_stems = Vec::new();
        let mut link_words = Vec::new();
        let mut link_ranks = Vec::new();
        for (stem, words) in &linked {
            let stem_id = term_id(*stem)?;
            for (position, word) in words.iter().enumerate() {
                link_stems.push(stem_id);
                link_words.push(term_id(word)?);
                link_ranks.push(to_index(position as u32 + 1)?);
            }
        }

        if !linked.is_empty() {
            // A word keeps the rank of the first import that mentions it
            sqlx::query(
                "UPDATE terms AS t SET rank = u.rank \
                 FROM (SELECT DISTINCT ON (id) id, rank \
                       FROM UNNEST($1::bigint[], $2::int[]) AS w(id, rank) ORDER BY id, rank) AS u \
                 WHERE t.id = u.id AND t.rank IS NULL",
            )
            .bind(&link_words)
            .bind(&link_ranks)
            .execute(&mut **tx)
            .await
            .map_err(db_error("rank original words"))?;

            // A stem keeps its first link, and only ever to a word ranked 1
            sqlx::query(
                "UPDATE terms AS s SET original_word_id = u.word_id \
                 FROM (SELECT DISTINCT ON (c.stem_id) c.stem_id, c.word_id \
                       FROM UNNEST($1::bigint[], $2::bigint[], $3::int[]) \
                            AS c(stem_id, word_id, position) \
                       JOIN terms w ON w.id = c.word_id \
                       WHERE w.rank = 1 \
                       ORDER BY c.stem_id, c.position) AS u \
                 WHERE s.id = u.stem_id AND s.original_word_id IS NULL",
            )
            .bind(&link_stems)
            .bind(&link_words)
            .bind(&link_ranks)
            .execute(&mut **tx)
            .await
            .map_err(db_error("link original words"))?;
        }

        debug!(
            model = %model.name(),
            terms = strings.len(),
            distributions = dist_terms.len(),
            "Model rows staged"
        );

        Ok(model)
    }

    async fn insert_comparison(
        tx: &mut Transaction<'_, Postgres>,
        import: &ComparisonImport,
    ) -> Result<Comparison, DomainError> {
        let (from_id, topics_from) = Self::model_id_by_name(tx, &import.model_from).await?;
        let (to_id, topics_to) = Self::model_id_by_name(tx, &import.model_to).await?;

        import.matrix.check_dimensions(
            &import.model_from,
            topics_from.len(),
            &import.model_to,
            topics_to.len(),
        )?;

        let row = sqlx::query(&format!(
            "INSERT INTO comparisons \
             (name, description, is_score, lower_bound, upper_bound, model_from_id, model_to_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            COMPARISON_COLUMNS
        ))
        .bind(&import.name)
        .bind(&import.description)
        .bind(import.is_score)
        .bind(import.lower_bound)
        .bind(import.upper_bound)
        .bind(from_id)
        .bind(to_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            insert_error("insert comparison", &format!("Comparison \"{}\"", import.name), e)
        })?;

        let comparison = comparison_from_row(&row)?;

        let (n_rows, n_cols) = import.matrix.shape();
        let mut edge_from = Vec::with_capacity(n_rows * n_cols);
        let mut edge_to = Vec::with_capacity(n_rows * n_cols);
        let mut edge_values = Vec::with_capacity(n_rows * n_cols);
        for edge in import.matrix.edges() {
            edge_from.push(topics_from[edge.from_index as usize]);
            edge_to.push(topics_to[edge.to_index as usize]);
            edge_values.push(edge.value);
        }

        sqlx::query(
            "INSERT INTO topics_comparisons (comparison_id, topic_from_id, topic_to_id, value) \
             SELECT $1, * FROM UNNEST($2::bigint[], $3::bigint[], $4::float8[])",
        )
        .bind(comparison.id)
        .bind(&edge_from)
        .bind(&edge_to)
        .bind(&edge_values)
        .execute(&mut **tx)
        .await
        .map_err(db_error("insert comparison edges"))?;

        Ok(comparison)
    }
}

#[async_trait]
impl LdaModelRepository for PostgresTopicStore {
    async fn get_by_id(&self, id: EntityId) -> Result<Option<LdaModel>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM lda_models WHERE id = $1", MODEL_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("get model"))?;

        row.as_ref().map(model_from_row).transpose()
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<LdaModel>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM lda_models WHERE name = $1",
            MODEL_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("get model"))?;

        row.as_ref().map(model_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<LdaModel>, DomainError> {
        let rows = sqlx::query(&format!("SELECT {} FROM lda_models ORDER BY id", MODEL_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list models"))?;

        rows.iter().map(model_from_row).collect()
    }
}

#[async_trait]
impl TopicRepository for PostgresTopicStore {
    async fn list_topics(&self, model_id: EntityId) -> Result<Vec<Topic>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, model_id, topic_index, keyphrase FROM topics \
             WHERE model_id = $1 ORDER BY topic_index",
        )
        .bind(model_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list topics"))?;

        rows.iter().map(topic_from_row).collect()
    }

    async fn term_rows(
        &self,
        model_id: EntityId,
        topic_indices: &[u32],
    ) -> Result<Vec<TopicTermRow>, DomainError> {
        let indices = topic_indices
            .iter()
            .copied()
            .map(to_index)
            .collect::<Result<Vec<i32>, _>>()?;

        let rows = sqlx::query(TERM_ROWS_QUERY)
            .bind(model_id)
            .bind(&indices)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("read topic terms"))?;

        let map = db_error("read topic term row");
        rows.iter()
            .map(|row| {
                let original: Option<String> = row.try_get("original_word").map_err(&map)?;
                let original_rank: Option<i32> = row.try_get("original_rank").map_err(&map)?;

                Ok(TopicTermRow {
                    topic_index: from_index(row.try_get("topic_index").map_err(&map)?)?,
                    term: row.try_get("term").map_err(&map)?,
                    original_word: original.map(|string| OriginalWord {
                        string,
                        rank: original_rank.and_then(|r| u32::try_from(r).ok()),
                    }),
                    value: row.try_get("value").map_err(&map)?,
                    rank: from_index(row.try_get("rank").map_err(&map)?)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ComparisonRepository for PostgresTopicStore {
    async fn find_for_model(&self, model_id: EntityId) -> Result<Option<Comparison>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM comparisons WHERE model_from_id = $1 OR model_to_id = $1 \
             ORDER BY id LIMIT 1",
            COMPARISON_COLUMNS
        ))
        .bind(model_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find comparison"))?;

        row.as_ref().map(comparison_from_row).transpose()
    }

    async fn edges_for_topic(
        &self,
        comparison_id: EntityId,
        side: ComparisonSide,
        topic_index: u32,
        floor: f64,
    ) -> Result<Vec<EvolutionEdge>, DomainError> {
        let query = match side {
            ComparisonSide::From => EDGES_FROM_QUERY,
            ComparisonSide::To => EDGES_TO_QUERY,
        };

        let rows = sqlx::query(query)
            .bind(comparison_id)
            .bind(to_index(topic_index)?)
            .bind(floor)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("read comparison edges"))?;

        let map = db_error("read comparison edge");
        rows.iter()
            .map(|row| {
                Ok(EvolutionEdge {
                    from_index: from_index(row.try_get("from_index").map_err(&map)?)?,
                    to_index: from_index(row.try_get("to_index").map_err(&map)?)?,
                    value: row.try_get("value").map_err(&map)?,
                })
            })
            .collect()
    }

    async fn max_similarity_by_target(
        &self,
        model_id: EntityId,
    ) -> Result<Vec<TopicSimilarity>, DomainError> {
        let rows = sqlx::query(MAX_SIMILARITY_QUERY)
            .bind(model_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("aggregate similarities"))?;

        rows.iter()
            .map(|row| {
                Ok(TopicSimilarity {
                    topic: topic_from_row(row)?,
                    max_value: row
                        .try_get("max_value")
                        .map_err(db_error("read similarity"))?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl IngestionRepository for PostgresTopicStore {
    async fn import_model(&self, import: ModelImport) -> Result<LdaModel, DomainError> {
        import.validate()?;

        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        // Dropping the transaction on error rolls it back
        let model = Self::insert_model(&mut tx, &import).await?;
        tx.commit().await.map_err(db_error("commit model import"))?;

        info!(model = %model.name(), topics = import.topics.len(), "Model imported");
        Ok(model)
    }

    async fn import_comparison(&self, import: ComparisonImport) -> Result<Comparison, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        let comparison = Self::insert_comparison(&mut tx, &import).await?;
        tx.commit().await.map_err(db_error("commit comparison import"))?;

        info!(comparison = %comparison.name, "Comparison imported");
        Ok(comparison)
    }
}

#[async_trait]
impl TopicStore for PostgresTopicStore {
    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error("ping database"))?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
