//! Ingestion service - imports trained models and comparison matrices into a topic store

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::{
    Comparison, ComparisonImport, ComparisonMatrix, DomainError, LdaModel, ModelImport, TopicStore,
};
use crate::infrastructure::lda::LdaArtifact;

/// Default number of terms stored per topic
pub const DEFAULT_TOP_N_TOPIC_TERMS: usize = 30;

/// Metadata accompanying a model artifact
#[derive(Debug, Clone, Default)]
pub struct ImportModelRequest {
    pub name: String,
    pub description: String,
    pub training_context: String,
    pub is_main: bool,
}

impl ImportModelRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_training_context(mut self, training_context: impl Into<String>) -> Self {
        self.training_context = training_context.into();
        self
    }

    pub fn with_main(mut self, is_main: bool) -> Self {
        self.is_main = is_main;
        self
    }
}

/// Metadata accompanying a comparison matrix
#[derive(Debug, Clone)]
pub struct ImportComparisonRequest {
    pub name: String,
    pub description: String,
    /// False when the matrix holds distances
    pub is_score: bool,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub model_from: String,
    pub model_to: String,
}

#[async_trait]
pub trait IngestionServiceTrait: Send + Sync + Debug {
    /// Imports the artifact at `path`, which is also recorded as the model path
    async fn import_model(
        &self,
        path: &Path,
        request: ImportModelRequest,
    ) -> Result<LdaModel, DomainError>;

    /// Imports the JSON matrix at `path`, rows being topics of the "from" model
    async fn import_comparison(
        &self,
        path: &Path,
        request: ImportComparisonRequest,
    ) -> Result<Comparison, DomainError>;
}

#[derive(Debug)]
pub struct IngestionService {
    store: Arc<dyn TopicStore>,
    top_n_topic_terms: usize,
}

impl IngestionService {
    pub fn new(store: Arc<dyn TopicStore>) -> Self {
        Self {
            store,
            top_n_topic_terms: DEFAULT_TOP_N_TOPIC_TERMS,
        }
    }

    pub fn with_top_n_topic_terms(mut self, top_n: usize) -> Self {
        self.top_n_topic_terms = top_n;
        self
    }

    /// Builds the import record of an already loaded artifact
    pub fn model_import(
        &self,
        artifact: &LdaArtifact,
        path: &str,
        request: ImportModelRequest,
    ) -> ModelImport {
        ModelImport::new(request.name, path)
            .with_description(request.description)
            .with_training_context(request.training_context)
            .with_main(request.is_main)
            .with_topics(artifact.topic_imports(self.top_n_topic_terms))
            .with_original_words(artifact.original_words.clone())
    }
}

/// Reads a JSON 2-D array of numbers
async fn read_matrix(path: &Path) -> Result<ComparisonMatrix, DomainError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        DomainError::internal(format!(
            "Failed to read comparison matrix {}: {}",
            path.display(),
            e
        ))
    })?;

    let rows: Vec<Vec<f64>> = serde_json::from_slice(&bytes).map_err(|e| {
        DomainError::validation(format!(
            "Comparison matrix {} is malformed: {}",
            path.display(),
            e
        ))
    })?;

    ComparisonMatrix::new(rows)
}

#[async_trait]
impl IngestionServiceTrait for IngestionService {
    async fn import_model(
        &self,
        path: &Path,
        request: ImportModelRequest,
    ) -> Result<LdaModel, DomainError> {
        info!(path = %path.display(), model = %request.name, "Importing model artifact");

        let artifact = LdaArtifact::load(path).await?;
        let import = self.model_import(&artifact, &path.to_string_lossy(), request);

        let model = self.store.import_model(import).await?;
        info!(
            model = %model.name(),
            id = model.id(),
            topics = artifact.num_topics,
            "Model artifact imported"
        );
        Ok(model)
    }

    async fn import_comparison(
        &self,
        path: &Path,
        request: ImportComparisonRequest,
    ) -> Result<Comparison, DomainError> {
        info!(
            path = %path.display(),
            from = %request.model_from,
            to = %request.model_to,
            "Importing comparison matrix"
        );

        let matrix = read_matrix(path).await?;
        let (rows, cols) = matrix.shape();
        let import = ComparisonImport::new(
            &request.name,
            request.description,
            request.is_score,
            request.lower_bound,
            request.upper_bound,
            request.model_from,
            request.model_to,
            matrix,
        )?;

        let comparison = self.store.import_comparison(import).await?;
        info!(
            comparison = %comparison.name,
            rows,
            cols,
            "Comparison matrix imported"
        );
        Ok(comparison)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::{KeyphrasePreference, TopicSelector};
    use crate::infrastructure::lda::artifact::tests::two_topic_artifact;
    use crate::infrastructure::services::{
        ModelTopicsRequest, TopicQueryService, TopicQueryServiceTrait,
    };
    use crate::infrastructure::storage::fixtures::{scenario_store, PRIOR_MODEL, TEST_MODEL};
    use crate::infrastructure::storage::InMemoryTopicStore;

    fn write_json(value: &impl serde::Serialize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(value).unwrap().as_bytes())
            .unwrap();
        file
    }

    fn comparison_request(name: &str) -> ImportComparisonRequest {
        ImportComparisonRequest {
            name: name.to_string(),
            description: "Jensen-Shannon".to_string(),
            is_score: false,
            lower_bound: 0.0,
            upper_bound: 1.0,
            model_from: PRIOR_MODEL.to_string(),
            model_to: TEST_MODEL.to_string(),
        }
    }

    #[tokio::test]
    async fn test_import_model_artifact() {
        let store = Arc::new(InMemoryTopicStore::new());
        let service = IngestionService::new(store.clone()).with_top_n_topic_terms(2);
        let file = write_json(&two_topic_artifact());

        let model = service
            .import_model(
                file.path(),
                ImportModelRequest::new("lda-2020").with_description("Snapshot 2020"),
            )
            .await
            .unwrap();

        assert_eq!(model.name(), "lda-2020");
        assert_eq!(model.path(), file.path().to_string_lossy());

        let queries = TopicQueryService::new(store);
        let topics = queries
            .model_topics(ModelTopicsRequest::new("lda-2020", TopicSelector::all()))
            .await
            .unwrap();

        assert_eq!(topics.topics.len(), 2);
        assert!(topics.topics.iter().all(|entry| entry.terms.len() == 2));
    }

    #[tokio::test]
    async fn test_model_import_rounds_and_caps_terms() {
        let service = IngestionService::new(Arc::new(InMemoryTopicStore::new()))
            .with_top_n_topic_terms(1);
        let artifact = two_topic_artifact();

        let import = service.model_import(
            &artifact,
            "/models/two.json",
            ImportModelRequest::new("two").with_main(true),
        );

        assert!(import.is_main);
        assert_eq!(import.topics.len(), 2);
        for topic in &import.topics {
            assert_eq!(topic.terms.len(), 1);
            assert!(topic.keyphrase.is_empty());
            let value = topic.terms[0].value;
            assert_eq!(value, (value * 1e5).round() / 1e5);
        }
    }

    #[tokio::test]
    async fn test_missing_artifact_is_internal_error() {
        let service = IngestionService::new(Arc::new(InMemoryTopicStore::new()));

        let err = service
            .import_model(Path::new("/nonexistent/model.json"), ImportModelRequest::new("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_import_comparison_matrix() {
        let store = scenario_store().await;
        let service = IngestionService::new(store);
        let file = write_json(&vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]]);

        let comparison = service
            .import_comparison(file.path(), comparison_request("Second Comparison"))
            .await
            .unwrap();

        assert_eq!(comparison.name, "second-comparison");
        assert!(!comparison.is_score);
    }

    #[tokio::test]
    async fn test_comparison_shape_mismatch_is_inconsistency() {
        let store = scenario_store().await;
        let service = IngestionService::new(store.clone());
        let file = write_json(&vec![vec![0.1, 0.2], vec![0.4, 0.5]]);

        let err = service
            .import_comparison(file.path(), comparison_request("bad-shape"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ConfigurationInconsistency { .. }));

        // The store still only answers with the original comparison
        let queries = TopicQueryService::new(store);
        let novel = queries
            .novel_topics(TEST_MODEL, Some(KeyphrasePreference::Available))
            .await
            .unwrap();
        assert_eq!(novel.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_matrix_is_validation_error() {
        let service = IngestionService::new(scenario_store().await);
        let file = write_json(&serde_json::json!({"rows": []}));

        let err = service
            .import_comparison(file.path(), comparison_request("malformed"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_inverted_bounds_are_rejected() {
        let service = IngestionService::new(scenario_store().await);
        let file = write_json(&vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]]);
        let mut request = comparison_request("inverted");
        request.lower_bound = 1.0;
        request.upper_bound = 0.0;

        let err = service
            .import_comparison(file.path(), request)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
