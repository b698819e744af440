//! Topic query service - model topics, novelty and evolution over a topic store

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::query::{
    assemble_term_rankings, build_evolution_graph, novel_topics, DEFAULT_SIMILARITY_THRESHOLD,
    EVOLUTION_EDGE_FLOOR,
};
use crate::domain::{
    select_main_model, ComparisonSide, DomainError, KeyphrasePreference, LdaModel, RangeMeta,
    TopicEvolution, TopicLabel, TopicSelector, TopicStore, TopicTermsMap,
};
use crate::infrastructure::observability::record_topic_query;

const NO_RESULTS_MESSAGE: &str = "Query returned no results";

/// Looks a model up by name, or picks the main model when the name is absent or blank
pub(crate) async fn find_model(
    store: &dyn TopicStore,
    name: Option<&str>,
) -> Result<LdaModel, DomainError> {
    match name.filter(|name| !name.trim().is_empty()) {
        Some(name) => store.get_by_name(name).await?.ok_or_else(|| {
            DomainError::not_found(format!("Requested model \"{}\" does not exist", name))
        }),
        None => {
            let models = store.list().await?;
            select_main_model(&models)
                .cloned()
                .ok_or_else(|| DomainError::not_found("No topic model has been imported"))
        }
    }
}

/// Counts one engine operation by its outcome
fn observe<T>(kind: &'static str, result: Result<T, DomainError>) -> Result<T, DomainError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    record_topic_query(kind, outcome);
    result
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicQueryConfig {
    /// Topics whose best match stays below this value are novel
    pub similarity_threshold: f64,
}

impl Default for TopicQueryConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Already parsed topic query against a named model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTopicsRequest {
    pub model_name: String,
    pub selector: TopicSelector,
    pub n_terms: Option<usize>,
    pub preference: Option<KeyphrasePreference>,
}

impl ModelTopicsRequest {
    pub fn new(model_name: impl Into<String>, selector: TopicSelector) -> Self {
        Self {
            model_name: model_name.into(),
            selector,
            n_terms: None,
            preference: None,
        }
    }

    pub fn with_n_terms(mut self, n_terms: Option<usize>) -> Self {
        self.n_terms = n_terms;
        self
    }

    pub fn with_preference(mut self, preference: Option<KeyphrasePreference>) -> Self {
        self.preference = preference;
        self
    }
}

/// A model together with the term lists of the selected topics
#[derive(Debug, Clone)]
pub struct ModelTopics {
    pub model: LdaModel,
    pub topics: TopicTermsMap,
    /// Present when the selection was an explicit range
    pub window: Option<RangeMeta>,
    pub n_terms: Option<usize>,
}

/// Read-only queries over imported models
#[async_trait]
pub trait TopicQueryServiceTrait: Send + Sync + Debug {
    /// Every imported model, id-ascending
    async fn list_models(&self) -> Result<Vec<LdaModel>, DomainError>;

    /// All topics of the main model, labelled with the `available` policy
    async fn main_model_topics(&self) -> Result<ModelTopics, DomainError>;

    async fn model_topics(&self, request: ModelTopicsRequest) -> Result<ModelTopics, DomainError>;

    async fn novel_topics(
        &self,
        model_name: &str,
        preference: Option<KeyphrasePreference>,
    ) -> Result<Vec<TopicLabel>, DomainError>;

    async fn topic_evolution(
        &self,
        model_name: &str,
        topic_index: u32,
    ) -> Result<TopicEvolution, DomainError>;
}

#[derive(Debug)]
pub struct TopicQueryService {
    store: Arc<dyn TopicStore>,
    config: TopicQueryConfig,
}

impl TopicQueryService {
    pub fn new(store: Arc<dyn TopicStore>) -> Self {
        Self {
            store,
            config: TopicQueryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TopicQueryConfig) -> Self {
        self.config = config;
        self
    }

    async fn collect_topics(
        &self,
        model: LdaModel,
        selector: &TopicSelector,
        n_terms: Option<usize>,
        preference: Option<KeyphrasePreference>,
    ) -> Result<ModelTopics, DomainError> {
        let topics = self.store.list_topics(model.id()).await?;
        let resolved = selector.resolve(model.name(), &topics)?;

        // Results of a keyphrase query are keyed by that keyphrase
        let preference = preference.or_else(|| {
            selector
                .is_keyphrase()
                .then_some(KeyphrasePreference::Available)
        });

        let rows = self
            .store
            .term_rows(model.id(), &resolved.indices())
            .await?;
        let terms = assemble_term_rankings(&resolved.topics, &rows, n_terms, preference);

        Ok(ModelTopics {
            model,
            topics: terms,
            window: resolved.window,
            n_terms,
        })
    }

    async fn query_novel_topics(
        &self,
        model_name: &str,
        preference: Option<KeyphrasePreference>,
    ) -> Result<Vec<TopicLabel>, DomainError> {
        let model = find_model(self.store.as_ref(), Some(model_name)).await?;
        let similarities = self.store.max_similarity_by_target(model.id()).await?;

        let labels = novel_topics(&similarities, self.config.similarity_threshold, preference);
        if labels.is_empty() {
            return Err(DomainError::not_found(NO_RESULTS_MESSAGE));
        }

        Ok(labels)
    }

    async fn query_evolution(
        &self,
        model_name: &str,
        topic_index: u32,
    ) -> Result<TopicEvolution, DomainError> {
        let model = find_model(self.store.as_ref(), Some(model_name)).await?;

        let topics = self.store.list_topics(model.id()).await?;
        if !topics.iter().any(|topic| topic.index == topic_index) {
            return Err(DomainError::not_found(format!(
                "Requested topic does not exist in model \"{}\"",
                model_name
            )));
        }

        let comparison = self
            .store
            .find_for_model(model.id())
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "No comparison has been imported for model \"{}\"",
                    model_name
                ))
            })?;

        let side = comparison.side_of(model.id()).ok_or_else(|| {
            DomainError::internal(format!(
                "Comparison \"{}\" does not reference model \"{}\"",
                comparison.name, model_name
            ))
        })?;

        let counterpart_id = match side {
            ComparisonSide::From => comparison.model_to_id,
            ComparisonSide::To => comparison.model_from_id,
        };
        let counterpart = self.store.get_by_id(counterpart_id).await?.ok_or_else(|| {
            DomainError::internal(format!(
                "Comparison \"{}\" references a missing model",
                comparison.name
            ))
        })?;

        let (model_from, model_to) = match side {
            ComparisonSide::From => (&model, &counterpart),
            ComparisonSide::To => (&counterpart, &model),
        };

        let edges = self
            .store
            .edges_for_topic(comparison.id, side, topic_index, EVOLUTION_EDGE_FLOOR)
            .await?;
        let parents = build_evolution_graph(
            side,
            topic_index,
            model_from.name(),
            model_to.name(),
            &edges,
        );

        Ok(TopicEvolution {
            model: model.name().to_string(),
            topic: topic_index,
            model0_description: model_from.description().to_string(),
            model1_description: model_to.description().to_string(),
            parents,
        })
    }
}

#[async_trait]
impl TopicQueryServiceTrait for TopicQueryService {
    async fn list_models(&self) -> Result<Vec<LdaModel>, DomainError> {
        debug!("Listing models");
        self.store.list().await
    }

    async fn main_model_topics(&self) -> Result<ModelTopics, DomainError> {
        debug!("Querying main model topics");

        let result = async {
            let model = find_model(self.store.as_ref(), None).await?;
            self.collect_topics(
                model,
                &TopicSelector::all(),
                None,
                Some(KeyphrasePreference::Available),
            )
            .await
        }
        .await;

        observe("main_model", result)
    }

    async fn model_topics(&self, request: ModelTopicsRequest) -> Result<ModelTopics, DomainError> {
        debug!(
            model = %request.model_name,
            selector = ?request.selector,
            n_terms = ?request.n_terms,
            "Querying model topics"
        );

        let result = async {
            let model = find_model(self.store.as_ref(), Some(&request.model_name)).await?;
            let topics = self
                .collect_topics(model, &request.selector, request.n_terms, request.preference)
                .await?;

            if topics.topics.is_empty() {
                return Err(DomainError::not_found(NO_RESULTS_MESSAGE));
            }
            Ok(topics)
        }
        .await;

        observe("model_topics", result)
    }

    async fn novel_topics(
        &self,
        model_name: &str,
        preference: Option<KeyphrasePreference>,
    ) -> Result<Vec<TopicLabel>, DomainError> {
        debug!(model = %model_name, "Querying novel topics");
        observe(
            "novel_topics",
            self.query_novel_topics(model_name, preference).await,
        )
    }

    async fn topic_evolution(
        &self,
        model_name: &str,
        topic_index: u32,
    ) -> Result<TopicEvolution, DomainError> {
        debug!(model = %model_name, topic = topic_index, "Querying topic evolution");
        observe(
            "topic_evolution",
            self.query_evolution(model_name, topic_index).await,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::TermWeight;
    use crate::infrastructure::storage::fixtures::{scenario_store, PRIOR_MODEL, TEST_MODEL};
    use crate::infrastructure::storage::InMemoryTopicStore;

    async fn create_service() -> TopicQueryService {
        TopicQueryService::new(scenario_store().await)
    }

    fn labels(topics: &ModelTopics) -> Vec<TopicLabel> {
        topics.topics.iter().map(|entry| entry.label.clone()).collect()
    }

    fn range(offset: Option<u64>, limit: Option<u64>) -> TopicSelector {
        TopicSelector::Range { offset, limit }
    }

    #[tokio::test]
    async fn test_list_models() {
        let service = create_service().await;

        let models = service.list_models().await.unwrap();

        assert_eq!(models.len(), 2);
        assert_eq!(models[1].name(), TEST_MODEL);
    }

    #[tokio::test]
    async fn test_range_query_reports_window() {
        let service = create_service().await;
        let request = ModelTopicsRequest::new(TEST_MODEL, range(Some(1), Some(2)));

        let topics = service.model_topics(request).await.unwrap();

        assert_eq!(labels(&topics), vec![TopicLabel::Index(1), TopicLabel::Index(2)]);
        assert_eq!(topics.window, Some(RangeMeta { offset: 1, limit: 2 }));
        assert_eq!(topics.model.description(), "Test description");
    }

    #[tokio::test]
    async fn test_range_limit_is_clamped() {
        let service = create_service().await;
        let request = ModelTopicsRequest::new(TEST_MODEL, range(Some(1), Some(324015)));

        let topics = service.model_topics(request).await.unwrap();

        assert_eq!(topics.topics.len(), 2);
        assert_eq!(topics.window, Some(RangeMeta { offset: 1, limit: 2 }));
    }

    #[tokio::test]
    async fn test_term_cap_keeps_highest_weights_ascending() {
        let service = create_service().await;
        let request =
            ModelTopicsRequest::new(TEST_MODEL, TopicSelector::Index(1)).with_n_terms(Some(2));

        let topics = service.model_topics(request).await.unwrap();
        let terms = topics.topics.get(&TopicLabel::Index(1)).unwrap();

        assert_eq!(
            terms,
            &[
                TermWeight {
                    term: "term1".to_string(),
                    value: 0.3
                },
                TermWeight {
                    term: "term0".to_string(),
                    value: 0.4
                },
            ]
        );
        assert!(topics.window.is_none());
    }

    #[tokio::test]
    async fn test_keyphrase_query_is_keyed_by_keyphrase() {
        let service = create_service().await;
        let request = ModelTopicsRequest::new(
            TEST_MODEL,
            TopicSelector::Keyphrase("topic-one".to_string()),
        );

        let topics = service.model_topics(request).await.unwrap();

        assert_eq!(
            labels(&topics),
            vec![TopicLabel::Keyphrase("topic-one".to_string())]
        );
    }

    #[tokio::test]
    async fn test_prefer_all_falls_back_to_indices() {
        let service = create_service().await;
        let request = ModelTopicsRequest::new(TEST_MODEL, TopicSelector::all())
            .with_preference(Some(KeyphrasePreference::All));

        let topics = service.model_topics(request).await.unwrap();

        assert_eq!(
            labels(&topics),
            vec![
                TopicLabel::Index(0),
                TopicLabel::Index(1),
                TopicLabel::Index(2)
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_model_is_not_found() {
        let service = create_service().await;
        let request = ModelTopicsRequest::new("missing", TopicSelector::all());

        let err = service.model_topics(request).await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(err.message(), "Requested model \"missing\" does not exist");
    }

    #[tokio::test]
    async fn test_offset_past_end_is_not_found() {
        let service = create_service().await;
        let request = ModelTopicsRequest::new(TEST_MODEL, range(Some(3), None));

        let err = service.model_topics(request).await.unwrap_err();

        assert_eq!(
            err.message(),
            "Offset exceeds the total number of topics of model \"test-name\""
        );
    }

    #[tokio::test]
    async fn test_main_model_topics_use_available_keyphrases() {
        let service = create_service().await;

        let topics = service.main_model_topics().await.unwrap();

        assert_eq!(topics.model.name(), TEST_MODEL);
        assert_eq!(
            labels(&topics),
            vec![
                TopicLabel::Index(0),
                TopicLabel::Keyphrase("topic-one".to_string()),
                TopicLabel::Index(2)
            ]
        );
    }

    #[tokio::test]
    async fn test_main_model_on_empty_store_is_not_found() {
        let service = TopicQueryService::new(Arc::new(InMemoryTopicStore::new()));

        let err = service.main_model_topics().await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_novel_topics_below_threshold() {
        let service = create_service().await;

        let novel = service.novel_topics(TEST_MODEL, None).await.unwrap();

        assert_eq!(novel, vec![TopicLabel::Index(1)]);

        let novel = service
            .novel_topics(TEST_MODEL, Some(KeyphrasePreference::Available))
            .await
            .unwrap();
        assert_eq!(novel, vec![TopicLabel::Keyphrase("topic-one".to_string())]);
    }

    #[tokio::test]
    async fn test_no_novel_topics_is_not_found() {
        let service = TopicQueryService::new(scenario_store().await).with_config(
            TopicQueryConfig {
                similarity_threshold: 0.1,
            },
        );

        let err = service.novel_topics(TEST_MODEL, None).await.unwrap_err();

        assert_eq!(err.message(), "Query returned no results");
    }

    #[tokio::test]
    async fn test_model_without_incoming_edges_has_no_novel_topics() {
        let service = create_service().await;

        let err = service.novel_topics(PRIOR_MODEL, None).await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_evolution_from_side() {
        let service = create_service().await;

        let evolution = service.topic_evolution(PRIOR_MODEL, 0).await.unwrap();

        assert_eq!(evolution.model, PRIOR_MODEL);
        assert_eq!(evolution.model0_description, "Prior snapshot");
        assert_eq!(evolution.model1_description, "Test description");
        assert_eq!(evolution.parents.len(), 1);

        let root = &evolution.parents[0];
        assert!(root.node.highlight);
        let children: Vec<(u32, f64)> = root
            .associations
            .iter()
            .map(|a| (a.child.topic, a.label))
            .collect();
        assert_eq!(children, vec![(0, 0.8), (2, 0.3)]);
    }

    #[tokio::test]
    async fn test_evolution_to_side() {
        let service = create_service().await;

        let evolution = service.topic_evolution(TEST_MODEL, 1).await.unwrap();

        assert_eq!(evolution.parents.len(), 1);
        let parent = &evolution.parents[0];
        assert_eq!(parent.node.topic, 1);
        assert_eq!(parent.node.model_name, PRIOR_MODEL);
        assert!(!parent.node.highlight);
        assert_eq!(parent.associations[0].child.model_name, TEST_MODEL);
        assert!(parent.associations[0].child.highlight);
        assert_eq!(parent.associations[0].label, 0.15);
    }

    #[tokio::test]
    async fn test_evolution_unknown_topic_is_not_found() {
        let service = create_service().await;

        let err = service.topic_evolution(TEST_MODEL, 7).await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_evolution_without_comparison_is_not_found() {
        use crate::domain::ingestion::{IngestionRepository, ModelImport, TermImport, TopicImport};

        let store = scenario_store().await;
        let lone = ModelImport::new("lone", "/models/lone.json").with_topics(vec![TopicImport {
            keyphrase: String::new(),
            terms: vec![TermImport {
                term: "term0".to_string(),
                value: 1.0,
            }],
        }]);
        store.import_model(lone).await.unwrap();
        let service = TopicQueryService::new(store);

        let err = service.topic_evolution("lone", 0).await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
