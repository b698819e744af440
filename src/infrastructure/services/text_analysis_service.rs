//! Text analysis service - scores free text against a stored model

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::topic_query_service::find_model;
use crate::domain::analysis::{top_n_topics, TextPreprocessor, TopicProbability, TopicScorer};
use crate::domain::{DomainError, TopicStore};
use crate::infrastructure::observability::{record_text_analysis, record_topic_query};

/// Default number of topics reported per analyzed text
pub const DEFAULT_TOP_N_DOCUMENT_TOPICS: usize = 5;

/// Most probable topics of one analyzed text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAnalysis {
    pub model: String,
    /// Descending by probability, at most the configured number of entries
    pub topics: Vec<TopicProbability>,
}

#[async_trait]
pub trait TextAnalysisServiceTrait: Send + Sync + fmt::Debug {
    /// Scores `text` against the named model, or the main model when no name is given
    async fn analyze(&self, text: &str, model_name: Option<&str>)
        -> Result<TextAnalysis, DomainError>;
}

pub struct TextAnalysisService {
    store: Arc<dyn TopicStore>,
    preprocessor: Arc<dyn TextPreprocessor>,
    scorer: Arc<dyn TopicScorer>,
    top_n: usize,
}

impl fmt::Debug for TextAnalysisService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextAnalysisService")
            .field("store", &self.store.backend())
            .field("top_n", &self.top_n)
            .finish()
    }
}

impl TextAnalysisService {
    pub fn new(
        store: Arc<dyn TopicStore>,
        preprocessor: Arc<dyn TextPreprocessor>,
        scorer: Arc<dyn TopicScorer>,
    ) -> Self {
        Self {
            store,
            preprocessor,
            scorer,
            top_n: DEFAULT_TOP_N_DOCUMENT_TOPICS,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    async fn score_text(
        &self,
        text: &str,
        model_name: Option<&str>,
    ) -> Result<TextAnalysis, DomainError> {
        let model = find_model(self.store.as_ref(), model_name).await?;
        let tokens = self.preprocessor.preprocess(text)?;

        let started = Instant::now();
        let probabilities = self.scorer.score(&tokens, model.path()).await?;
        record_text_analysis(model.name(), started.elapsed());

        debug!(
            model = %model.name(),
            tokens = tokens.len(),
            topics = probabilities.len(),
            "Text scored"
        );

        Ok(TextAnalysis {
            model: model.name().to_string(),
            topics: top_n_topics(probabilities, self.top_n),
        })
    }
}

#[async_trait]
impl TextAnalysisServiceTrait for TextAnalysisService {
    async fn analyze(
        &self,
        text: &str,
        model_name: Option<&str>,
    ) -> Result<TextAnalysis, DomainError> {
        let result = self.score_text(text, model_name).await;

        match &result {
            Ok(_) => record_topic_query("analyze_text", "ok"),
            Err(e) => {
                if let DomainError::Preprocessing { message } = e {
                    warn!(reason = %message, "Text rejected by preprocessing");
                }
                record_topic_query("analyze_text", e.kind());
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{MockTextPreprocessor, MockTopicScorer};
    use crate::infrastructure::storage::fixtures::{scenario_store, TEST_MODEL};

    fn tokens() -> Vec<String> {
        ["topic", "model", "evolut"].iter().map(|s| s.to_string()).collect()
    }

    fn probabilities(values: &[f64]) -> Vec<TopicProbability> {
        values
            .iter()
            .enumerate()
            .map(|(topic, value)| TopicProbability {
                topic: topic as u32,
                value: *value,
            })
            .collect()
    }

    async fn create_service(
        preprocessor: MockTextPreprocessor,
        scorer: MockTopicScorer,
    ) -> TextAnalysisService {
        TextAnalysisService::new(scenario_store().await, Arc::new(preprocessor), Arc::new(scorer))
    }

    #[tokio::test]
    async fn test_analyze_returns_top_topics_of_main_model() {
        let mut preprocessor = MockTextPreprocessor::new();
        preprocessor
            .expect_preprocess()
            .returning(|_| Ok(tokens()));

        let mut scorer = MockTopicScorer::new();
        scorer
            .expect_score()
            .withf(|tokens, path| tokens.len() == 3 && path == "/models/test-name.json")
            .times(1)
            .returning(|_, _| Ok(probabilities(&[0.2, 0.5, 0.3])));

        let service = create_service(preprocessor, scorer).await.with_top_n(2);

        let analysis = service.analyze("some text", None).await.unwrap();

        assert_eq!(analysis.model, TEST_MODEL);
        assert_eq!(
            analysis.topics,
            vec![
                TopicProbability {
                    topic: 1,
                    value: 0.5
                },
                TopicProbability {
                    topic: 2,
                    value: 0.3
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_preprocessing_error_skips_scoring() {
        let mut preprocessor = MockTextPreprocessor::new();
        preprocessor
            .expect_preprocess()
            .withf(|text| text.is_empty())
            .returning(|_| {
                Err(DomainError::preprocessing(
                    "Text is either empty or in an unknown encoding",
                ))
            });

        let mut scorer = MockTopicScorer::new();
        scorer.expect_score().never();

        let service = create_service(preprocessor, scorer).await;

        let err = service.analyze("", Some(TEST_MODEL)).await.unwrap_err();

        assert!(matches!(err, DomainError::Preprocessing { .. }));
    }

    #[tokio::test]
    async fn test_unknown_model_is_not_found() {
        let mut preprocessor = MockTextPreprocessor::new();
        preprocessor.expect_preprocess().never();
        let mut scorer = MockTopicScorer::new();
        scorer.expect_score().never();

        let service = create_service(preprocessor, scorer).await;

        let err = service.analyze("text", Some("missing")).await.unwrap_err();

        assert_eq!(err.message(), "Requested model \"missing\" does not exist");
    }

    #[tokio::test]
    async fn test_blank_model_name_uses_main_model() {
        let mut preprocessor = MockTextPreprocessor::new();
        preprocessor
            .expect_preprocess()
            .returning(|_| Ok(tokens()));
        let mut scorer = MockTopicScorer::new();
        scorer
            .expect_score()
            .withf(|_, path| path == "/models/test-name.json")
            .times(2)
            .returning(|_, _| Ok(probabilities(&[0.5, 0.5])));

        let service = create_service(preprocessor, scorer).await;

        for name in ["", "   "] {
            let analysis = service.analyze("text", Some(name)).await.unwrap();
            assert_eq!(analysis.model, TEST_MODEL);
        }
    }

    #[tokio::test]
    async fn test_equal_probabilities_keep_topic_order() {
        let mut preprocessor = MockTextPreprocessor::new();
        preprocessor
            .expect_preprocess()
            .returning(|_| Ok(tokens()));
        let mut scorer = MockTopicScorer::new();
        scorer
            .expect_score()
            .returning(|_, _| Ok(probabilities(&[0.25, 0.5, 0.25])));

        let service = create_service(preprocessor, scorer).await;

        let analysis = service.analyze("text", Some(TEST_MODEL)).await.unwrap();
        let order: Vec<u32> = analysis.topics.iter().map(|t| t.topic).collect();

        assert_eq!(order, vec![1, 0, 2]);
    }
}
