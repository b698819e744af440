//! Application state for shared services

use std::sync::Arc;

use crate::domain::analysis::{TextPreprocessor, TopicScorer};
use crate::domain::TopicStore;
use crate::infrastructure::services::{
    TextAnalysisService, TextAnalysisServiceTrait, TopicQueryConfig, TopicQueryService,
    TopicQueryServiceTrait,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub topic_service: Arc<dyn TopicQueryServiceTrait>,
    pub analysis_service: Arc<dyn TextAnalysisServiceTrait>,
    /// Probed by the readiness check
    pub store: Arc<dyn TopicStore>,
}

impl AppState {
    pub fn new(
        topic_service: Arc<dyn TopicQueryServiceTrait>,
        analysis_service: Arc<dyn TextAnalysisServiceTrait>,
        store: Arc<dyn TopicStore>,
    ) -> Self {
        Self {
            topic_service,
            analysis_service,
            store,
        }
    }

    /// Wires the default services over one store
    pub fn from_store(
        store: Arc<dyn TopicStore>,
        preprocessor: Arc<dyn TextPreprocessor>,
        scorer: Arc<dyn TopicScorer>,
        query_config: TopicQueryConfig,
        top_n_document_topics: usize,
    ) -> Self {
        let topic_service =
            TopicQueryService::new(store.clone()).with_config(query_config);
        let analysis_service = TextAnalysisService::new(store.clone(), preprocessor, scorer)
            .with_top_n(top_n_document_topics);

        Self::new(Arc::new(topic_service), Arc::new(analysis_service), store)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend())
            .finish()
    }
}
