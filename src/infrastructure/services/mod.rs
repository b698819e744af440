//! Infrastructure services

mod ingestion_service;
mod text_analysis_service;
mod topic_query_service;

pub use ingestion_service::{
    ImportComparisonRequest, ImportModelRequest, IngestionService, IngestionServiceTrait,
    DEFAULT_TOP_N_TOPIC_TERMS,
};
pub use text_analysis_service::{
    TextAnalysis, TextAnalysisService, TextAnalysisServiceTrait, DEFAULT_TOP_N_DOCUMENT_TOPICS,
};
pub use topic_query_service::{
    ModelTopics, ModelTopicsRequest, TopicQueryConfig, TopicQueryService, TopicQueryServiceTrait,
};
