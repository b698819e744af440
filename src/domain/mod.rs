//! Domain layer - Core entities, repository contracts and the query engine

pub mod analysis;
pub mod comparison;
pub mod error;
pub mod ingestion;
pub mod model;
pub mod query;
pub mod storage;
pub mod topic;

pub use analysis::{top_n_topics, TextPreprocessor, TopicProbability, TopicScorer};
pub use comparison::{
    Comparison, ComparisonMatrix, ComparisonRepository, ComparisonSide, EvolutionEdge,
    TopicSimilarity, TopicsComparison,
};
pub use error::DomainError;
pub use ingestion::{ComparisonImport, IngestionRepository, ModelImport, TermImport, TopicImport};
pub use model::{select_main_model, EntityId, LdaModel, LdaModelRepository};
pub use query::{
    KeyphrasePreference, RangeMeta, ResolvedTopics, TopicEvolution, TopicSelector, TopicTermsMap,
};
pub use storage::TopicStore;
pub use topic::{OriginalWord, Term, Topic, TopicLabel, TopicRepository, TopicTermRow};
