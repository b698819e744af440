//! Comparison repository trait

use async_trait::async_trait;

use super::{Comparison, ComparisonSide, EvolutionEdge, TopicSimilarity};
use crate::domain::model::EntityId;
use crate::domain::DomainError;

/// Read access to stored topic comparisons
#[async_trait]
pub trait ComparisonRepository: Send + Sync + std::fmt::Debug {
    /// The comparison referencing the model on either side.
    /// When several exist the one with the lowest identifier is returned.
    async fn find_for_model(&self, model_id: EntityId) -> Result<Option<Comparison>, DomainError>;

    /// Edges touching `topic_index` on the given side whose value is at least `floor`,
    /// ordered by the counterpart topic index
    async fn edges_for_topic(
        &self,
        comparison_id: EntityId,
        side: ComparisonSide,
        topic_index: u32,
        floor: f64,
    ) -> Result<Vec<EvolutionEdge>, DomainError>;

    /// Maximum edge value per target topic of the model, over every comparison
    /// in which the model is the "to" side. Topics without edges are absent.
    async fn max_similarity_by_target(
        &self,
        model_id: EntityId,
    ) -> Result<Vec<TopicSimilarity>, DomainError>;
}
