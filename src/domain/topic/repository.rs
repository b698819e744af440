//! Topic repository trait

use async_trait::async_trait;

use super::{Topic, TopicTermRow};
use crate::domain::model::EntityId;
use crate::domain::DomainError;

/// Read access to topics and their term distributions
#[async_trait]
pub trait TopicRepository: Send + Sync + std::fmt::Debug {
    /// All topics of a model, index-ascending
    async fn list_topics(&self, model_id: EntityId) -> Result<Vec<Topic>, DomainError>;

    /// Representative distribution rows for the given topic indices,
    /// ordered by topic index then rank
    async fn term_rows(
        &self,
        model_id: EntityId,
        topic_indices: &[u32],
    ) -> Result<Vec<TopicTermRow>, DomainError>;
}
