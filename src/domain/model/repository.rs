//! LDA model repository trait

use async_trait::async_trait;

use super::{EntityId, LdaModel};
use crate::domain::DomainError;

/// Read access to registered LDA models
#[async_trait]
pub trait LdaModelRepository: Send + Sync + std::fmt::Debug {
    /// Get a model by its storage identifier
    async fn get_by_id(&self, id: EntityId) -> Result<Option<LdaModel>, DomainError>;

    /// Get a model by its unique name
    async fn get_by_name(&self, name: &str) -> Result<Option<LdaModel>, DomainError>;

    /// List all models ordered by identifier
    async fn list(&self) -> Result<Vec<LdaModel>, DomainError>;
}
