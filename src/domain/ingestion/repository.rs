//! Ingestion repository trait

use async_trait::async_trait;

use super::{ComparisonImport, ModelImport};
use crate::domain::comparison::Comparison;
use crate::domain::model::LdaModel;
use crate::domain::DomainError;

/// Write path for whole aggregates. Each call is one atomic unit: on failure
/// nothing of the aggregate becomes visible.
#[async_trait]
pub trait IngestionRepository: Send + Sync + std::fmt::Debug {
    /// Stores a model with its topics, terms and distributions.
    /// Fails with a conflict if the model name is taken.
    async fn import_model(&self, import: ModelImport) -> Result<LdaModel, DomainError>;

    /// Stores a comparison and its full edge matrix. Both models must exist
    /// and the matrix must match their topic counts.
    async fn import_comparison(&self, import: ComparisonImport) -> Result<Comparison, DomainError>;
}
