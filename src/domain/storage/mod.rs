//! Storage domain - the aggregate store every backend implements

use async_trait::async_trait;

use crate::domain::comparison::ComparisonRepository;
use crate::domain::ingestion::IngestionRepository;
use crate::domain::model::LdaModelRepository;
use crate::domain::topic::TopicRepository;
use crate::domain::DomainError;

/// Everything the services need from a backend
#[async_trait]
pub trait TopicStore:
    LdaModelRepository + TopicRepository + ComparisonRepository + IngestionRepository
{
    /// Cheap round trip used by readiness probes
    async fn ping(&self) -> Result<(), DomainError>;

    /// Backend name for logs
    fn backend(&self) -> &'static str;
}
