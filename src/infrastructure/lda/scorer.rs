//! Topic scorer backed by artifacts on disk

use async_trait::async_trait;
use tracing::debug;

use super::LdaArtifact;
use crate::domain::analysis::{TopicProbability, TopicScorer};
use crate::domain::DomainError;

/// Loads the artifact at the model's path for every request and folds the
/// document into it
#[derive(Debug, Default, Clone)]
pub struct ArtifactTopicScorer;

impl ArtifactTopicScorer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TopicScorer for ArtifactTopicScorer {
    async fn score(
        &self,
        tokens: &[String],
        model_path: &str,
    ) -> Result<Vec<TopicProbability>, DomainError> {
        let artifact = LdaArtifact::load(model_path).await?;
        let bow = artifact.doc2bow(tokens);

        debug!(
            tokens = tokens.len(),
            known = bow.len(),
            "Scoring document against {}",
            model_path
        );

        Ok(artifact
            .document_topics(&bow)
            .into_iter()
            .enumerate()
            .map(|(topic, value)| TopicProbability {
                topic: topic as u32,
                value,
            })
            .collect())
    }
}
