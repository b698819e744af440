//! Topic scoring contract and top-N selection

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

/// Probability of one topic for a scored document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopicProbability {
    pub topic: u32,
    pub value: f64,
}

/// Infers the topic distribution of a token sequence under a trained model
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TopicScorer: Send + Sync {
    /// Returns one entry per topic of the model, in topic order, with no
    /// probability floor applied
    async fn score(
        &self,
        tokens: &[String],
        model_path: &str,
    ) -> Result<Vec<TopicProbability>, DomainError>;
}

/// Keeps the `n` most probable topics, descending.
/// Equal probabilities keep their original topic order.
pub fn top_n_topics(mut probabilities: Vec<TopicProbability>, n: usize) -> Vec<TopicProbability> {
    probabilities.sort_by(|a, b| b.value.total_cmp(&a.value));
    probabilities.truncate(n);
    probabilities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(topic: u32, value: f64) -> TopicProbability {
        TopicProbability { topic, value }
    }

    #[test]
    fn test_top_n_descending() {
        let top = top_n_topics(vec![p(0, 0.1), p(1, 0.5), p(2, 0.3), p(3, 0.1)], 2);
        assert_eq!(top, vec![p(1, 0.5), p(2, 0.3)]);
    }

    #[test]
    fn test_top_n_ties_keep_topic_order() {
        let top = top_n_topics(vec![p(0, 0.2), p(1, 0.4), p(2, 0.2), p(3, 0.2)], 3);
        assert_eq!(top, vec![p(1, 0.4), p(0, 0.2), p(2, 0.2)]);
    }

    #[test]
    fn test_top_n_larger_than_input() {
        assert_eq!(top_n_topics(vec![p(0, 1.0)], 5).len(), 1);
        assert!(top_n_topics(vec![], 5).is_empty());
    }
}
