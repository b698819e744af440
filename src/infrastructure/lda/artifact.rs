//! Trained LDA artifact reader and fold-in inference

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ingestion::TopicImport;
use crate::domain::DomainError;

const INFERENCE_ITERATIONS: usize = 50;
const CONVERGENCE_TOLERANCE: f64 = 1e-6;

/// Dirichlet prior over document topics, symmetric or per topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Alpha {
    Symmetric(f64),
    PerTopic(Vec<f64>),
}

/// Serialized output of the external training pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdaArtifact {
    pub num_topics: usize,
    pub alpha: Alpha,
    /// Vocabulary; position is the word id
    pub id2word: Vec<String>,
    /// `topics[k][w]`: probability of word `w` under topic `k`
    pub topics: Vec<Vec<f64>>,
    /// Stem → ranked unstemmed surface forms
    #[serde(default)]
    pub original_words: BTreeMap<String, Vec<String>>,
}

impl LdaArtifact {
    /// Reads and validates an artifact from disk
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DomainError::internal(format!(
                "Failed to read model artifact {}: {}",
                path.display(),
                e
            ))
        })?;

        let artifact: Self = serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::validation(format!(
                "Model artifact {} is malformed: {}",
                path.display(),
                e
            ))
        })?;

        artifact.validate()?;
        debug!(
            path = %path.display(),
            topics = artifact.num_topics,
            vocabulary = artifact.id2word.len(),
            "Model artifact loaded"
        );
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.num_topics == 0 {
            return Err(DomainError::validation("Model artifact has no topics"));
        }

        if self.topics.len() != self.num_topics {
            return Err(DomainError::validation(format!(
                "Model artifact declares {} topics but holds {}",
                self.num_topics,
                self.topics.len()
            )));
        }

        let vocabulary = self.id2word.len();
        if let Some(k) = self.topics.iter().position(|row| row.len() != vocabulary) {
            return Err(DomainError::validation(format!(
                "Topic {} does not cover the {} words of the vocabulary",
                k, vocabulary
            )));
        }

        if self.topics.iter().flatten().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(DomainError::validation(
                "Model artifact holds negative or non-finite topic weights",
            ));
        }

        let alpha_ok = match &self.alpha {
            Alpha::Symmetric(a) => a.is_finite() && *a > 0.0,
            Alpha::PerTopic(values) => {
                values.len() == self.num_topics && values.iter().all(|a| a.is_finite() && *a > 0.0)
            }
        };
        if !alpha_ok {
            return Err(DomainError::validation(
                "Model artifact alpha must be positive and match the number of topics",
            ));
        }

        Ok(())
    }

    fn alpha(&self) -> Vec<f64> {
        match &self.alpha {
            Alpha::Symmetric(a) => vec![*a; self.num_topics],
            Alpha::PerTopic(values) => values.clone(),
        }
    }

    /// Bag of words over the vocabulary; unknown tokens are ignored.
    /// Sorted by word id.
    pub fn doc2bow<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<(usize, u32)> {
        let word_ids: HashMap<&str, usize> = self
            .id2word
            .iter()
            .enumerate()
            .map(|(id, word)| (word.as_str(), id))
            .collect();

        let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
        for token in tokens {
            if let Some(id) = word_ids.get(token.as_ref()) {
                *counts.entry(*id).or_insert(0) += 1;
            }
        }

        counts.into_iter().collect()
    }

    /// Document-topic distribution for a bag of words, one entry per topic.
    ///
    /// The topic-word matrix stays fixed while the document's topic mixture is
    /// re-estimated by EM, starting from the prior.
    pub fn document_topics(&self, bow: &[(usize, u32)]) -> Vec<f64> {
        let alpha = self.alpha();
        let alpha_sum: f64 = alpha.iter().sum();
        let mut theta: Vec<f64> = alpha.iter().map(|a| a / alpha_sum).collect();

        let n_words: f64 = bow.iter().map(|(_, count)| f64::from(*count)).sum();
        if n_words == 0.0 {
            return theta;
        }

        let mut expected = vec![0.0; self.num_topics];
        for _ in 0..INFERENCE_ITERATIONS {
            expected.iter_mut().for_each(|e| *e = 0.0);

            for &(word, count) in bow {
                let weights: Vec<f64> = (0..self.num_topics)
                    .map(|k| theta[k] * self.topics[k][word])
                    .collect();
                let norm: f64 = weights.iter().sum();
                if norm <= 0.0 {
                    continue;
                }

                for (k, weight) in weights.iter().enumerate() {
                    expected[k] += f64::from(count) * weight / norm;
                }
            }

            let total = alpha_sum + expected.iter().sum::<f64>();
            let mut change: f64 = 0.0;
            for k in 0..self.num_topics {
                let next = (alpha[k] + expected[k]) / total;
                change = change.max((next - theta[k]).abs());
                theta[k] = next;
            }

            if change < CONVERGENCE_TOLERANCE {
                break;
            }
        }

        theta
    }

    /// The `n` heaviest words of topic `k`, heaviest first
    pub fn topic_terms(&self, k: usize, n: usize) -> Vec<(String, f64)> {
        let Some(row) = self.topics.get(k) else {
            return Vec::new();
        };

        let mut weighted: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
        weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        weighted
            .into_iter()
            .take(n)
            .map(|(id, weight)| (self.id2word[id].clone(), weight))
            .collect()
    }

    /// Every topic as an ingestion record keeping its `top_n` terms
    pub fn topic_imports(&self, top_n: usize) -> Vec<TopicImport> {
        (0..self.num_topics)
            .map(|k| TopicImport::from_weights("", self.topic_terms(k, top_n), top_n))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two well separated topics over a four-word vocabulary
    pub(crate) fn two_topic_artifact() -> LdaArtifact {
        LdaArtifact {
            num_topics: 2,
            alpha: Alpha::Symmetric(0.5),
            id2word: vec!["market".into(), "price".into(), "gene".into(), "cell".into()],
            topics: vec![vec![0.5, 0.45, 0.025, 0.025], vec![0.025, 0.025, 0.5, 0.45]],
            original_words: BTreeMap::from([("price".to_string(), vec!["prices".to_string()])]),
        }
    }

    #[test]
    fn test_validate() {
        assert!(two_topic_artifact().validate().is_ok());

        let mut ragged = two_topic_artifact();
        ragged.topics[1].pop();
        assert!(ragged.validate().is_err());

        let mut miscounted = two_topic_artifact();
        miscounted.num_topics = 3;
        assert!(miscounted.validate().is_err());

        let mut bad_alpha = two_topic_artifact();
        bad_alpha.alpha = Alpha::PerTopic(vec![0.1]);
        assert!(bad_alpha.validate().is_err());
    }

    #[test]
    fn test_doc2bow_counts_known_words() {
        let artifact = two_topic_artifact();
        let bow = artifact.doc2bow(&["gene", "market", "gene", "unknown"]);
        assert_eq!(bow, vec![(0, 1), (2, 2)]);
    }

    #[test]
    fn test_document_topics_favours_matching_topic() {
        let artifact = two_topic_artifact();
        let bow = artifact.doc2bow(&["gene", "cell", "gene", "cell", "market"]);
        let theta = artifact.document_topics(&bow);

        assert_eq!(theta.len(), 2);
        assert!((theta.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(theta[1] > 0.6, "theta = {:?}", theta);
    }

    #[test]
    fn test_document_topics_empty_bow_is_prior() {
        let artifact = two_topic_artifact();
        assert_eq!(artifact.document_topics(&[]), vec![0.5, 0.5]);
    }

    #[test]
    fn test_topic_terms_descending() {
        let artifact = two_topic_artifact();
        let terms = artifact.topic_terms(0, 2);
        assert_eq!(terms, vec![("market".to_string(), 0.5), ("price".to_string(), 0.45)]);
        assert!(artifact.topic_terms(5, 2).is_empty());
    }

    #[test]
    fn test_deserialize_symmetric_and_vector_alpha() {
        let json = r#"{"num_topics": 1, "alpha": 0.1, "id2word": ["a"], "topics": [[1.0]]}"#;
        let artifact: LdaArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(artifact.alpha, Alpha::Symmetric(0.1));
        assert!(artifact.original_words.is_empty());

        let json = r#"{"num_topics": 1, "alpha": [0.1], "id2word": ["a"], "topics": [[1.0]]}"#;
        let artifact: LdaArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(artifact.alpha, Alpha::PerTopic(vec![0.1]));
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        tokio::fs::write(&path, serde_json::to_vec(&two_topic_artifact()).unwrap())
            .await
            .unwrap();

        let loaded = LdaArtifact::load(&path).await.unwrap();
        assert_eq!(loaded, two_topic_artifact());

        let missing = LdaArtifact::load(dir.path().join("missing.json")).await;
        assert!(matches!(missing, Err(DomainError::Internal { .. })));
    }
}
