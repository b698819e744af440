//! Seeded stores for tests

use std::sync::Arc;

use super::InMemoryTopicStore;
use crate::domain::comparison::ComparisonMatrix;
use crate::domain::ingestion::{
    ComparisonImport, IngestionRepository, ModelImport, TermImport, TopicImport,
};

pub const TEST_MODEL: &str = "test-name";
pub const PRIOR_MODEL: &str = "test-prior";
pub const COMPARISON: &str = "test-comparison";

fn topic(keyphrase: &str, weights: [f64; 3]) -> TopicImport {
    TopicImport {
        keyphrase: keyphrase.to_string(),
        terms: weights
            .iter()
            .enumerate()
            .map(|(i, value)| TermImport {
                term: format!("term{}", i),
                value: *value,
            })
            .collect(),
    }
}

/// Two models and one comparison:
///
/// - `test-prior`: 2 topics
/// - `test-name` (main): 3 topics, topic 1 labelled `topic-one`, 3 terms each
/// - `test-prior` → `test-name` matrix
///   `[[0.8, 0.05, 0.3], [0.2, 0.15, 0.6]]`
pub async fn scenario_store() -> Arc<InMemoryTopicStore> {
    let store = Arc::new(InMemoryTopicStore::new());

    let prior = ModelImport::new(PRIOR_MODEL, "/models/test-prior.json")
        .with_description("Prior snapshot")
        .with_topics(vec![topic("", [0.5, 0.4, 0.1]), topic("", [0.7, 0.2, 0.1])]);
    store.import_model(prior).await.unwrap();

    let current = ModelImport::new(TEST_MODEL, "/models/test-name.json")
        .with_description("Test description")
        .with_training_context("Test context")
        .with_main(true)
        .with_topics(vec![
            topic("", [0.6, 0.3, 0.1]),
            topic("topic-one", [0.4, 0.3, 0.3]),
            topic("", [0.5, 0.3, 0.2]),
        ]);
    store.import_model(current).await.unwrap();

    let matrix =
        ComparisonMatrix::new(vec![vec![0.8, 0.05, 0.3], vec![0.2, 0.15, 0.6]]).unwrap();
    let comparison = ComparisonImport::new(
        COMPARISON,
        "Cosine similarity",
        true,
        0.0,
        1.0,
        PRIOR_MODEL,
        TEST_MODEL,
        matrix,
    )
    .unwrap();
    store.import_comparison(comparison).await.unwrap();

    store
}
