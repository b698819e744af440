//! Ingestion value objects for models and comparisons

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::comparison::{validate_bounds, validate_comparison_name, ComparisonMatrix};
use crate::domain::DomainError;

/// Decimal places kept for topic-term weights
pub const WEIGHT_DECIMALS: i32 = 5;

/// Rounds a weight the way it is stored
pub fn round_weight(value: f64) -> f64 {
    let factor = 10f64.powi(WEIGHT_DECIMALS);
    (value * factor).round() / factor
}

/// A term and its weight inside one imported topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermImport {
    pub term: String,
    pub value: f64,
}

/// One imported topic; its position in [`ModelImport::topics`] is its index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicImport {
    #[serde(default)]
    pub keyphrase: String,
    /// Descending by weight; the position gives the rank
    pub terms: Vec<TermImport>,
}

impl TopicImport {
    /// Keeps the `top_n` heaviest terms, rounded, heaviest first
    pub fn from_weights(
        keyphrase: impl Into<String>,
        weights: impl IntoIterator<Item = (String, f64)>,
        top_n: usize,
    ) -> Self {
        let mut terms: Vec<TermImport> = weights
            .into_iter()
            .map(|(term, value)| TermImport { term, value })
            .collect();

        terms.sort_by(|a, b| b.value.total_cmp(&a.value));
        terms.truncate(top_n);
        for term in &mut terms {
            term.value = round_weight(term.value);
        }

        Self {
            keyphrase: keyphrase.into(),
            terms,
        }
    }
}

/// A whole model aggregate to be written in one unit
#[derive(Debug, Clone, PartialEq)]
pub struct ModelImport {
    pub name: String,
    pub description: String,
    pub training_context: String,
    pub is_main: bool,
    pub path: String,
    pub topics: Vec<TopicImport>,
    /// Stem → unstemmed surface forms, most canonical first
    pub original_words: BTreeMap<String, Vec<String>>,
}

impl ModelImport {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            training_context: String::new(),
            is_main: false,
            path: path.into(),
            topics: Vec::new(),
            original_words: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_training_context(mut self, training_context: impl Into<String>) -> Self {
        self.training_context = training_context.into();
        self
    }

    pub fn with_main(mut self, is_main: bool) -> Self {
        self.is_main = is_main;
        self
    }

    pub fn with_topics(mut self, topics: Vec<TopicImport>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_original_words(mut self, original_words: BTreeMap<String, Vec<String>>) -> Self {
        self.original_words = original_words;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("Model name cannot be empty"));
        }

        if self.path.trim().is_empty() {
            return Err(DomainError::validation("Model path cannot be empty"));
        }

        if self.topics.is_empty() {
            return Err(DomainError::validation(format!(
                "Model \"{}\" has no topics",
                self.name
            )));
        }

        for (index, topic) in self.topics.iter().enumerate() {
            let mut seen = HashSet::new();
            for term in &topic.terms {
                if term.term.is_empty() {
                    return Err(DomainError::validation(format!(
                        "Topic {} contains an empty term",
                        index
                    )));
                }
                if !term.value.is_finite() {
                    return Err(DomainError::validation(format!(
                        "Topic {} has a non-finite weight for term \"{}\"",
                        index, term.term
                    )));
                }
                if !seen.insert(term.term.as_str()) {
                    return Err(DomainError::validation(format!(
                        "Topic {} contains term \"{}\" more than once",
                        index, term.term
                    )));
                }
            }
        }

        Ok(())
    }
}

/// A comparison matrix to be written in one unit
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonImport {
    /// Already slugified
    pub name: String,
    pub description: String,
    pub is_score: bool,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub model_from: String,
    pub model_to: String,
    pub matrix: ComparisonMatrix,
}

impl ComparisonImport {
    /// Slugifies the name and checks the bounds
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        description: impl Into<String>,
        is_score: bool,
        lower_bound: f64,
        upper_bound: f64,
        model_from: impl Into<String>,
        model_to: impl Into<String>,
        matrix: ComparisonMatrix,
    ) -> Result<Self, DomainError> {
        let name = validate_comparison_name(name)?;
        validate_bounds(lower_bound, upper_bound)?;

        Ok(Self {
            name,
            description: description.into(),
            is_score,
            lower_bound,
            upper_bound,
            model_from: model_from.into(),
            model_to: model_to.into(),
            matrix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(t, v)| (t.to_string(), *v)).collect()
    }

    #[test]
    fn test_round_weight() {
        assert_eq!(round_weight(0.123456789), 0.12346);
        assert_eq!(round_weight(0.5), 0.5);
    }

    #[test]
    fn test_topic_from_weights_keeps_top_n() {
        let topic = TopicImport::from_weights(
            "",
            weights(&[("b", 0.2), ("a", 0.700001), ("c", 0.1)]),
            2,
        );

        let terms: Vec<(&str, f64)> = topic.terms.iter().map(|t| (t.term.as_str(), t.value)).collect();
        assert_eq!(terms, vec![("a", 0.7), ("b", 0.2)]);
    }

    #[test]
    fn test_model_import_validation() {
        let valid = ModelImport::new("lda", "/tmp/lda.json").with_topics(vec![
            TopicImport::from_weights("", weights(&[("a", 0.5), ("b", 0.5)]), 10),
        ]);
        assert!(valid.validate().is_ok());

        let no_topics = ModelImport::new("lda", "/tmp/lda.json");
        assert!(no_topics.validate().is_err());

        let unnamed = ModelImport::new(" ", "/tmp/lda.json").with_topics(valid.topics.clone());
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_duplicate_term_is_rejected() {
        let import = ModelImport::new("lda", "/tmp/lda.json").with_topics(vec![TopicImport {
            keyphrase: String::new(),
            terms: vec![
                TermImport { term: "a".into(), value: 0.5 },
                TermImport { term: "a".into(), value: 0.4 },
            ],
        }]);

        assert!(matches!(import.validate(), Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_comparison_import_slugifies_and_checks_bounds() {
        let matrix = ComparisonMatrix::new(vec![vec![0.5]]).unwrap();

        let import = ComparisonImport::new(
            "Cosine Similarity",
            "cosine",
            true,
            0.0,
            1.0,
            "a",
            "b",
            matrix.clone(),
        )
        .unwrap();
        assert_eq!(import.name, "cosine-similarity");

        let err = ComparisonImport::new("x", "", true, 1.0, 0.0, "a", "b", matrix).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
