//! Comparison entities - pairwise topic similarity between two model snapshots

use serde::{Deserialize, Serialize};

use crate::domain::model::EntityId;
use crate::domain::topic::Topic;
use crate::domain::DomainError;

/// A stored similarity or distance matrix between the topics of two models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    /// True when a higher value means "more similar"
    pub is_score: bool,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub model_from_id: EntityId,
    pub model_to_id: EntityId,
}

impl Comparison {
    /// Which side of this comparison the given model sits on
    pub fn side_of(&self, model_id: EntityId) -> Option<ComparisonSide> {
        if self.model_from_id == model_id {
            Some(ComparisonSide::From)
        } else if self.model_to_id == model_id {
            Some(ComparisonSide::To)
        } else {
            None
        }
    }
}

/// One cell of the comparison matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicsComparison {
    pub comparison_id: EntityId,
    pub topic_from_id: EntityId,
    pub topic_to_id: EntityId,
    pub value: f64,
}

/// Orientation of a model inside a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonSide {
    From,
    To,
}

/// A matrix edge expressed with topic indices instead of storage ids
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionEdge {
    pub from_index: u32,
    pub to_index: u32,
    pub value: f64,
}

/// Highest comparison value recorded against one target topic
#[derive(Debug, Clone, PartialEq)]
pub struct TopicSimilarity {
    pub topic: Topic,
    pub max_value: f64,
}

/// Dense comparison matrix as produced by the external training pipeline.
/// Rows are topics of the "from" model, columns topics of the "to" model.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonMatrix {
    rows: Vec<Vec<f64>>,
    n_cols: usize,
}

impl ComparisonMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, DomainError> {
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);

        if rows.is_empty() || n_cols == 0 {
            return Err(DomainError::validation("Comparison matrix is empty"));
        }

        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(DomainError::validation(format!(
                "Comparison matrix is not rectangular: row {} has {} columns, expected {}",
                i,
                row.len(),
                n_cols
            )));
        }

        if rows.iter().flatten().any(|v| !v.is_finite()) {
            return Err(DomainError::validation(
                "Comparison matrix contains non-finite values",
            ));
        }

        Ok(Self { rows, n_cols })
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.n_cols)
    }

    pub fn get(&self, from: usize, to: usize) -> Option<f64> {
        self.rows.get(from).and_then(|row| row.get(to)).copied()
    }

    /// Every cell as an index-based edge, row-major
    pub fn edges(&self) -> impl Iterator<Item = EvolutionEdge> + '_ {
        self.rows.iter().enumerate().flat_map(|(i, row)| {
            row.iter().enumerate().map(move |(j, value)| EvolutionEdge {
                from_index: i as u32,
                to_index: j as u32,
                value: *value,
            })
        })
    }

    /// Fails unless the matrix covers exactly both models' topic sets
    pub fn check_dimensions(
        &self,
        model_from: &str,
        n_topics_from: usize,
        model_to: &str,
        n_topics_to: usize,
    ) -> Result<(), DomainError> {
        let (n_rows, n_cols) = self.shape();

        if n_rows != n_topics_from {
            return Err(DomainError::inconsistent(format!(
                "Topic matrix's number of rows, {}, does not match the number of topics registered to model {}, with {} topics",
                n_rows, model_from, n_topics_from
            )));
        }

        if n_cols != n_topics_to {
            return Err(DomainError::inconsistent(format!(
                "Topic matrix's number of columns, {}, does not match the number of topics registered to model {}, with {} topics",
                n_cols, model_to, n_topics_to
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison() -> Comparison {
        Comparison {
            id: 1,
            name: "cosine".to_string(),
            description: String::new(),
            is_score: true,
            lower_bound: 0.0,
            upper_bound: 1.0,
            model_from_id: 10,
            model_to_id: 20,
        }
    }

    #[test]
    fn test_side_of() {
        let c = comparison();
        assert_eq!(c.side_of(10), Some(ComparisonSide::From));
        assert_eq!(c.side_of(20), Some(ComparisonSide::To));
        assert_eq!(c.side_of(30), None);
    }

    #[test]
    fn test_matrix_shape_and_edges() {
        let matrix = ComparisonMatrix::new(vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]]).unwrap();
        assert_eq!(matrix.shape(), (2, 3));
        assert_eq!(matrix.get(1, 2), Some(0.6));

        let edges: Vec<EvolutionEdge> = matrix.edges().collect();
        assert_eq!(edges.len(), 6);
        assert_eq!(
            edges[4],
            EvolutionEdge {
                from_index: 1,
                to_index: 1,
                value: 0.5
            }
        );
    }

    #[test]
    fn test_matrix_rejects_ragged_rows() {
        let result = ComparisonMatrix::new(vec![vec![0.1, 0.2], vec![0.4]]);
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_matrix_rejects_empty() {
        assert!(ComparisonMatrix::new(vec![]).is_err());
        assert!(ComparisonMatrix::new(vec![vec![]]).is_err());
    }

    #[test]
    fn test_dimension_mismatch_is_inconsistency() {
        let matrix = ComparisonMatrix::new(vec![vec![0.1, 0.2], vec![0.4, 0.5]]).unwrap();

        assert!(matrix.check_dimensions("a", 2, "b", 2).is_ok());
        assert!(matches!(
            matrix.check_dimensions("a", 3, "b", 2),
            Err(DomainError::ConfigurationInconsistency { .. })
        ));
        assert!(matches!(
            matrix.check_dimensions("a", 2, "b", 1),
            Err(DomainError::ConfigurationInconsistency { .. })
        ));
    }
}
