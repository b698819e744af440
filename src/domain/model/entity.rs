//! LDA model entity and main-model selection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage identifier shared by all persisted aggregates
pub type EntityId = i64;

/// A trained LDA model registered in the store
///
/// Created once at ingestion and never mutated afterwards; re-ingestion
/// replaces the whole aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdaModel {
    id: EntityId,
    name: String,
    description: String,
    training_context: String,
    is_main: bool,
    /// Location of the externally trained artifact
    path: String,
    created_at: DateTime<Utc>,
}

impl LdaModel {
    pub fn new(id: EntityId, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            training_context: String::new(),
            is_main: false,
            path: path.into(),
            created_at: Utc::now(),
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

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn training_context(&self) -> &str {
        &self.training_context
    }

    pub fn is_main(&self) -> bool {
        self.is_main
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Picks the default model out of all registered models.
///
/// The flagged model wins when exactly one is flagged; otherwise the model
/// with the lowest identifier is used.
pub fn select_main_model(models: &[LdaModel]) -> Option<&LdaModel> {
    let mut flagged = models.iter().filter(|m| m.is_main());

    match (flagged.next(), flagged.next()) {
        (Some(model), None) => Some(model),
        _ => models.iter().min_by_key(|m| m.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_builder() {
        let model = LdaModel::new(7, "lda-2019", "/models/lda-2019.json")
            .with_description("Abstracts 2019")
            .with_training_context("arXiv cs.CL")
            .with_main(true);

        assert_eq!(model.id(), 7);
        assert_eq!(model.name(), "lda-2019");
        assert_eq!(model.description(), "Abstracts 2019");
        assert_eq!(model.training_context(), "arXiv cs.CL");
        assert_eq!(model.path(), "/models/lda-2019.json");
        assert!(model.is_main());
    }

    #[test]
    fn test_select_single_flagged_model() {
        let models = vec![
            LdaModel::new(1, "old", "/a"),
            LdaModel::new(2, "new", "/b").with_main(true),
        ];

        assert_eq!(select_main_model(&models).unwrap().name(), "new");
    }

    #[test]
    fn test_select_falls_back_to_lowest_id() {
        let models = vec![
            LdaModel::new(5, "five", "/a"),
            LdaModel::new(3, "three", "/b"),
        ];

        assert_eq!(select_main_model(&models).unwrap().id(), 3);
    }

    #[test]
    fn test_select_with_several_flagged_uses_lowest_id() {
        let models = vec![
            LdaModel::new(4, "four", "/a").with_main(true),
            LdaModel::new(2, "two", "/b"),
            LdaModel::new(9, "nine", "/c").with_main(true),
        ];

        assert_eq!(select_main_model(&models).unwrap().id(), 2);
    }

    #[test]
    fn test_select_empty() {
        assert!(select_main_model(&[]).is_none());
    }
}
