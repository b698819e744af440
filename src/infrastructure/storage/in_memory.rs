//! In-memory topic store

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::domain::comparison::{
    Comparison, ComparisonRepository, ComparisonSide, EvolutionEdge, TopicSimilarity,
    TopicsComparison,
};
use crate::domain::ingestion::{ComparisonImport, IngestionRepository, ModelImport};
use crate::domain::model::{EntityId, LdaModel, LdaModelRepository};
use crate::domain::query::max_similarity_by_target;
use crate::domain::storage::TopicStore;
use crate::domain::topic::{
    OriginalWord, Term, Topic, TopicRepository, TopicTermDistribution, TopicTermRow,
};
use crate::domain::DomainError;

#[derive(Debug, Clone, Default)]
struct Tables {
    last_id: EntityId,
    models: BTreeMap<EntityId, LdaModel>,
    topics: BTreeMap<EntityId, Topic>,
    terms: BTreeMap<EntityId, Term>,
    term_ids: HashMap<String, EntityId>,
    distributions: Vec<TopicTermDistribution>,
    comparisons: BTreeMap<EntityId, Comparison>,
    edges: Vec<TopicsComparison>,
}

impl Tables {
    fn next_id(&mut self) -> EntityId {
        self.last_id += 1;
        self.last_id
    }

    fn term_id(&mut self, string: &str) -> EntityId {
        if let Some(id) = self.term_ids.get(string) {
            return *id;
        }

        let id = self.next_id();
        self.terms.insert(id, Term::new(id, string));
        self.term_ids.insert(string.to_string(), id);
        id
    }

    fn model_by_name(&self, name: &str) -> Option<&LdaModel> {
        self.models.values().find(|model| model.name() == name)
    }

    /// Topics of a model, index-ascending
    fn model_topics(&self, model_id: EntityId) -> Vec<&Topic> {
        let mut topics: Vec<&Topic> = self
            .topics
            .values()
            .filter(|topic| topic.model_id == model_id)
            .collect();
        topics.sort_by_key(|topic| topic.index);
        topics
    }

    fn original_word(&self, term: &Term) -> Option<OriginalWord> {
        let word = self.terms.get(&term.original_word_id?)?;
        Some(OriginalWord {
            string: word.string.clone(),
            rank: word.rank,
        })
    }

    fn insert_model(&mut self, import: ModelImport) -> Result<LdaModel, DomainError> {
        if self.model_by_name(&import.name).is_some() {
            return Err(DomainError::conflict(format!(
                "Model \"{}\" already exists",
                import.name
            )));
        }

        let model_id = self.next_id();
        let model = LdaModel::new(model_id, &import.name, &import.path)
            .with_description(&import.description)
            .with_training_context(&import.training_context)
            .with_main(import.is_main)
            .with_created_at(Utc::now());
        self.models.insert(model_id, model.clone());

        for (index, topic_import) in import.topics.iter().enumerate() {
            let topic_id = self.next_id();
            let topic = Topic::new(topic_id, model_id, index as u32)
                .with_keyphrase(&topic_import.keyphrase);
            self.topics.insert(topic_id, topic);

            for (position, term) in topic_import.terms.iter().enumerate() {
                let term_id = self.term_id(&term.term);
                self.distributions.push(TopicTermDistribution {
                    topic_id,
                    term_id,
                    value: term.value,
                    rank: position as u32 + 1,
                });
            }
        }

        self.link_original_words(&import);

        Ok(model)
    }

    /// Ranks surface words and links each stem of the import to its rank-1 word.
    ///
    /// A word's rank is written once, as the best position any stem of the
    /// first import mentioning it gives it. A stem keeps the first link it
    /// receives and is only ever linked to a word ranked 1, so later imports
    /// never hide a term of an earlier model or replace its display word.
    fn link_original_words(&mut self, import: &ModelImport) {
        let referenced: BTreeSet<&str> = import
            .topics
            .iter()
            .flat_map(|topic| topic.terms.iter().map(|term| term.term.as_str()))
            .collect();

        let mut positions: BTreeMap<EntityId, u32> = BTreeMap::new();
        let mut candidates: Vec<(EntityId, Vec<EntityId>)> = Vec::new();
        for (stem, words) in &import.original_words {
            if !referenced.contains(stem.as_str()) || words.is_empty() {
                continue;
            }
            let Some(stem_id) = self.term_ids.get(stem).copied() else {
                continue;
            };

            let mut word_ids = Vec::with_capacity(words.len());
            for (position, word) in words.iter().enumerate() {
                let word_id = self.term_id(word);
                let rank = position as u32 + 1;
                positions
                    .entry(word_id)
                    .and_modify(|best| *best = (*best).min(rank))
                    .or_insert(rank);
                word_ids.push(word_id);
            }
            candidates.push((stem_id, word_ids));
        }

        for (word_id, rank) in positions {
            if let Some(term) = self.terms.get_mut(&word_id) {
                term.rank.get_or_insert(rank);
            }
        }

        for (stem_id, word_ids) in candidates {
            let canonical = word_ids
                .into_iter()
                .find(|id| self.terms.get(id).and_then(|term| term.rank) == Some(1));

            if let (Some(word_id), Some(stem_term)) = (canonical, self.terms.get_mut(&stem_id)) {
                stem_term.original_word_id.get_or_insert(word_id);
            }
        }
    }

    fn insert_comparison(&mut self, import: ComparisonImport) -> Result<Comparison, DomainError> {
        let model_from = self.model_by_name(&import.model_from).cloned().ok_or_else(|| {
            DomainError::not_found(format!(
                "Requested model \"{}\" does not exist",
                import.model_from
            ))
        })?;
        let model_to = self.model_by_name(&import.model_to).cloned().ok_or_else(|| {
            DomainError::not_found(format!(
                "Requested model \"{}\" does not exist",
                import.model_to
            ))
        })?;

        if self.comparisons.values().any(|c| c.name == import.name) {
            return Err(DomainError::conflict(format!(
                "Comparison \"{}\" already exists",
                import.name
            )));
        }

        let topics_from: Vec<EntityId> =
            self.model_topics(model_from.id()).iter().map(|t| t.id).collect();
        let topics_to: Vec<EntityId> =
            self.model_topics(model_to.id()).iter().map(|t| t.id).collect();

        import.matrix.check_dimensions(
            model_from.name(),
            topics_from.len(),
            model_to.name(),
            topics_to.len(),
        )?;

        let comparison = Comparison {
            id: self.next_id(),
            name: import.name,
            description: import.description,
            is_score: import.is_score,
            lower_bound: import.lower_bound,
            upper_bound: import.upper_bound,
            model_from_id: model_from.id(),
            model_to_id: model_to.id(),
        };

        for edge in import.matrix.edges() {
            self.edges.push(TopicsComparison {
                comparison_id: comparison.id,
                topic_from_id: topics_from[edge.from_index as usize],
                topic_to_id: topics_to[edge.to_index as usize],
                value: edge.value,
            });
        }

        self.comparisons.insert(comparison.id, comparison.clone());
        Ok(comparison)
    }
}

/// Thread-safe in-memory store
///
/// Useful for testing and development. Data is lost when the process terminates.
/// Imports run against a staged copy of the tables that replaces the live
/// tables only when the whole import succeeded.
#[derive(Debug, Default)]
pub struct InMemoryTopicStore {
    tables: RwLock<Tables>,
}

impl InMemoryTopicStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> Result<T, DomainError> {
        let tables = self
            .tables
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(f(&tables))
    }

    fn stage<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        let mut staged = tables.clone();
        let result = f(&mut staged)?;
        *tables = staged;
        Ok(result)
    }
}

#[async_trait]
impl LdaModelRepository for InMemoryTopicStore {
    async fn get_by_id(&self, id: EntityId) -> Result<Option<LdaModel>, DomainError> {
        self.read(|tables| tables.models.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<LdaModel>, DomainError> {
        self.read(|tables| tables.model_by_name(name).cloned())
    }

    async fn list(&self) -> Result<Vec<LdaModel>, DomainError> {
        self.read(|tables| tables.models.values().cloned().collect())
    }
}

#[async_trait]
impl TopicRepository for InMemoryTopicStore {
    async fn list_topics(&self, model_id: EntityId) -> Result<Vec<Topic>, DomainError> {
        self.read(|tables| tables.model_topics(model_id).into_iter().cloned().collect())
    }

    async fn term_rows(
        &self,
        model_id: EntityId,
        topic_indices: &[u32],
    ) -> Result<Vec<TopicTermRow>, DomainError> {
        self.read(|tables| {
            let topics: HashMap<EntityId, u32> = tables
                .model_topics(model_id)
                .into_iter()
                .filter(|topic| topic_indices.contains(&topic.index))
                .map(|topic| (topic.id, topic.index))
                .collect();

            let mut rows: Vec<TopicTermRow> = tables
                .distributions
                .iter()
                .filter_map(|distribution| {
                    let topic_index = *topics.get(&distribution.topic_id)?;
                    let term = tables.terms.get(&distribution.term_id)?;

                    Some(TopicTermRow {
                        topic_index,
                        term: term.string.clone(),
                        original_word: tables.original_word(term),
                        value: distribution.value,
                        rank: distribution.rank,
                    })
                })
                .filter(TopicTermRow::is_representative)
                .collect();

            rows.sort_by_key(|row| (row.topic_index, row.rank));
            rows
        })
    }
}

#[async_trait]
impl ComparisonRepository for InMemoryTopicStore {
    async fn find_for_model(&self, model_id: EntityId) -> Result<Option<Comparison>, DomainError> {
        self.read(|tables| {
            tables
                .comparisons
                .values()
                .find(|comparison| comparison.side_of(model_id).is_some())
                .cloned()
        })
    }

    async fn edges_for_topic(
        &self,
        comparison_id: EntityId,
        side: ComparisonSide,
        topic_index: u32,
        floor: f64,
    ) -> Result<Vec<EvolutionEdge>, DomainError> {
        self.read(|tables| {
            let mut edges: Vec<EvolutionEdge> = tables
                .edges
                .iter()
                .filter(|edge| edge.comparison_id == comparison_id && edge.value >= floor)
                .filter_map(|edge| {
                    Some(EvolutionEdge {
                        from_index: tables.topics.get(&edge.topic_from_id)?.index,
                        to_index: tables.topics.get(&edge.topic_to_id)?.index,
                        value: edge.value,
                    })
                })
                .filter(|edge| match side {
                    ComparisonSide::From => edge.from_index == topic_index,
                    ComparisonSide::To => edge.to_index == topic_index,
                })
                .collect();

            edges.sort_by_key(|edge| match side {
                ComparisonSide::From => edge.to_index,
                ComparisonSide::To => edge.from_index,
            });
            edges
        })
    }

    async fn max_similarity_by_target(
        &self,
        model_id: EntityId,
    ) -> Result<Vec<TopicSimilarity>, DomainError> {
        self.read(|tables| {
            let targets = tables.edges.iter().filter_map(|edge| {
                let topic = tables.topics.get(&edge.topic_to_id)?;
                (topic.model_id == model_id).then(|| (topic.clone(), edge.value))
            });

            max_similarity_by_target(targets)
        })
    }
}

#[async_trait]
impl IngestionRepository for InMemoryTopicStore {
    async fn import_model(&self, import: ModelImport) -> Result<LdaModel, DomainError> {
        import.validate()?;
        let n_topics = import.topics.len();

        let model = self.stage(|tables| tables.insert_model(import))?;
        info!(model = %model.name(), topics = n_topics, "Model imported");
        Ok(model)
    }

    async fn import_comparison(&self, import: ComparisonImport) -> Result<Comparison, DomainError> {
        let comparison = self.stage(|tables| tables.insert_comparison(import))?;
        info!(comparison = %comparison.name, "Comparison imported");
        Ok(comparison)
    }
}

#[async_trait]
impl TopicStore for InMemoryTopicStore {
    async fn ping(&self) -> Result<(), DomainError> {
        self.read(|_| ())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
