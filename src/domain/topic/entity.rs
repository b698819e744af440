//! Topic, term and topic-term distribution entities

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::model::EntityId;

/// A topic of one LDA model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: EntityId,
    pub model_id: EntityId,
    /// 0-based position inside the model, contiguous from training
    pub index: u32,
    /// Human label; empty means "no symbolic label"
    pub keyphrase: String,
}

impl Topic {
    pub fn new(id: EntityId, model_id: EntityId, index: u32) -> Self {
        Self {
            id,
            model_id,
            index,
            keyphrase: String::new(),
        }
    }

    pub fn with_keyphrase(mut self, keyphrase: impl Into<String>) -> Self {
        self.keyphrase = keyphrase.into();
        self
    }

    /// The keyphrase, if the topic carries a non-empty one
    pub fn keyphrase(&self) -> Option<&str> {
        if self.keyphrase.is_empty() {
            None
        } else {
            Some(&self.keyphrase)
        }
    }
}

/// Key under which a topic is reported to callers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicLabel {
    Index(u32),
    Keyphrase(String),
}

impl fmt::Display for TopicLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{}", index),
            Self::Keyphrase(keyphrase) => write!(f, "{}", keyphrase),
        }
    }
}

/// A vocabulary term, global across models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: EntityId,
    pub string: String,
    /// Unstemmed surface form this term was derived from
    pub original_word_id: Option<EntityId>,
    /// Position among the original words sharing a stem; 1 is canonical
    pub rank: Option<u32>,
}

impl Term {
    pub fn new(id: EntityId, string: impl Into<String>) -> Self {
        Self {
            id,
            string: string.into(),
            original_word_id: None,
            rank: None,
        }
    }

    /// A term without an original word is itself a root form
    pub fn is_root(&self) -> bool {
        self.original_word_id.is_none()
    }
}

/// Weight of one term inside one topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicTermDistribution {
    pub topic_id: EntityId,
    pub term_id: EntityId,
    pub value: f64,
    /// 1-based position inside the topic, descending by value
    pub rank: u32,
}

/// Original word linked to a stemmed term
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalWord {
    pub string: String,
    pub rank: Option<u32>,
}

/// Distribution row joined with its topic and term, as returned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct TopicTermRow {
    pub topic_index: u32,
    pub term: String,
    pub original_word: Option<OriginalWord>,
    pub value: f64,
    pub rank: u32,
}

impl TopicTermRow {
    /// Root terms and terms whose original word is the canonical one represent
    /// their concept; every other row is a duplicate surface form.
    pub fn is_representative(&self) -> bool {
        match &self.original_word {
            None => true,
            Some(word) => word.rank == Some(1),
        }
    }

    /// The unstemmed original word when linked, the stored term otherwise
    pub fn display_term(&self) -> &str {
        match &self.original_word {
            Some(word) => &word.string,
            None => &self.term,
        }
    }
}
