//! Per-topic term ranking assembly

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::labels::{label_topics, KeyphrasePreference};
use crate::domain::topic::{Topic, TopicLabel, TopicTermRow};

/// One displayed term with its weight
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TermWeight {
    pub term: String,
    pub value: f64,
}

/// Ordered term list of one topic
#[derive(Debug, Clone, PartialEq)]
pub struct TopicTerms {
    pub label: TopicLabel,
    /// Value-ascending
    pub terms: Vec<TermWeight>,
}

/// Label → term list mapping that keeps topic order when serialized
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicTermsMap(Vec<TopicTerms>);

impl TopicTermsMap {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicTerms> {
        self.0.iter()
    }

    pub fn get(&self, label: &TopicLabel) -> Option<&[TermWeight]> {
        self.0
            .iter()
            .find(|entry| &entry.label == label)
            .map(|entry| entry.terms.as_slice())
    }
}

impl Serialize for TopicTermsMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.label.to_string(), &entry.terms)?;
        }
        map.end()
    }
}

/// Builds the term list of every requested topic.
///
/// Only representative rows are kept. The cap applies in storage order
/// (rank ascending) before the list is re-sorted by value ascending, ties
/// going rank-descending. Topics without any row are left out; labels are
/// decided over the whole requested batch.
pub fn assemble_term_rankings(
    topics: &[Topic],
    rows: &[TopicTermRow],
    n_terms: Option<usize>,
    preference: Option<KeyphrasePreference>,
) -> TopicTermsMap {
    let labels = label_topics(topics, preference);

    let entries = topics
        .iter()
        .zip(labels)
        .filter_map(|(topic, label)| {
            let mut kept: Vec<&TopicTermRow> = rows
                .iter()
                .filter(|row| row.topic_index == topic.index && row.is_representative())
                .collect();

            if kept.is_empty() {
                return None;
            }

            kept.sort_by_key(|row| row.rank);
            if let Some(cap) = n_terms {
                kept.truncate(cap);
            }
            kept.sort_by(|a, b| a.value.total_cmp(&b.value).then(b.rank.cmp(&a.rank)));

            let terms = kept
                .into_iter()
                .map(|row| TermWeight {
                    term: row.display_term().to_string(),
                    value: row.value,
                })
                .collect();

            Some(TopicTerms { label, terms })
        })
        .collect();

    TopicTermsMap(entries)
}
