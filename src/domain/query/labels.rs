//! Topic labelling policy

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::topic::{Topic, TopicLabel};
use crate::domain::DomainError;

/// How topics are keyed in query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyphrasePreference {
    /// Keyphrase when the topic has one, index otherwise
    Available,
    /// Keyphrases only if every topic of the batch has one
    All,
}

impl FromStr for KeyphrasePreference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "all" => Ok(Self::All),
            other => Err(DomainError::bad_request(format!(
                "Unknown keyphrase preference \"{}\", expected \"available\" or \"all\"",
                other
            ))),
        }
    }
}

impl KeyphrasePreference {
    /// Parses an optional request parameter; empty means absent
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, DomainError> {
        raw.filter(|value| !value.trim().is_empty())
            .map(str::parse)
            .transpose()
    }
}

/// Labels every topic of a batch.
///
/// The completeness check for [`KeyphrasePreference::All`] runs over the whole
/// batch before any label is emitted. Labels are unique once rendered: under
/// `All` a repeated keyphrase sends the whole batch back to indices, under
/// `Available` every topic whose keyphrase collides with another label is
/// keyed by its index instead.
pub fn label_topics(topics: &[Topic], preference: Option<KeyphrasePreference>) -> Vec<TopicLabel> {
    let use_keyphrases = match preference {
        None => false,
        Some(KeyphrasePreference::Available) => true,
        Some(KeyphrasePreference::All) => {
            let keyphrases: HashSet<&str> = topics.iter().filter_map(Topic::keyphrase).collect();
            topics.iter().all(|topic| topic.keyphrase().is_some())
                && keyphrases.len() == topics.len()
        }
    };

    let mut labels: Vec<TopicLabel> = topics
        .iter()
        .map(|topic| match topic.keyphrase() {
            Some(keyphrase) if use_keyphrases => TopicLabel::Keyphrase(keyphrase.to_string()),
            _ => TopicLabel::Index(topic.index),
        })
        .collect();

    // Indices never collide with each other, so each pass only shrinks the keyphrase set
    loop {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for label in &labels {
            *counts.entry(label.to_string()).or_default() += 1;
        }

        let mut changed = false;
        for (label, topic) in labels.iter_mut().zip(topics) {
            if matches!(label, TopicLabel::Keyphrase(_)) && counts[&label.to_string()] > 1 {
                *label = TopicLabel::Index(topic.index);
                changed = true;
            }
        }

        if !changed {
            return labels;
        }
    }
}
