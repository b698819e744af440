//! Novel topic detection

use std::collections::BTreeMap;

use super::labels::{label_topics, KeyphrasePreference};
use crate::domain::comparison::TopicSimilarity;
use crate::domain::model::EntityId;
use crate::domain::topic::{Topic, TopicLabel};

/// Default novelty cutoff
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;

/// Groups `(target topic, value)` edges by target and keeps the maximum.
///
/// Output is ordered by topic index; topics never seen are absent.
pub fn max_similarity_by_target<I>(edges: I) -> Vec<TopicSimilarity>
where
    I: IntoIterator<Item = (Topic, f64)>,
{
    let mut grouped: BTreeMap<(u32, EntityId), TopicSimilarity> = BTreeMap::new();

    for (topic, value) in edges {
        grouped
            .entry((topic.index, topic.id))
            .and_modify(|entry| entry.max_value = entry.max_value.max(value))
            .or_insert(TopicSimilarity {
                topic,
                max_value: value,
            });
    }

    grouped.into_values().collect()
}

/// Labels of the topics whose best match stays strictly below `threshold`.
///
/// Labels are decided over the novel topics only.
pub fn novel_topics(
    similarities: &[TopicSimilarity],
    threshold: f64,
    preference: Option<KeyphrasePreference>,
) -> Vec<TopicLabel> {
    let mut novel: Vec<Topic> = similarities
        .iter()
        .filter(|similarity| similarity.max_value < threshold)
        .map(|similarity| similarity.topic.clone())
        .collect();

    novel.sort_by_key(|topic| topic.index);
    label_topics(&novel, preference)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn similarity(index: u32, keyphrase: &str, max_value: f64) -> TopicSimilarity {
        TopicSimilarity {
            topic: Topic::new(i64::from(index) + 1, 2, index).with_keyphrase(keyphrase),
            max_value,
        }
    }

    #[test]
    fn test_max_by_target_groups_edges() {
        let t0 = Topic::new(1, 2, 0);
        let t1 = Topic::new(2, 2, 1);

        let grouped = max_similarity_by_target(vec![
            (t1.clone(), 0.2),
            (t0.clone(), 0.1),
            (t1.clone(), 0.7),
            (t0.clone(), 0.3),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].topic.index, 0);
        assert_eq!(grouped[0].max_value, 0.3);
        assert_eq!(grouped[1].max_value, 0.7);
    }

    #[test]
    fn test_novel_topics_strictly_below_threshold() {
        let similarities = vec![
            similarity(0, "", 0.2),
            similarity(1, "", 0.5),
            similarity(2, "", 0.49),
        ];

        assert_eq!(
            novel_topics(&similarities, 0.5, None),
            vec![TopicLabel::Index(0), TopicLabel::Index(2)]
        );
    }

    #[test]
    fn test_no_novel_topics_when_all_match() {
        let similarities = vec![similarity(0, "", 0.6), similarity(1, "", 0.9)];
        assert!(novel_topics(&similarities, 0.5, None).is_empty());
    }

    #[test]
    fn test_labels_apply_over_result_set() {
        // topic 1 lacks a keyphrase but is not novel, so it does not block "all"
        let similarities = vec![
            similarity(0, "first", 0.1),
            similarity(1, "", 0.9),
            similarity(2, "third", 0.3),
        ];

        assert_eq!(
            novel_topics(&similarities, 0.5, Some(KeyphrasePreference::All)),
            vec![
                TopicLabel::Keyphrase("first".into()),
                TopicLabel::Keyphrase("third".into())
            ]
        );
    }
}
