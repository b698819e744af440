//! Text analysis domain - preprocessing and scoring collaborators

mod preprocessor;
mod scorer;

pub use preprocessor::TextPreprocessor;
pub use scorer::{top_n_topics, TopicProbability, TopicScorer};

#[cfg(test)]
pub use preprocessor::MockTextPreprocessor;
#[cfg(test)]
pub use scorer::MockTopicScorer;
