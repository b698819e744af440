//! LDA artifacts - reading externally trained models and scoring documents

pub(crate) mod artifact;
mod scorer;

pub use artifact::{Alpha, LdaArtifact};
pub use scorer::ArtifactTopicScorer;
