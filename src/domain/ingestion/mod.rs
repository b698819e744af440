//! Ingestion domain - externally trained models and comparisons

mod entity;
mod repository;

pub use entity::{
    round_weight, ComparisonImport, ModelImport, TermImport, TopicImport, WEIGHT_DECIMALS,
};
pub use repository::IngestionRepository;
