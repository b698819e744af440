//! Comparison domain - stored similarity matrices between model snapshots

mod entity;
mod repository;
mod validation;

pub use entity::{
    Comparison, ComparisonMatrix, ComparisonSide, EvolutionEdge, TopicSimilarity,
    TopicsComparison,
};
pub use repository::ComparisonRepository;
pub use validation::{slugify, validate_bounds, validate_comparison_name};
