//! Model domain - Registered LDA models

mod entity;
mod repository;

pub use entity::{select_main_model, EntityId, LdaModel};
pub use repository::LdaModelRepository;
