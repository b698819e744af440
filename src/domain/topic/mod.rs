//! Topic domain - Topics, terms and topic-term distributions

mod entity;
mod repository;

pub use entity::{OriginalWord, Term, Topic, TopicLabel, TopicTermDistribution, TopicTermRow};
pub use repository::TopicRepository;
