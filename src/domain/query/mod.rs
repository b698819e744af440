//! Query engine - topic selection, term rankings, novelty and evolution

mod evolution;
mod labels;
mod novelty;
mod selector;
mod terms;

pub use evolution::{
    build_evolution_graph, Association, ParentNode, TopicEvolution, TopicNode,
    EVOLUTION_EDGE_FLOOR,
};
pub use labels::{label_topics, KeyphrasePreference};
pub use novelty::{max_similarity_by_target, novel_topics, DEFAULT_SIMILARITY_THRESHOLD};
pub use selector::{parse_n_terms, parse_topic_index, RangeMeta, ResolvedTopics, TopicSelector};
pub use terms::{assemble_term_rankings, TermWeight, TopicTerms, TopicTermsMap};
