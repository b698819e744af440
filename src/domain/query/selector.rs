//! Topic selector parsing and resolution

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::domain::topic::Topic;
use crate::domain::DomainError;

static INTEGER_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?)(\d+)\s*$").unwrap());

const TOPIC_INDEX_MESSAGE: &str = "Requested topic index must be a positive integer or 0";
const OFFSET_MESSAGE: &str = "Offset must be a positive integer or 0";
const LIMIT_MESSAGE: &str = "Limit must be a positive integer";
const MISSING_TOPIC_MESSAGE: &str = "Request must provide the index of the target topic";
const N_TERMS_MESSAGE: &str = "Maximum number of terms must be a positive integer greater than 0";

/// Result of reading a raw parameter as an integer literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntegerLiteral {
    Negative,
    /// Saturates at `u64::MAX` on overflow
    NonNegative(u64),
}

fn parse_integer(raw: &str) -> Option<IntegerLiteral> {
    let captures = INTEGER_LITERAL.captures(raw)?;
    let digits = &captures[2];
    let all_zero = digits.bytes().all(|b| b == b'0');

    if &captures[1] == "-" && !all_zero {
        return Some(IntegerLiteral::Negative);
    }

    Some(IntegerLiteral::NonNegative(digits.parse().unwrap_or(u64::MAX)))
}

/// Treats empty parameters as absent
fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.trim().is_empty())
}

/// Which topics of a model a query targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicSelector {
    /// A single topic by its 0-based index
    Index(u64),
    /// Topics carrying this keyphrase
    Keyphrase(String),
    /// The window `[offset, offset + limit)`; absent values take their defaults
    Range {
        offset: Option<u64>,
        limit: Option<u64>,
    },
}

impl TopicSelector {
    /// Builds a selector from raw request parameters.
    ///
    /// An explicit topic wins over range parameters, which are then ignored.
    /// The topic is numeric only when it is an integer literal; anything else
    /// is taken as a keyphrase.
    pub fn from_params(
        topic: Option<&str>,
        offset: Option<&str>,
        limit: Option<&str>,
    ) -> Result<Self, DomainError> {
        if let Some(raw) = present(topic) {
            return match parse_integer(raw) {
                Some(IntegerLiteral::Negative) => {
                    Err(DomainError::unprocessable(TOPIC_INDEX_MESSAGE))
                }
                Some(IntegerLiteral::NonNegative(index)) => Ok(Self::Index(index)),
                None => Ok(Self::Keyphrase(raw.to_string())),
            };
        }

        let offset = match present(offset).map(parse_integer) {
            None => None,
            Some(None) => return Err(DomainError::bad_request(OFFSET_MESSAGE)),
            Some(Some(IntegerLiteral::Negative)) => {
                return Err(DomainError::unprocessable(OFFSET_MESSAGE));
            }
            Some(Some(IntegerLiteral::NonNegative(value))) => Some(value),
        };

        let limit = match present(limit).map(parse_integer) {
            None => None,
            Some(None) => return Err(DomainError::bad_request(LIMIT_MESSAGE)),
            Some(Some(IntegerLiteral::Negative)) | Some(Some(IntegerLiteral::NonNegative(0))) => {
                return Err(DomainError::unprocessable(LIMIT_MESSAGE));
            }
            Some(Some(IntegerLiteral::NonNegative(value))) => Some(value),
        };

        Ok(Self::Range { offset, limit })
    }

    /// Selects every topic of the model
    pub fn all() -> Self {
        Self::Range {
            offset: None,
            limit: None,
        }
    }

    pub fn is_keyphrase(&self) -> bool {
        matches!(self, Self::Keyphrase(_))
    }

    /// Resolves the selector against a model's topics.
    ///
    /// `topics` may come in any order; the result is index-ascending.
    pub fn resolve(&self, model_name: &str, topics: &[Topic]) -> Result<ResolvedTopics, DomainError> {
        let mut sorted: Vec<&Topic> = topics.iter().collect();
        sorted.sort_by_key(|topic| topic.index);
        let count = sorted.len() as u64;

        match self {
            Self::Index(index) => {
                let topic = sorted
                    .iter()
                    .find(|topic| u64::from(topic.index) == *index)
                    .ok_or_else(|| {
                        DomainError::not_found(format!(
                            "Requested topic does not exist in model \"{}\"",
                            model_name
                        ))
                    })?;

                Ok(ResolvedTopics {
                    topics: vec![(*topic).clone()],
                    window: None,
                })
            }
            Self::Keyphrase(keyphrase) => {
                // Keyphrases are not unique per model; the lowest index wins.
                let topic = sorted
                    .iter()
                    .find(|topic| topic.keyphrase() == Some(keyphrase.as_str()))
                    .ok_or_else(|| {
                        DomainError::not_found(format!(
                            "Requested topic \"{}\" does not exist in model \"{}\"",
                            keyphrase, model_name
                        ))
                    })?;

                Ok(ResolvedTopics {
                    topics: vec![(*topic).clone()],
                    window: None,
                })
            }
            Self::Range { offset, limit } => {
                let start = offset.unwrap_or(0);
                if start >= count {
                    return Err(DomainError::not_found(format!(
                        "Offset exceeds the total number of topics of model \"{}\"",
                        model_name
                    )));
                }

                let available = count - start;
                let effective_limit = limit.unwrap_or(available).min(available);
                let window = (offset.is_some() || limit.is_some()).then_some(RangeMeta {
                    offset: start,
                    limit: effective_limit,
                });

                let topics = sorted
                    .into_iter()
                    .skip(start as usize)
                    .take(effective_limit as usize)
                    .cloned()
                    .collect();

                Ok(ResolvedTopics { topics, window })
            }
        }
    }
}

/// Effective window reported back to callers that asked for a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeMeta {
    pub offset: u64,
    pub limit: u64,
}

/// Topics picked by a selector
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTopics {
    /// Index-ascending
    pub topics: Vec<Topic>,
    /// Present only when a range parameter was given explicitly
    pub window: Option<RangeMeta>,
}

impl ResolvedTopics {
    pub fn indices(&self) -> Vec<u32> {
        self.topics.iter().map(|topic| topic.index).collect()
    }
}

/// Parses the optional per-topic term cap
pub fn parse_n_terms(raw: Option<&str>) -> Result<Option<usize>, DomainError> {
    match present(raw).map(parse_integer) {
        None => Ok(None),
        Some(None) => Err(DomainError::bad_request(N_TERMS_MESSAGE)),
        Some(Some(IntegerLiteral::Negative)) | Some(Some(IntegerLiteral::NonNegative(0))) => {
            Err(DomainError::unprocessable(N_TERMS_MESSAGE))
        }
        Some(Some(IntegerLiteral::NonNegative(value))) => {
            Ok(Some(usize::try_from(value).unwrap_or(usize::MAX)))
        }
    }
}

/// Parses the index of a single target topic, as used by evolution queries.
/// Indices beyond `u32` saturate and later fail the existence check.
pub fn parse_topic_index(raw: Option<&str>) -> Result<u32, DomainError> {
    let raw = present(raw).ok_or_else(|| DomainError::bad_request(MISSING_TOPIC_MESSAGE))?;

    match parse_integer(raw) {
        None => Err(DomainError::bad_request(TOPIC_INDEX_MESSAGE)),
        Some(IntegerLiteral::Negative) => Err(DomainError::unprocessable(TOPIC_INDEX_MESSAGE)),
        Some(IntegerLiteral::NonNegative(index)) => Ok(u32::try_from(index).unwrap_or(u32::MAX)),
    }
}
