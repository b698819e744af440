//! API request, response and error types

pub mod error;
pub mod json;
pub mod topics;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use topics::{
    AnalyzeTextRequest, ModelSummary, ModelTopicsParams, ModelTopicsResponse, NovelTopicsParams,
    NovelTopicsResponse, QueryMeta, TopicEvolutionParams,
};
