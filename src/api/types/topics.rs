//! Request and response bodies of the topic endpoints

use serde::{Deserialize, Serialize};

use crate::domain::{LdaModel, RangeMeta, TopicLabel, TopicTermsMap};
use crate::infrastructure::services::ModelTopics;

/// Entry of `GET /v1/models`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    pub description: String,
    pub training_context: String,
}

impl ModelSummary {
    pub fn from_domain(model: &LdaModel) -> Self {
        Self {
            name: model.name().to_string(),
            description: model.description().to_string(),
            training_context: model.training_context().to_string(),
        }
    }
}

/// Raw query string of `GET /v1/model-topics`; parsed by the handler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelTopicsParams {
    pub name: Option<String>,
    pub topic: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "nTerms")]
    pub n_terms: Option<String>,
    #[serde(rename = "preferKeyphrase")]
    pub prefer_keyphrase: Option<String>,
}

/// How the returned topics were cut
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_terms: Option<usize>,
}

impl QueryMeta {
    fn new(window: Option<RangeMeta>, n_terms: Option<usize>) -> Option<Self> {
        if window.is_none() && n_terms.is_none() {
            return None;
        }

        Some(Self {
            offset: window.map(|w| w.offset),
            limit: window.map(|w| w.limit),
            n_terms,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelTopicsResponse {
    pub name: String,
    pub description: String,
    pub training_context: String,
    /// Topic label → value-ascending term list
    pub topics: TopicTermsMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<QueryMeta>,
}

impl From<ModelTopics> for ModelTopicsResponse {
    fn from(result: ModelTopics) -> Self {
        Self {
            name: result.model.name().to_string(),
            description: result.model.description().to_string(),
            training_context: result.model.training_context().to_string(),
            meta: QueryMeta::new(result.window, result.n_terms),
            topics: result.topics,
        }
    }
}

/// Raw query string of `GET /v1/novel-topics`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NovelTopicsParams {
    pub name: Option<String>,
    #[serde(rename = "preferKeyphrase")]
    pub prefer_keyphrase: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NovelTopicsResponse {
    pub name: String,
    pub topics: Vec<TopicLabel>,
}

/// Raw query string of `GET /v1/topic-evolution`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicEvolutionParams {
    pub name: Option<String>,
    pub topic: Option<String>,
}

/// Body of `POST /v1/analyze-text`
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeTextRequest {
    pub text: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_only_when_cut() {
        assert_eq!(QueryMeta::new(None, None), None);

        let meta = QueryMeta::new(Some(RangeMeta { offset: 1, limit: 2 }), None).unwrap();
        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            serde_json::json!({"offset": 1, "limit": 2})
        );

        let meta = QueryMeta::new(None, Some(5)).unwrap();
        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            serde_json::json!({"n_terms": 5})
        );
    }

    #[test]
    fn test_params_use_camel_case_names() {
        let params: ModelTopicsParams =
            serde_json::from_str(r#"{"name": "m", "nTerms": "3", "preferKeyphrase": "all"}"#)
                .unwrap();

        assert_eq!(params.n_terms.as_deref(), Some("3"));
        assert_eq!(params.prefer_keyphrase.as_deref(), Some("all"));
        assert!(params.topic.is_none());
    }

    #[test]
    fn test_analyze_request_model_is_optional() {
        let request: AnalyzeTextRequest = serde_json::from_str(r#"{"text": "abc"}"#).unwrap();
        assert!(request.model_name.is_none());
    }
}
