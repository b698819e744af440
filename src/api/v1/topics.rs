//! Topic query endpoints

use axum::extract::{Query, State};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, Json, ModelSummary, ModelTopicsParams, ModelTopicsResponse, NovelTopicsParams,
    NovelTopicsResponse, TopicEvolutionParams,
};
use crate::domain::query::{parse_n_terms, parse_topic_index};
use crate::domain::{KeyphrasePreference, TopicEvolution, TopicSelector};
use crate::infrastructure::services::ModelTopicsRequest;

const MISSING_NAME_MESSAGE: &str =
    "Request must provide the name of the model, to which the target topics relate to";

/// The mandatory `name` parameter
fn model_name(name: Option<&str>) -> Result<&str, ApiError> {
    name.filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(MISSING_NAME_MESSAGE))
}

/// GET /v1/models
pub async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelSummary>>, ApiError> {
    let models = state.topic_service.list_models().await?;

    Ok(Json(models.iter().map(ModelSummary::from_domain).collect()))
}

/// GET /v1/main-model
pub async fn main_model(State(state): State<AppState>) -> Result<Json<ModelTopicsResponse>, ApiError> {
    let topics = state.topic_service.main_model_topics().await?;

    Ok(Json(topics.into()))
}

/// GET /v1/model-topics
pub async fn model_topics(
    State(state): State<AppState>,
    Query(params): Query<ModelTopicsParams>,
) -> Result<Json<ModelTopicsResponse>, ApiError> {
    debug!(params = ?params, "Model topics request");

    let name = model_name(params.name.as_deref())?;
    let selector = TopicSelector::from_params(
        params.topic.as_deref(),
        params.offset.as_deref(),
        params.limit.as_deref(),
    )?;
    let n_terms = parse_n_terms(params.n_terms.as_deref())?;
    let preference = KeyphrasePreference::parse(params.prefer_keyphrase.as_deref())?;

    let request = ModelTopicsRequest::new(name, selector)
        .with_n_terms(n_terms)
        .with_preference(preference);
    let topics = state.topic_service.model_topics(request).await?;

    Ok(Json(topics.into()))
}

/// GET /v1/novel-topics
pub async fn novel_topics(
    State(state): State<AppState>,
    Query(params): Query<NovelTopicsParams>,
) -> Result<Json<NovelTopicsResponse>, ApiError> {
    let name = model_name(params.name.as_deref())?;
    let preference = KeyphrasePreference::parse(params.prefer_keyphrase.as_deref())?;

    let topics = state.topic_service.novel_topics(name, preference).await?;

    Ok(Json(NovelTopicsResponse {
        name: name.to_string(),
        topics,
    }))
}

/// GET /v1/topic-evolution
pub async fn topic_evolution(
    State(state): State<AppState>,
    Query(params): Query<TopicEvolutionParams>,
) -> Result<Json<TopicEvolution>, ApiError> {
    let name = model_name(params.name.as_deref())?;
    let topic = parse_topic_index(params.topic.as_deref())?;

    let evolution = state.topic_service.topic_evolution(name, topic).await?;

    Ok(Json(evolution))
}
