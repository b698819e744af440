//! v1 API endpoints

pub mod analysis;
pub mod topics;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/models", get(topics::list_models))
        .route("/main-model", get(topics::main_model))
        .route("/model-topics", get(topics::model_topics))
        .route("/novel-topics", get(topics::novel_topics))
        .route("/topic-evolution", get(topics::topic_evolution))
        .route("/analyze-text", post(analysis::analyze_text))
}
