//! Text analysis endpoint

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{AnalyzeTextRequest, ApiError, Json};
use crate::infrastructure::services::TextAnalysis;

/// POST /v1/analyze-text
pub async fn analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<TextAnalysis>, ApiError> {
    debug!(
        model = ?request.model_name,
        length = request.text.len(),
        "Analyze text request"
    );

    let analysis = state
        .analysis_service
        .analyze(&request.text, request.model_name.as_deref())
        .await?;

    Ok(Json(analysis))
}
