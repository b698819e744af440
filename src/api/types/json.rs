//! JSON body extractor whose rejections use the error envelope

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::error::{ApiError, ApiErrorType};

/// `axum::Json` for responses; as an extractor, body problems become an
/// [`ApiError`] keeping axum's status (400, 415 or 422)
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AxumJson(value) = AxumJson::<T>::from_request(req, state)
            .await
            .map_err(rejection_error)?;

        Ok(Json(value))
    }
}

fn rejection_error(rejection: JsonRejection) -> ApiError {
    let message = match &rejection {
        JsonRejection::JsonDataError(err) => format!("Invalid request body: {}", err.body_text()),
        JsonRejection::JsonSyntaxError(err) => format!("Malformed JSON: {}", err.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            "Request body must be sent as application/json".to_string()
        }
        other => other.body_text(),
    };
    warn!(status = %rejection.status(), "Rejected request body: {}", message);

    ApiError::new(rejection.status(), ApiErrorType::InvalidRequestError, message)
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}
