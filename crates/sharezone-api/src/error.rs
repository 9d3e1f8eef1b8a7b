use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use sharezone_messaging::MessagingError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Messaging(#[from] MessagingError),

    #[error("internal error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::Messaging(MessagingError::Validation(e)) => {
                let mut errors = serde_json::Map::new();
                errors.insert(e.field().to_string(), json!([e.to_string()]));
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "ok": false, "errors": errors })),
                )
                    .into_response()
            }
            ApiError::Messaging(e @ MessagingError::NotFound) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "ok": false, "error": e.to_string() })),
            )
                .into_response(),
            ApiError::Messaging(e @ MessagingError::NotAdmin) => (
                StatusCode::FORBIDDEN,
                Json(json!({ "ok": false, "error": e.to_string() })),
            )
                .into_response(),
            ApiError::Messaging(e) => {
                error!("Request failed: {}", e);
                internal()
            }
            ApiError::Internal => internal(),
        }
    }
}

fn internal() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "ok": false, "error": "Internal server error" })),
    )
        .into_response()
}
