use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use headline_common::HeadlineError;

/// Maps archive failures onto HTTP status codes and a `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError(pub HeadlineError);

impl From<HeadlineError> for ApiError {
    fn from(e: HeadlineError) -> Self {
        Self(e)
    }
}

// Malformed bodies, query strings and path segments are validation failures.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(HeadlineError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(HeadlineError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(HeadlineError::Validation(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            HeadlineError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            HeadlineError::NotFound(_) => StatusCode::NOT_FOUND,
            HeadlineError::InvalidPage(_) | HeadlineError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            HeadlineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match &self.0 {
            HeadlineError::Duplicate { .. } => "Headline already exists".to_string(),
            HeadlineError::NotFound(_) => "Headline not found".to_string(),
            HeadlineError::InvalidPage(msg) | HeadlineError::Validation(msg) => msg.clone(),
            HeadlineError::Database(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self.0, "Request failed");
        }
        (status, Json(serde_json::json!({ "detail": self.detail() }))).into_response()
    }
}
