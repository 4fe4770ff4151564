use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use super::llm::LlmError;

/// Edge-function failures. Every variant renders as `{ "error": message }`.
#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("Failed to parse recipe from AI response: {0}")]
    Parse(String),
}

impl FunctionError {
    pub fn status(&self) -> StatusCode {
        match self {
            FunctionError::BadRequest(_) => StatusCode::BAD_REQUEST,
            FunctionError::Llm(_) | FunctionError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for FunctionError {
    fn from(rejection: JsonRejection) -> Self {
        FunctionError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "edge function failed");
        } else {
            tracing::warn!(error = %self, "edge function rejected request");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type FunctionResult<T> = Result<T, FunctionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_maps_to_500() {
        let err = FunctionError::from(LlmError::MissingKey);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "OpenAI API key not configured");
        assert_eq!(
            FunctionError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
