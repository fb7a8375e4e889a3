use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::fmt::Display;

/// Error returned by every HTTP handler
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// Generic message for the client plus the underlying error text
    #[error("{message}: {debug}")]
    Upstream { message: String, debug: String },
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn upstream(message: &str, err: impl Display) -> Self {
        ApiError::Upstream {
            message: message.to_string(),
            debug: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Upstream { message, debug } => ErrorResponse {
                error: message,
                debug: Some(debug),
            },
            ApiError::BadRequest(error) | ApiError::NotFound(error) | ApiError::Internal(error) => {
                ErrorResponse { error, debug: None }
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::upstream("Failed", "boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_debug_omitted_when_absent() {
        let body = ErrorResponse {
            error: "Missing address query param".into(),
            debug: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":"Missing address query param"}"#
        );
    }
}
