use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let (status, error_message, details) = match self {
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            AppError::SessionError(msg) => {
                tracing::error!(error = %msg, "Session store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Session error".to_string(),
                    None,
                )
            }
            AppError::TemplateError(msg) => {
                tracing::error!(error = %msg, "Template rendering failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Template error".to_string(),
                    None,
                )
            }
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_hide_details() {
        let response = AppError::SessionError("store unreachable".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_is_client_error() {
        let response = AppError::BadRequest(anyhow::anyhow!("unsupported form method")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn config_error_maps_from_config_crate() {
        let err: AppError = config::ConfigError::NotFound("api.base_url".into()).into();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains("api.base_url"));
    }
}
