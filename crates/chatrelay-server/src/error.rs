use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chatrelay::errors::RelayError;
use serde_json::json;
use thiserror::Error;

pub const ENV_PREFIX: &str = "CHATRELAY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Environment variable that sets the config field at `field_path`,
/// e.g. `backend.endpoints` -> `CHATRELAY_BACKEND__ENDPOINTS`.
pub fn to_env_var(field_path: &str) -> String {
    format!(
        "{}_{}",
        ENV_PREFIX,
        field_path.to_uppercase().replace('.', "__")
    )
}

/// A failure reported to the caller before any streaming starts.
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::BAD_REQUEST);

        let body = match &self.0 {
            RelayError::BackendRejected { status, body } => json!({
                "success": false,
                "error_code": status,
                "message": body,
            }),
            other => json!({
                "success": false,
                "error": format!("An error occurred: {}", other),
            }),
        };

        (status, Json(body)).into_response()
    }
}
