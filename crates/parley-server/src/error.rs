use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Fallback `details` of the error envelope when the cause has no message.
pub const DEFAULT_ERROR_DETAILS: &str = "Error while getting channels";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    Storage(String),

    #[error("Seed file error: {0}")]
    Seed(#[from] std::io::Error),

    #[error("Malformed seed data: {0}")]
    SeedFormat(#[from] serde_json::Error),
}

impl ServerError {
    fn details(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            DEFAULT_ERROR_DETAILS.to_string()
        } else {
            message
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");

        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": "Server Error",
                "details": self.details(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}
