use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures of `POST /upload-video`
///
/// Every variant is reported with a 500 status and a JSON body carrying a
/// generic message plus the raw error in `details`.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Multipart error: {0}")]
    FormParse(String),

    #[error("Missing '{0}' field in multipart form")]
    MissingField(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = match &self {
            ServerError::FormParse(_) | ServerError::MissingField(_) => "Error parsing the form",
            ServerError::Storage(_) => "Error saving the file",
        };

        let body = serde_json::json!({
            "error": message,
            "details": self.to_string(),
        });

        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}
