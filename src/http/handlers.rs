use super::error::ServerError;
use super::state::AppState;
use crate::upload::UploadReceipt;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use bytes::Bytes;
use tracing::{error, info};

/// POST /upload-video
/// Store the clip carried by the configured multipart field
pub async fn upload_video(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadReceipt>, ServerError> {
    // Created before parsing so a fresh install accepts its first upload
    state.store.ensure_dir().await.map_err(|e| {
        error!(
            "Failed to create uploads directory {}: {}",
            state.store.dir().display(),
            e
        );
        ServerError::Storage(e)
    })?;

    let mut multipart = multipart.map_err(|e| {
        error!("Rejected upload: {}", e);
        ServerError::FormParse(e.to_string())
    })?;

    let mut fields = Vec::new();
    let mut clip: Option<(Option<String>, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Error parsing the form: {}", e);
        ServerError::FormParse(e.to_string())
    })? {
        let name = field.name().unwrap_or("").to_string();
        fields.push(name.clone());

        if name == *state.field_name && clip.is_none() {
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await.map_err(|e| {
                error!("Failed to read '{}' field: {}", name, e);
                ServerError::FormParse(format!("Failed to read field: {}", e))
            })?;
            clip = Some((file_name, data));
        }
    }

    let Some((file_name, data)) = clip else {
        error!("Upload without '{}' field (got {:?})", state.field_name, fields);
        return Err(ServerError::MissingField(state.field_name.to_string()));
    };

    let stored = state
        .store
        .save(file_name.as_deref(), &state.field_name, &data)
        .await
        .map_err(|e| {
            error!("Failed to save upload: {}", e);
            ServerError::Storage(e)
        })?;

    info!("Upload stored: {} ({} bytes)", stored.path.display(), stored.size);

    Ok(Json(UploadReceipt {
        message: "Video uploaded successfully".to_string(),
        file_path: stored.path.display().to_string(),
        size: stored.size,
        fields,
    }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
