//! Image upload handler shared by `/api/uploads` (admin) and `/api/avatar`

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::services::UploadService;
use crate::AppState;

/// Multipart field carrying the file
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Store the `image` field and return its URL
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    let service = UploadService::new(&state.config.uploads);

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();

        // Reject by type before buffering the body
        service.check(&filename, &content_type, 0)?;

        let data = field.bytes().await.map_err(multipart_error)?;
        let image_url = service.save_image(&filename, &content_type, &data).await?;

        return Ok((StatusCode::CREATED, Json(UploadResponse { image_url })));
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}
