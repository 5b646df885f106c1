// src/handlers/content.rs

use axum::{Json, response::IntoResponse};
use serde::Deserialize;
use validator::Validate;

use crate::{content, error::AppError};

/// DTO for previewing rich-text markup.
#[derive(Debug, Deserialize, Validate)]
pub struct PreviewRequest {
    #[validate(length(max = 200000))]
    pub markup: String,
}

/// Sanitizes arbitrary markup and returns the read-only rendering.
///
/// This is the preview surface for the editor: the same policy governs the
/// write path, so what the preview shows is exactly what gets stored.
pub async fn preview(Json(payload): Json<PreviewRequest>) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let rendered = content::render::shared().render(&payload.markup);
    Ok(Json(rendered))
}
