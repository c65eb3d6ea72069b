//! Handlers for record listing and deletion.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::dto::urls::UrlResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Lists every shortened URL, newest first.
///
/// # Endpoint
///
/// `GET /api/v1/urls`
///
/// # Response
///
/// ```json
/// [
///   {
///     "originalUrl": "https://example.com",
///     "shortenedUrl": "abc123",
///     "clicks": 0,
///     "createdAt": "2024-06-01T12:00:00Z"
///   }
/// ]
/// ```
pub async fn list_urls_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<UrlResponse>>, AppError> {
    let records = state.resolution_service.list().await?;

    Ok(Json(records.into_iter().map(UrlResponse::from).collect()))
}

/// Deletes a short URL and evicts its cached mapping.
///
/// # Endpoint
///
/// `DELETE /api/v1/urls/{alias}`
///
/// # Errors
///
/// Returns 404 Not Found if the alias does not exist.
pub async fn delete_url_handler(
    Path(alias): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.resolution_service.delete(&alias).await?;

    Ok(StatusCode::NO_CONTENT)
}
