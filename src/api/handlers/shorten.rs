//! Handler for the shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short alias for a URL, or returns the existing one.
///
/// # Endpoint
///
/// `POST /api/v1/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "longUrl": "https://example.com",
///   "customAlias": "my-link"
/// }
/// ```
///
/// `customAlias` is optional and ignored when the URL was already shortened.
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "shortenedUrl": "abc123" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the URL or custom alias is invalid.
/// Returns 409 Conflict if the custom alias is already taken.
/// Returns 500 Internal Server Error on storage failure.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let alias = state
        .resolution_service
        .create(payload.long_url, payload.custom_alias)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            shortened_url: alias,
        }),
    ))
}
