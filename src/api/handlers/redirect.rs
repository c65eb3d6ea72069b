//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects an alias to its original URL.
///
/// # Endpoint
///
/// `GET /api/v1/{alias}`
///
/// # Cache Strategy
///
/// - **Cache hit**: Immediate redirect
/// - **Cache miss**: Query the record store, spawn async cache write
/// - **Cache error**: Log and fall back to the record store
///
/// # Response
///
/// `302 Found` with the original URL in `Location`.
///
/// # Errors
///
/// Returns 404 Not Found if the alias does not exist.
pub async fn redirect_handler(
    Path(alias): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let original_url = state.resolution_service.resolve(&alias).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, original_url)]))
}
