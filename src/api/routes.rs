//! API route configuration.

use crate::api::handlers::{
    delete_url_handler, list_urls_handler, redirect_handler, shorten_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Versioned API routes, nested under `/api/v1`.
///
/// # Endpoints
///
/// - `POST   /shorten`        - Create a short alias
/// - `GET    /urls`           - List every record
/// - `DELETE /urls/{alias}`   - Delete a record
/// - `GET    /{alias}`        - Redirect to the original URL
///
/// Static segments take precedence over `/{alias}`, which is why `urls` and
/// `shorten` are reserved aliases.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/urls", get(list_urls_handler))
        .route("/urls/{alias}", delete(delete_url_handler))
        .route("/{alias}", get(redirect_handler))
}
