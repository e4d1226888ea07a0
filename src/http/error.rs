//! Mapping of [`HealixError`] onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::pages;
use crate::HealixError;

#[must_use]
pub fn status_code(err: &HealixError) -> StatusCode {
    match err {
        HealixError::Validation(_) => StatusCode::BAD_REQUEST,
        HealixError::NotFound(_) => StatusCode::NOT_FOUND,
        HealixError::Conflict(_) => StatusCode::CONFLICT,
        HealixError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing message. Server-side failures are logged and replaced by a
/// generic text.
fn public_message(err: &HealixError) -> String {
    match status_code(err) {
        StatusCode::INTERNAL_SERVER_ERROR => {
            tracing::error!("Request failed: {}", err);
            "Internal server error".to_string()
        }
        StatusCode::NOT_FOUND => "Not found".to_string(),
        _ => err.to_string(),
    }
}

/// JSON error body for the API routes.
impl IntoResponse for HealixError {
    fn into_response(self) -> Response {
        let status = status_code(&self);
        (status, Json(json!({ "error": public_message(&self) }))).into_response()
    }
}

/// HTML rendering of an error, for the page routes.
pub struct PageError(pub HealixError);

impl From<HealixError> for PageError {
    fn from(err: HealixError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = status_code(&self.0);
        let title = status.canonical_reason().unwrap_or("Error");
        (status, Html(pages::error_page(title, &public_message(&self.0)))).into_response()
    }
}
