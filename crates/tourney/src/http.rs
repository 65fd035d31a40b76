//! Response helpers shared by the workflow routers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::store::StoreError;

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, Json(payload)).into_response()
}

pub(crate) fn store_failure(err: StoreError) -> Response {
    error!(error = %err, "store operation failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Map a lookup/mutation result onto 200, 404 or 500.
pub(crate) fn found_or_404<T: Serialize>(
    result: Result<Option<T>, StoreError>,
    what: &str,
) -> Response {
    match result {
        Ok(Some(body)) => (StatusCode::OK, Json(body)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("{what} not found")),
        Err(err) => store_failure(err),
    }
}

pub(crate) fn listed<T: Serialize>(result: Result<Vec<T>, StoreError>) -> Response {
    match result {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(err) => store_failure(err),
    }
}
