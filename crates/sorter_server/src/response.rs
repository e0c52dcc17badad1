//! Success envelope `{"ok": true, "data": ...}` and request body decoding.

use crate::error::AppError;
use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

pub fn ok<T: Serialize>(data: T) -> Response {
    ok_with(StatusCode::OK, data)
}

pub fn ok_with<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(json!({ "ok": true, "data": data }))).into_response()
}

/// Decodes a JSON request body regardless of its content type.
///
/// An empty body decodes as `{}` so command endpoints accept bare POSTs.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        &body[..]
    };
    serde_json::from_slice(raw).map_err(|err| AppError::Validation(format!("invalid body: {err}")))
}
