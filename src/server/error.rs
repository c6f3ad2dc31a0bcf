//! HTTP mapping for bridge errors

use crate::error::BridgeError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_body: Option<String>,
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let (upstream_status, upstream_body) = match &self {
            BridgeError::Upstream { status, body, .. } => (Some(*status), Some(body.clone())),
            _ => (None, None),
        };

        let body = ErrorBody {
            error: self.to_string(),
            provider: self.provider().map(str::to_string),
            upstream_status,
            upstream_body,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for BridgeError {
    fn from(rejection: JsonRejection) -> Self {
        BridgeError::invalid_request(rejection.body_text())
    }
}
