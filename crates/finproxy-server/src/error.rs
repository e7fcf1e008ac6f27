//! Mapping of proxy errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use finproxy::{ErrorBody, ErrorClass, ProxyError};

/// A [`ProxyError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub ProxyError);

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        Self(err)
    }
}

/// HTTP status for an error class.
#[must_use]
pub const fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::Client => StatusCode::BAD_REQUEST,
        ErrorClass::Upstream => StatusCode::BAD_GATEWAY,
        ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.class());
        (status, Json(ErrorBody::from(&self.0))).into_response()
    }
}
