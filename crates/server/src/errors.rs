use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::rpc::{Envelope, ErrorCode};
use service::ServiceError;
use thiserror::Error;

/// Failure of one remote call, rendered as an error envelope.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RpcError {
    pub code: ErrorCode,
    pub message: String,
    pub path: Option<String>,
}

impl RpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), path: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn to_envelope(&self) -> Envelope {
        Envelope::err(self.code, self.message.clone(), self.path.as_deref())
    }
}

impl From<ServiceError> for RpcError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => RpcError::new(ErrorCode::BadRequest, msg),
            ServiceError::Store(msg) => RpcError::new(ErrorCode::InternalServerError, msg),
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_envelope())).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("store connection failed: {0}")]
    Store(#[from] ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_rpc_codes() {
        let e: RpcError = ServiceError::empty("key").into();
        assert_eq!(e.code, ErrorCode::BadRequest);
        assert_eq!(e.message, "key must not be empty");

        let e: RpcError = ServiceError::Store("NOAUTH Authentication required.".into()).into();
        assert_eq!(e.code, ErrorCode::InternalServerError);
        assert_eq!(e.to_string(), "NOAUTH Authentication required.");
    }

    #[test]
    fn into_response_uses_code_status() {
        let resp = RpcError::bad_request("nope").with_path("get").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
