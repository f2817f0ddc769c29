//! HTTP error envelope

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Errors surfaced to API callers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or invalid client input
    #[error("{0}")]
    BadRequest(String),

    /// Requested record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Storage or other system failure; details stay in the logs
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_request_error",
            ApiError::NotFound(_) => "not_found_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl From<subman_core::Error> for ApiError {
    fn from(err: subman_core::Error) -> Self {
        use subman_core::Error as CoreError;

        match err {
            CoreError::InvalidFormat(msg) | CoreError::InvalidArgument(msg) => {
                ApiError::BadRequest(msg)
            }
            CoreError::SubscriptionNotFound(_) => {
                ApiError::NotFound("subscription not found".to_string())
            }
            other => {
                error!("Request failed: {}", other);
                ApiError::Internal("internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": {
                "message": self.to_string(),
                "type": self.error_type(),
                "code": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = subman_core::Error::InvalidArgument("price must be more than zero".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "price must be more than zero");

        let err: ApiError = subman_core::Error::SubscriptionNotFound(7).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "subscription not found");

        let err: ApiError = subman_core::Error::Database("connection refused".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_envelope_shape() {
        let response = ApiError::bad_request("invalid id").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "invalid id");
        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert_eq!(json["error"]["code"], 400);
    }
}
