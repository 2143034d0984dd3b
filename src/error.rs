// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::TokenError;
use crate::database::{DatabaseError, RepositoryError};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert repository outcomes to ApiError
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InvalidId(id) => {
                ApiError::bad_request(format!("invalid identifier: {}", id))
            }
            RepositoryError::NotFound => ApiError::not_found("record not found"),
            RepositoryError::Persistence(e) => {
                // Log the real error but return a generic message
                tracing::error!("persistence error: {}", e);
                ApiError::internal_server_error("an error occurred while processing your request")
            }
            RepositoryError::Query(e) => {
                tracing::error!("query error: {}", e);
                ApiError::internal_server_error("an error occurred while processing your request")
            }
            RepositoryError::Decode(e) => {
                tracing::error!("decode error: {}", e);
                ApiError::internal_server_error("stored record does not match the expected shape")
            }
            RepositoryError::Encode(e) => {
                tracing::error!("encode error: {}", e);
                ApiError::internal_server_error("failed to encode record")
            }
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        tracing::error!("database error: {}", err);
        ApiError::service_unavailable("database temporarily unavailable")
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        tracing::error!("token error: {}", err);
        ApiError::internal_server_error("failed to generate authorization token")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_repository_outcomes_to_status_codes() {
        let invalid: ApiError = RepositoryError::InvalidId("nope".to_string()).into();
        assert_eq!(invalid.status_code(), 400);

        let missing: ApiError = RepositoryError::NotFound.into();
        assert_eq!(missing.status_code(), 404);
    }

    #[test]
    fn json_body_carries_message_and_code() {
        let err = ApiError::unauthorized("an authorization header is required");
        let body = err.to_json();
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "an authorization header is required");
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
}
