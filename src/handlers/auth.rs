// handlers/auth.rs - POST /auth/login handler

use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_token, Claims};
use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

/// POST /auth/login - mint a bearer token for the supplied username.
///
/// Credential validation is an application concern; this endpoint exists so
/// the guarded API can be exercised end to end.
pub async fn login_post(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::bad_request("username is required"));
    }

    let config = config::config();
    let claims = Claims::new(payload.username.trim(), config.security.jwt_expiry_hours);
    let token = generate_token(&claims, &config.security.jwt_secret)?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "expires_in": config.security.jwt_expiry_hours * 3600
    })))
}
