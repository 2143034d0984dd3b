use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::auth::Claims;
use crate::error::ApiError;

/// Shared secret the guard verifies bearer tokens against.
#[derive(Clone)]
pub struct AuthSecret(pub String);

impl AuthSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }
}

/// Bearer-token guard middleware.
///
/// Rejects the request with 401 before it reaches the wrapped handler unless
/// the `authorization` header carries a token verifiable against the shared
/// secret. On success the decoded claims are attached to the request
/// extensions for downstream handlers.
pub async fn jwt_guard(
    State(AuthSecret(secret)): State<AuthSecret>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let claims = verify_token(&token, &secret)?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Extract the token from the `authorization` header.
///
/// The header must be exactly two space-separated tokens: the scheme word
/// and the token itself.
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("an authorization header is required"))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized(MALFORMED_HEADER))?;

    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() != 2 {
        return Err(ApiError::unauthorized(MALFORMED_HEADER));
    }

    Ok(parts[1].to_string())
}

const MALFORMED_HEADER: &str =
    "authorization header not properly formatted, should be: Bearer {token}";

/// Parse and cryptographically verify a token, restricted to the HMAC
/// algorithm family. A token signed any other way is rejected outright.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| ApiError::unauthorized(e.to_string()))
}
