//! Session authentication.
//!
//! `POST /auth/login` exchanges the configured username and password for an
//! HS256 session token. Protected routes accept the token either as
//! `Authorization: Bearer <token>` or in the `orion_session` cookie.

use axum::{
    Json,
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{AUTHORIZATION, COOKIE, SET_COOKIE}
    },
    middleware::Next,
    response::{IntoResponse, Response}
};
use chrono::{DateTime, Duration, Utc};
use config::AuthConfig;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use orion_core::types::iso_timestamp;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "orion_session";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64
}

/// The authenticated caller, inserted into request extensions by
/// [`require_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub expires_at: i64
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub expires_at: String
}

/// Signs a session token for `username`, valid for the configured TTL from `now`.
pub fn issue_token(
    config: &AuthConfig,
    username: &str,
    now: DateTime<Utc>
) -> Result<(String, DateTime<Utc>), ApiError> {
    let ttl = i64::try_from(config.session_ttl_seconds).unwrap_or(i64::MAX);
    let expires_at = now + Duration::seconds(ttl);
    let claims = Claims {
        sub: username.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp()
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes())
    )
    .map_err(|e| ApiError::Internal(format!("Failed to sign session token: {e}")))?;

    Ok((token, expires_at))
}

/// Returns the claims of a valid, unexpired token.
pub fn verify_token(config: &AuthConfig, token: &str) -> Option<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation
    )
    .map(|data| data.claims)
    .map_err(|e| tracing::debug!(error = %e, "Session token rejected"))
    .ok()
}

/// Bearer header first, then the session cookie.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|token| !token.is_empty())
}

fn credentials_match(config: &AuthConfig, request: &LoginRequest) -> bool {
    !config.password.is_empty()
        && request.username == config.username
        && request.password == config.password
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LoginRequest>
) -> Result<Response, ApiError> {
    let auth = &state.config.auth;
    if !credentials_match(auth, &request) {
        tracing::warn!(username = %request.username, "Login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let (token, expires_at) = issue_token(auth, &request.username, Utc::now())?;
    let cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        auth.session_ttl_seconds
    );
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::Internal(format!("Invalid session cookie: {e}")))?;

    tracing::info!(username = %request.username, "Session issued");
    let body = LoginResponse {
        success: true,
        token,
        expires_at: iso_timestamp(expires_at)
    };
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Rejects requests without a valid session before they reach a handler.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next
) -> Result<Response, ApiError> {
    let claims = session_token(request.headers())
        .and_then(|token| verify_token(&state.config.auth, token))
        .ok_or(ApiError::Unauthorized)?;

    request.extensions_mut().insert(Session {
        username: claims.sub,
        expires_at: claims.exp
    });
    Ok(next.run(request).await)
}
