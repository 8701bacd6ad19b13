//! HTTP Basic authentication against the user table.
//!
//! Every protected handler calls [`authenticate`] itself rather than
//! going through a middleware layer, so routes that skip auth (health,
//! thumbnails) simply never call it.

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use ottstream_db::models::User;
use ottstream_db::queries::users;

use crate::server::error::ApiError;
use crate::server::AppContext;

/// Upper bound on the decoded login, in bytes. Longer values are
/// rejected outright, never truncated.
pub const MAX_LOGIN_LEN: usize = 64;
/// Upper bound on the decoded password, in bytes.
pub const MAX_PASSWORD_LEN: usize = 128;

/// Why an Authorization header failed to parse.
#[derive(Debug, PartialEq, Eq)]
pub enum CredentialError {
    /// Header missing or not a `Basic` scheme.
    NotBasic,
    /// Payload is not valid base64 or not UTF-8.
    Malformed,
    /// Decoded payload has no `:` separator.
    MissingSeparator,
    /// Login or password exceeds its length bound.
    TooLong,
}

/// Extract `(login, password)` from a `Basic` Authorization header
/// value. The password may itself contain colons; only the first one
/// separates the fields.
pub fn parse_basic_header(value: &str) -> Result<(String, String), CredentialError> {
    let payload = value.strip_prefix("Basic ").ok_or(CredentialError::NotBasic)?;

    let decoded = STANDARD
        .decode(payload.trim())
        .map_err(|_| CredentialError::Malformed)?;
    let decoded = String::from_utf8(decoded).map_err(|_| CredentialError::Malformed)?;

    let (login, password) = decoded
        .split_once(':')
        .ok_or(CredentialError::MissingSeparator)?;

    if login.len() >= MAX_LOGIN_LEN || password.len() >= MAX_PASSWORD_LEN {
        return Err(CredentialError::TooLong);
    }

    Ok((login.to_string(), password.to_string()))
}

/// Resolve the request's Basic credentials to a user row.
///
/// A missing header answers 401 "Authorization required"; an
/// unparseable header, unknown login, or wrong password answers 401
/// "Invalid credentials". Both carry the same stable code.
pub fn authenticate(ctx: &AppContext, headers: &HeaderMap) -> Result<User, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Authorization required"))?;

    let (login, password) = parse_basic_header(value)
        .map_err(|_| ApiError::unauthorized("Invalid credentials"))?;

    let conn = ctx
        .db
        .get()
        .map_err(|e| ApiError::internal(format!("db pool: {}", e)))?;

    let user = users::get_user_by_login(&conn, &login)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    match bcrypt::verify(&password, &user.password_hash) {
        Ok(true) => Ok(user),
        Ok(false) | Err(_) => Err(ApiError::unauthorized("Invalid credentials")),
    }
}

/// Generate a bcrypt hash for storage in the user table.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

#[derive(Serialize)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
    pub login: String,
}

/// `GET /api/auth/check` validates credentials without touching any
/// other resource.
pub async fn auth_check(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> Result<Json<AuthCheckResponse>, ApiError> {
    let user = authenticate(&ctx, &headers)?;
    Ok(Json(AuthCheckResponse {
        authenticated: true,
        login: user.login_id,
    }))
}
