/// Request authorization for Axum
///
/// Protected routes run [`authorize`] before the handler. On success the
/// resolved identity is stored in the request extensions as an
/// [`AuthContext`], and handlers receive it as an ordinary extractor
/// argument:
///
/// ```text
/// async fn list_todos(auth: AuthContext, ...) -> ...
/// ```
///
/// # Failure modes
///
/// All of these map to `401 Unauthorized`, each with its own message:
///
/// - `MissingCredentials`: no `Authorization` header
/// - `MalformedHeader`: header is not exactly `Bearer <token>`
/// - `InvalidToken`: bad signature, malformed or expired token
/// - `MissingIdentity`: a handler asked for an identity the pipeline never
///   attached (route wired without the auth layer)

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::jwt::{TokenError, TokenService};

/// Authenticated identity for the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,
}

impl AuthContext {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

/// Error type for the authorization pipeline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingCredentials,

    #[error("Authorization header must be in the format 'Bearer {{token}}'")]
    MalformedHeader,

    #[error("Invalid or expired token")]
    InvalidToken(String),

    #[error("Unauthorized")]
    MissingIdentity,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::InvalidToken(reason) = &self {
            tracing::debug!(reason = %reason, "Rejected bearer token");
        }

        let body = Json(json!({
            "error": "unauthorized",
            "message": self.to_string(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::InvalidToken(err.to_string())
    }
}

/// Extracts the token from an `Authorization` header value
///
/// The value must split on single spaces into exactly two parts, the first
/// being the literal scheme `Bearer`.
pub fn bearer_token(header_value: Option<&str>) -> Result<&str, AuthError> {
    let value = header_value.ok_or(AuthError::MissingCredentials)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Resolves the request headers to an authenticated identity
///
/// # Errors
///
/// Returns the first pipeline failure encountered (see module docs).
pub fn authorize(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthContext, AuthError> {
    let header_value = match headers.get(header::AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
    };

    let token = bearer_token(header_value)?;
    let user_id = tokens.validate(token)?;

    Ok(AuthContext::new(user_id))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::MissingIdentity)
    }
}
