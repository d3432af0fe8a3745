/// Authentication endpoints
///
/// - `POST /register` - Register a new user
/// - `POST /login` - Login with email and password
///
/// Both return the user together with a 24-hour access token.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todolist_shared::{
    models::user::User,
    validation::{validate_login, validate_register, LoginPayload, RegisterPayload},
};

/// User with an access token
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Bearer token, valid for 24 hours
    pub token: String,
}

impl UserResponse {
    fn new(user: User, token: String) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            token,
        }
    }
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "secret1"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or validation failed
/// - `409 Conflict`: Username or email already exists
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let Json(req) = payload?;

    let errors = validate_register(&req);
    if !errors.is_empty() {
        return Err(ApiError::ValidationError(errors));
    }

    let user = state
        .accounts
        .register(&req.username, &req.email, &req.password)
        .await?;

    let token = state.tokens.issue(&user)?;

    Ok((StatusCode::CREATED, Json(UserResponse::new(user, token))))
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// {
///   "email": "alice@example.com",
///   "password": "secret1"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or validation failed
/// - `401 Unauthorized`: Unknown email or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let Json(req) = payload?;

    let errors = validate_login(&req);
    if !errors.is_empty() {
        return Err(ApiError::ValidationError(errors));
    }

    let user = state.accounts.authenticate(&req.email, &req.password).await?;
    let token = state.tokens.issue(&user)?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(UserResponse::new(user, token)))
}
